//! # Bootsmith Loader
//!
//! The typed replacement for runtime file discovery: applications
//! register their artifacts into catalogs through an explicit API, and
//! the subtype check of the original convention loader becomes a trait
//! bound enforced at compile time. Route paths can still be derived from
//! file-style names, and the scaffold seeds the convention directory
//! layout with example artifact files on first boot.

mod artifacts;
mod catalog;
pub mod paths;
pub mod scaffold;

pub use artifacts::Artifacts;
pub use catalog::Catalog;
