//! Convention directory scaffolding.
//!
//! First boot against an empty application tree creates the convention
//! directories and seeds each with a commented example artifact, so the
//! expected layout is always on disk for the author to fill in. An
//! existing directory is left untouched, even when empty.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

/// Convention directories under the application source root.
pub const CONVENTION_DIRS: &[&str] = &[
    "routes",
    "handlers",
    "guards",
    "middlewares",
    "workers",
    "schedulers",
    "events",
    "models",
];

/// Embedded example artifacts: `(name, conventional relative path,
/// contents)`. The scaffold seeds them into newly created convention
/// directories; the template manager installs them on demand.
pub const TEMPLATES: &[(&str, &str, &str)] = &[
    (
        "route-index",
        "routes/index.rs",
        include_str!("../templates/routes/index.rs.tpl"),
    ),
    (
        "handler-message",
        "handlers/message.rs",
        include_str!("../templates/handlers/message.rs.tpl"),
    ),
    (
        "guard-default",
        "guards/default.rs",
        include_str!("../templates/guards/default.rs.tpl"),
    ),
    (
        "middleware-default",
        "middlewares/default.rs",
        include_str!("../templates/middlewares/default.rs.tpl"),
    ),
    (
        "worker-example",
        "workers/example.rs",
        include_str!("../templates/workers/example.rs.tpl"),
    ),
    (
        "scheduler-example",
        "schedulers/example.rs",
        include_str!("../templates/schedulers/example.rs.tpl"),
    ),
    (
        "event-example",
        "events/example.rs",
        include_str!("../templates/events/example.rs.tpl"),
    ),
];

/// Example file seeded into a convention directory on creation, when
/// one exists for it.
fn example_for(dir: &str) -> Option<(&'static str, &'static str)> {
    TEMPLATES.iter().find_map(|(_, path, contents)| {
        let (parent, file) = path.split_once('/')?;
        (parent == dir).then_some((file, *contents))
    })
}

/// Create missing convention directories under `app_root`, seeding a
/// newly created directory with its example file. Returns the list of
/// directories that were created.
pub fn ensure_layout(app_root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut created = Vec::new();
    fs::create_dir_all(app_root)?;

    for dir in CONVENTION_DIRS {
        let path = app_root.join(dir);
        if path.exists() {
            continue;
        }
        info!("Creating {} folder at {}", dir, path.display());
        fs::create_dir_all(&path)?;
        if let Some((file, contents)) = example_for(dir) {
            fs::write(path.join(file), contents)?;
        }
        created.push(path);
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_all_convention_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let created = ensure_layout(dir.path()).unwrap();
        assert_eq!(created.len(), CONVENTION_DIRS.len());
        for name in CONVENTION_DIRS {
            assert!(dir.path().join(name).is_dir());
        }
    }

    #[test]
    fn test_seeds_example_files() {
        let dir = tempfile::tempdir().unwrap();
        ensure_layout(dir.path()).unwrap();
        assert!(dir.path().join("routes/index.rs").is_file());
        assert!(dir.path().join("guards/default.rs").is_file());
        // models has no example artifact
        assert_eq!(fs::read_dir(dir.path().join("models")).unwrap().count(), 0);
    }

    #[test]
    fn test_existing_dir_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("routes")).unwrap();

        let created = ensure_layout(dir.path()).unwrap();
        assert!(!created.iter().any(|p| p.ends_with("routes")));
        // No example seeded into the pre-existing directory.
        assert!(!dir.path().join("routes/index.rs").exists());
    }

    #[test]
    fn test_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        ensure_layout(dir.path()).unwrap();
        let created = ensure_layout(dir.path()).unwrap();
        assert!(created.is_empty());
    }
}
