//! Template manager errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("File already exists: {0}")]
    Exists(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
