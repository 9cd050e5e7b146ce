//! All error types for the translatable-fields crate.
//!
//! These are returned from every translation-targeted operation and from settings loading.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("attribute `{field}` is not translatable")]
    NotTranslatable { field: String },

    #[error("invalid locale `{0}`")]
    InvalidLocale(String),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Creates a new `NotTranslatable` error for the given field.
    pub fn not_translatable(field: impl Into<String>) -> Self {
        Error::NotTranslatable {
            field: field.into(),
        }
    }
}
