use std::collections::BTreeMap;

use thiserror::Error;

/// Field name → human readable message, ordered for stable responses.
pub type FieldErrors = BTreeMap<String, String>;

/// Application-wide error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Sanitized input failed validation. `inputs` echoes the rejected values.
    #[error("Validation failed on {} field(s)", errors.len())]
    Validation {
        errors: FieldErrors,
        inputs: serde_json::Value,
    },

    /// Query-string parameters failed validation.
    #[error("Invalid query on {} field(s)", .0.len())]
    InvalidQuery(FieldErrors),

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A unique key already exists.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for a single-field query error.
    pub fn invalid_query(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), message.into());
        AppError::InvalidQuery(errors)
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<mongodb::bson::de::Error> for AppError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        AppError::Database(format!("Failed to decode document: {err}"))
    }
}

/// Helper conversion from anyhow::Error
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
