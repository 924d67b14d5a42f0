//! Error types for Terrace
//!
//! Write-path failures (validation, unknown references) propagate to the
//! caller as rejected operations. Read-path lookups that only serve optional
//! ancestor derivation degrade locally and are logged, never raised.

/// Main error type for Terrace operations
#[derive(Debug, thiserror::Error)]
pub enum TerraceError {
    /// Rejected write: payload violates a targeting or hierarchy invariant
    #[error("Validation error: {0}")]
    Validation(String),

    /// Rejected write: a referenced record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TerraceError {
    /// True for errors that reject a write operation (validation, unknown
    /// reference) as opposed to infrastructure failures.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound(_))
    }
}

impl From<mongodb::error::Error> for TerraceError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<serde_json::Error> for TerraceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON error: {}", err))
    }
}

impl From<bson::ser::Error> for TerraceError {
    fn from(err: bson::ser::Error) -> Self {
        Self::Internal(format!("BSON error: {}", err))
    }
}

/// Result type alias for Terrace operations
pub type Result<T> = std::result::Result<T, TerraceError>;
