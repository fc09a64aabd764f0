//! Error types for noteleaf storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// What kind of record was looked up.
        entity: &'static str,
        /// The id that was not found.
        id: String,
    },

    /// The username is reserved by another user.
    #[error("username taken: {username}")]
    UsernameTaken {
        /// The requested (display-case) username.
        username: String,
    },
}

impl StoreError {
    /// Construct a `NotFound` for a profile.
    #[must_use]
    pub fn profile_not_found(user_id: &noteleaf_core::UserId) -> Self {
        Self::NotFound {
            entity: "profile",
            id: user_id.to_string(),
        }
    }
}
