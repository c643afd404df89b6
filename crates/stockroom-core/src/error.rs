//! Error type shared by every [`ItemStore`](crate::store::ItemStore) backend.

/// Failure reported by a store.
///
/// The `Display` output is the human-readable message surfaced to users
/// (for example in the `?error=` redirect parameter), so variants keep it
/// free of internal prefixes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backend rejected the operation and explained why.
    #[error("{message}")]
    Backend {
        message: String,
        /// Backend-specific error code (e.g. a Postgres SQLSTATE), if any.
        code: Option<String>,
    },

    /// The backend could not be reached or the connection failed midway.
    #[error("{0}")]
    Transport(String),

    /// The backend answered with something that is not a valid item payload.
    #[error("{0}")]
    Decode(String),
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        StoreError::Backend {
            message: message.into(),
            code: None,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
