use thiserror::Error;

/// Failure taxonomy shared by the store, the tracker and the HTTP layer.
///
/// Storage code works in `anyhow` and raises the caller-facing variants as
/// values; `From<anyhow::Error>` recovers them by downcast so everything else
/// ends up as [`LibraryError::Internal`].
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("internal error: {0:#}")]
    Internal(anyhow::Error),
}

impl LibraryError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

impl From<anyhow::Error> for LibraryError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<LibraryError>() {
            Ok(domain) => domain,
            Err(other) => Self::Internal(other),
        }
    }
}

pub type LibraryResult<T> = Result<T, LibraryError>;
