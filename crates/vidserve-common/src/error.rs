//! Common error types used throughout vidserve.
//!
//! Every failure the media index or the HTTP layer can report funnels into
//! [`Error`]. [`Error::http_status`] gives the status code an API handler
//! should answer with.

/// Common error type for vidserve.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The media item does not exist, is not an allow-listed video, or its
    /// path escapes the media root.
    #[error("Media not found: {0}")]
    NotFound(String),

    /// A media token could not be decoded into a relative path.
    #[error("Invalid media id: {0}")]
    InvalidToken(String),

    /// The request did not carry a valid access key.
    #[error("Unauthorized")]
    Unauthorized,

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new InvalidToken error.
    pub fn invalid_token<S: Into<String>>(msg: S) -> Self {
        Self::InvalidToken(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP status code this error maps to.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound(_) => 404,
            Error::InvalidToken(_) => 400,
            Error::Unauthorized => 401,
            Error::Io(_) => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Short machine-readable code used in JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "not_found",
            Error::InvalidToken(_) => "invalid_id",
            Error::Unauthorized => "unauthorized",
            Error::Io(_) => "io_error",
            Error::Internal(_) => "internal_error",
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
