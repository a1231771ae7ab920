//! Errors that can be returned by a controller.
//!
//! Automatic conversions exist for the HTTP, storage and serialization errors, allowing
//! the `?` operator in controllers. Anything else can be wrapped with [`Error::new`].
use crate::http::{Error as HttpError, Response};
use thiserror::Error;

/// A controller error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store error: {0}")]
    Store(#[from] crate::store::Error),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    Error(#[from] Box<dyn std::error::Error + Sync + Send>),

    #[error("http error: {0}")]
    HttpError(Box<HttpError>),
}

impl Error {
    /// Create new error from any error implementing the standard [`std::error::Error`] trait.
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::Error(Box::new(err))
    }

    /// Response sent to the client when a controller fails with this error.
    /// Error details are logged, never sent.
    pub fn response(&self) -> Response {
        match self {
            Error::HttpError(err) => match err.code() {
                400 => Response::bad_request(),
                413 => Response::content_too_large(),
                _ => Response::internal_error(),
            },

            _ => Response::internal_error(),
        }
    }
}

impl From<HttpError> for Error {
    fn from(error: HttpError) -> Self {
        Error::HttpError(Box::new(error))
    }
}
