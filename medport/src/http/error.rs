use thiserror::Error;

use super::Head;

#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed request: {0}")]
    MalformedRequest(&'static str),

    #[error("request body is too large")]
    ContentTooLarge(Box<Head>),

    #[error("json")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Regex(#[from] regex::Error),

    #[error("tls: {0}")]
    Tls(#[from] rustls::Error),

    #[error("pem: {0}")]
    Pem(#[from] rustls::pki_types::pem::Error),

    #[error("{0}")]
    Config(#[from] crate::config::Error),

    #[error("{0}")]
    Store(#[from] crate::store::Error),
}

impl Error {
    /// HTTP status code this error is reported with, if it reaches a client.
    pub fn code(&self) -> u16 {
        match self {
            Self::MalformedRequest(_) | Self::Json(_) => 400,
            Self::ContentTooLarge(_) => 413,
            _ => 500,
        }
    }
}
