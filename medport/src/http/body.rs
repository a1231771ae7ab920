//! Response body.
//!
//! The body can be text, JSON or raw bytes. The `Content-Type` and `Content-Length` headers
//! are set automatically.
use std::marker::Unpin;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Response body.
#[derive(Debug, Clone)]
pub enum Body {
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// UTF-8 encoded text.
    Text(String),
    /// UTF-8 encoded JSON string.
    Json(Vec<u8>),
}

impl Default for Body {
    fn default() -> Self {
        Self::Bytes(vec![])
    }
}

impl Body {
    /// Create a body from a serializable value.
    pub fn json(value: &impl serde::Serialize) -> Result<Self, serde_json::Error> {
        Ok(Self::Json(serde_json::to_vec(value)?))
    }

    /// Send the body to the stream. The stream is not flushed.
    pub async fn send(&self, mut stream: impl AsyncWrite + Unpin) -> Result<(), std::io::Error> {
        stream.write_all(self.as_bytes()).await
    }

    /// The body as it will be sent.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Body::Bytes(bytes) | Body::Json(bytes) => bytes,
            Body::Text(text) => text.as_bytes(),
        }
    }

    /// Get the body size. Used in the `Content-Length` header.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the body's MIME type. This determines the value of the `Content-Type` header.
    ///
    /// # Example
    ///
    /// ```
    /// # use medport::http::Body;
    /// let body = Body::json(&serde_json::json!({"success": true})).unwrap();
    /// assert_eq!(body.mime_type(), "application/json");
    /// ```
    pub fn mime_type(&self) -> &'static str {
        match self {
            Body::Text(_) => "text/plain; charset=utf-8",
            Body::Json(_) => "application/json",
            Body::Bytes(_) => "application/octet-stream",
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(body: Vec<u8>) -> Self {
        Self::Bytes(body)
    }
}

impl From<String> for Body {
    fn from(body: String) -> Self {
        Self::Text(body)
    }
}
