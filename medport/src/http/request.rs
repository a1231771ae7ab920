//! HTTP request.

use std::marker::Unpin;
use std::net::SocketAddr;
use std::ops::Deref;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Deserializer, Value};
use tokio::io::{AsyncRead, AsyncReadExt};

use super::{Error, Head, Params, ToParameter};
use crate::config::Limits;

/// HTTP request.
///
/// The request is fully loaded into memory. It's cheap to clone
/// since the body is behind an [`std::sync::Arc`].
#[derive(Debug, Clone)]
pub struct Request {
    head: Head,
    inner: Arc<Inner>,
    params: Option<Arc<Params>>,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            head: Head::default(),
            inner: Arc::new(Inner::default()),
            params: None,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    body: Vec<u8>,
    peer: Option<SocketAddr>,
}

impl Request {
    /// Read the request in its entirety from a stream.
    ///
    /// Bodies larger than the configured limit are not read; the head is returned
    /// inside [`Error::ContentTooLarge`] so the caller can respond.
    pub async fn read(
        peer: SocketAddr,
        mut stream: impl AsyncRead + Unpin,
        limits: Limits,
    ) -> Result<Self, Error> {
        let head = Head::read(&mut stream, limits.header_max_size).await?;
        let content_length = head.content_length()?.unwrap_or(0);

        if content_length > limits.body_max_size {
            return Err(Error::ContentTooLarge(Box::new(head)));
        }

        let mut body = vec![0u8; content_length];
        stream
            .read_exact(&mut body)
            .await
            .map_err(|_| Error::MalformedRequest("incorrect content length"))?;

        Ok(Request {
            head,
            params: None,
            inner: Arc::new(Inner {
                body,
                peer: Some(peer),
            }),
        })
    }

    /// Get the request's source address, if the request came from a socket.
    pub fn peer(&self) -> Option<&SocketAddr> {
        self.inner.peer.as_ref()
    }

    /// Client address, taking the `X-Forwarded-For` header into account
    /// when running behind a reverse proxy.
    pub fn client_addr(&self) -> Option<SocketAddr> {
        self.header("x-forwarded-for")
            .and_then(|header| crate::peer_addr(header))
            .or_else(|| self.peer().copied())
    }

    /// Set params on the request.
    pub fn with_params(mut self, params: Arc<Params>) -> Self {
        self.params = Some(params);
        self
    }

    pub fn head(&self) -> &Head {
        &self.head
    }

    /// Extract a parameter from the provided path.
    pub fn parameter<T: ToParameter>(&self, name: &str) -> Result<Option<T>, Error> {
        if let Some(ref params) = self.params {
            if let Some(parameter) = params.parameter(self.path().base(), name) {
                return Ok(Some(T::to_parameter(parameter)?));
            }
        }

        Ok(None)
    }

    /// Request's body as bytes.
    pub fn body(&self) -> &[u8] {
        &self.inner.body
    }

    /// Request's body as JSON value.
    pub fn json_raw(&self) -> Result<Value, serde_json::Error> {
        self.json()
    }

    /// Request's body deserialized from JSON into a particular Rust type.
    pub fn json<'a, T: Deserialize<'a>>(&'a self) -> Result<T, serde_json::Error> {
        let mut deserializer = Deserializer::from_slice(self.body());
        let value = T::deserialize(&mut deserializer)?;
        // Reject trailing garbage after the JSON document.
        deserializer.end()?;
        Ok(value)
    }
}

impl Deref for Request {
    type Target = Head;

    fn deref(&self) -> &Self::Target {
        &self.head
    }
}
