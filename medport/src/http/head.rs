//! Request head: method, path, HTTP version and headers.

use std::marker::Unpin;

use tokio::io::{AsyncRead, AsyncReadExt};

use super::{Authorization, Error, Headers, Path, Query};

/// HTTP method, e.g. GET, POST, etc.
#[derive(PartialEq, Clone, Debug, Default)]
pub enum Method {
    /// `GET` request.
    #[default]
    Get,
    /// `POST` request.
    Post,
    /// `PUT` request.
    Put,
    /// `DELETE` request.
    Delete,
    /// `HEAD` request.
    Head,
    /// `PATCH` request.
    Patch,
    /// `OPTIONS` request, sent by browsers as a CORS preflight.
    Options,
    /// Some other request we don't have a name for.
    Other(String),
}

impl From<&str> for Method {
    fn from(value: &str) -> Self {
        match value.to_uppercase().as_str() {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "DELETE" => Method::Delete,
            "HEAD" => Method::Head,
            "PATCH" => Method::Patch,
            "OPTIONS" => Method::Options,
            _ => Method::Other(value.to_string()),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Method::*;

        let name = match self {
            Get => "GET",
            Post => "POST",
            Put => "PUT",
            Delete => "DELETE",
            Head => "HEAD",
            Patch => "PATCH",
            Options => "OPTIONS",
            Other(other) => other.as_str(),
        };

        write!(f, "{}", name)
    }
}

/// HTTP version. Only HTTP/1.x is spoken.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Version {
    /// HTTP/1.1.
    #[default]
    Http1,
    /// HTTP/1.0, no keep-alive unless asked for.
    Http10,
    Unknown,
}

impl From<&str> for Version {
    fn from(value: &str) -> Self {
        match value {
            "HTTP/1.1" => Version::Http1,
            "HTTP/1.0" => Version::Http10,
            _ => Version::Unknown,
        }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Version::Http1 | Version::Unknown => write!(f, "HTTP/1.1"),
            Version::Http10 => write!(f, "HTTP/1.0"),
        }
    }
}

/// Request HTTP method, path, HTTP version and headers.
#[derive(Debug, Clone, Default)]
pub struct Head {
    method: Method,
    path: Path,
    version: Version,
    headers: Headers,
}

impl Head {
    pub fn new(method: Method, path: Path, version: Version, headers: Headers) -> Self {
        Self {
            method,
            path,
            version,
            headers,
        }
    }

    /// Read request head from a stream. At most `max_size` bytes are read.
    pub async fn read(mut stream: impl AsyncRead + Unpin, max_size: usize) -> Result<Self, Error> {
        let mut bytes_remaining = max_size;

        let line = Self::read_line(&mut stream, &mut bytes_remaining).await?;
        let mut request = line.split(' ').filter(|s| !s.is_empty());

        let method = Method::from(request.next().ok_or(Error::MalformedRequest("method"))?);
        let path = Path::parse(request.next().ok_or(Error::MalformedRequest("path"))?)?;
        let version = Version::from(request.next().ok_or(Error::MalformedRequest("version"))?);

        let mut headers = Headers::new();

        loop {
            let header = Self::read_line(&mut stream, &mut bytes_remaining).await?;
            if header.is_empty() {
                break;
            }

            // Values can contain colons, e.g. `Host: localhost:8000`.
            let (name, value) = header
                .split_once(':')
                .ok_or(Error::MalformedRequest("header"))?;
            headers.insert(name.trim(), value.trim());
        }

        Ok(Head {
            method,
            path,
            version,
            headers,
        })
    }

    /// Parse the `Authorization` header, if any is set and the scheme is supported.
    pub fn authorization(&self) -> Option<Authorization> {
        Authorization::parse(self.header("authorization")?)
    }

    /// Get the request path, including query parameters, e.g., `/admin/messages?status=new`.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Retrieve just the request query, e,g, `status=new`.
    pub fn query(&self) -> &Query {
        self.path().query()
    }

    /// Request method, e.g. `GET`, `POST`, etc.
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// The size of the request body in bytes, provided by the `Content-Length` header.
    ///
    /// A value that isn't a number is an error: guessing would misread the body as the
    /// next request on the connection.
    pub fn content_length(&self) -> Result<Option<usize>, Error> {
        self.headers
            .get("content-length")
            .map(|cl| {
                cl.parse::<usize>()
                    .map_err(|_| Error::MalformedRequest("content length"))
            })
            .transpose()
    }

    /// Get all request headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Get a mutable reference to the headers, e.g. inside middleware.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Get a header value by name, if it exists. Case insensitive.
    pub fn header(&self, name: &str) -> Option<&String> {
        self.headers.get(name)
    }

    /// Should the connection stay open after the response?
    ///
    /// HTTP/1.1 connections are persistent unless the client says otherwise.
    pub fn keep_alive(&self) -> bool {
        let connection = self.headers.get("connection").map(|s| s.to_lowercase());

        match self.version {
            Version::Http10 => connection
                .map(|c| c.contains("keep-alive"))
                .unwrap_or(false),
            _ => !connection.map(|c| c.contains("close")).unwrap_or(false),
        }
    }

    /// Read a line from the stream, parsing out \r\n.
    async fn read_line(
        mut stream: impl AsyncRead + Unpin,
        bytes_remaining: &mut usize,
    ) -> Result<String, Error> {
        let mut buf = Vec::new();
        let (mut cr, mut lf) = (false, false);

        loop {
            if *bytes_remaining == 0 {
                return Err(Error::MalformedRequest("header too large"));
            }

            // `stream` should be buffered.
            let b = stream.read_u8().await?;
            *bytes_remaining -= 1;

            if b == b'\r' {
                cr = true;
                if lf {
                    return Err(Error::MalformedRequest("nl before cr"));
                }
            } else if b == b'\n' {
                lf = true;
            } else {
                buf.push(b);
            }

            if cr && lf {
                break;
            }
        }

        Ok(String::from_utf8_lossy(&buf).to_string())
    }
}
