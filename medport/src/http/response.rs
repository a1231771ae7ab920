//! HTTP response.

use serde::Serialize;
use serde_json::json;
use std::marker::Unpin;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::{head::Version, Body, Error, Headers};

/// Response status, e.g. 404, 200, etc.
#[derive(Debug, PartialEq)]
pub enum Status {
    Ok,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    Conflict,
    PayloadTooLarge,
    TooManyRequests,
    InternalServerError,
    Code(u16),
}

impl Status {
    pub fn code(&self) -> u16 {
        use Status::*;

        match self {
            Ok => 200,
            BadRequest => 400,
            Unauthorized => 401,
            Forbidden => 403,
            NotFound => 404,
            MethodNotAllowed => 405,
            Conflict => 409,
            PayloadTooLarge => 413,
            TooManyRequests => 429,
            InternalServerError => 500,
            Code(code) => *code,
        }
    }

    /// Reason phrase sent in the status line.
    pub fn reason(&self) -> &'static str {
        use Status::*;

        match self {
            Ok => "OK",
            BadRequest => "Bad Request",
            Unauthorized => "Unauthorized",
            Forbidden => "Forbidden",
            NotFound => "Not Found",
            MethodNotAllowed => "Method Not Allowed",
            Conflict => "Conflict",
            PayloadTooLarge => "Payload Too Large",
            TooManyRequests => "Too Many Requests",
            InternalServerError => "Internal Server Error",
            Code(_) => "",
        }
    }

    pub fn ok(&self) -> bool {
        self.code() < 300
    }
}

impl From<u16> for Status {
    fn from(code: u16) -> Status {
        use Status::*;

        match code {
            200 => Ok,
            400 => BadRequest,
            401 => Unauthorized,
            403 => Forbidden,
            404 => NotFound,
            405 => MethodNotAllowed,
            409 => Conflict,
            413 => PayloadTooLarge,
            429 => TooManyRequests,
            500 => InternalServerError,
            code => Code(code),
        }
    }
}

/// HTTP response.
#[derive(Debug)]
pub struct Response {
    code: u16,
    headers: Headers,
    version: Version,
    body: Body,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// Create empty `200 OK` response.
    pub fn new() -> Self {
        let mut headers = Headers::new();
        headers.insert("server", "medport");

        Self {
            code: 200,
            headers,
            version: Version::Http1,
            body: Body::default(),
        }
    }

    /// Set the response body. `Content-Type` follows the body type.
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self.headers
            .insert("content-type", self.body.mime_type().to_string());
        self
    }

    /// Response status, e.g. 200 OK.
    pub fn status(&self) -> Status {
        self.code.into()
    }

    /// Set response code.
    ///
    /// # Example
    ///
    /// ```
    /// use medport::http::Response;
    ///
    /// let response = Response::new().text("OK").code(200);
    /// ```
    pub fn code(mut self, code: u16) -> Self {
        self.code = code;
        self
    }

    /// Create a response with a JSON body serialized from a Rust type.
    ///
    /// # Example
    ///
    /// ```
    /// use medport::http::Response;
    /// use serde::Serialize;
    ///
    /// #[derive(Serialize)]
    /// struct Ack {
    ///     success: bool,
    /// }
    ///
    /// let response = Response::new().json(Ack { success: true }).unwrap();
    /// ```
    pub fn json(self, body: impl Serialize) -> Result<Self, Error> {
        Ok(self.body(Body::json(&body)?))
    }

    /// Create a response with a plain text body.
    pub fn text(self, body: impl ToString) -> Self {
        self.body(Body::Text(body.to_string()))
    }

    /// Add a header to the response. The name is lowercased, the value is set as-is.
    pub fn header(mut self, name: impl ToString, value: impl ToString) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Response headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Response body, as it will be sent.
    pub fn body_bytes(&self) -> &[u8] {
        self.body.as_bytes()
    }

    /// Response body parsed as JSON. Mostly useful in tests.
    pub fn body_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(self.body_bytes())
    }

    /// Send the response to a stream, serialized as bytes.
    pub async fn send(&self, mut stream: impl AsyncWrite + Unpin) -> Result<(), std::io::Error> {
        self.send_head(&mut stream).await?;
        self.body.send(stream).await
    }

    /// Send the status line and headers only, the answer to a `HEAD` request.
    /// `Content-Length` still describes the body.
    pub async fn send_head(
        &self,
        mut stream: impl AsyncWrite + Unpin,
    ) -> Result<(), std::io::Error> {
        let status = self.status();
        let mut response = format!("{} {} {}\r\n", self.version, self.code, status.reason())
            .as_bytes()
            .to_vec();

        let mut headers = self.headers.clone();
        headers.insert("content-length", self.body.len());

        response.extend_from_slice(&headers.to_bytes());
        response.extend_from_slice(b"\r\n");

        stream.write_all(&response).await
    }

    /// JSON error response, e.g. `{"error": "Invalid JSON"}`.
    pub fn error(code: u16, message: &str) -> Self {
        let body = Body::json(&json!({ "error": message }))
            .unwrap_or_else(|_| Body::Text(message.to_string()));
        Self::new().body(body).code(code)
    }

    /// Default not found (404) error.
    pub fn not_found() -> Self {
        Self::new().text("Not Found").code(404)
    }

    /// Default method not allowed (405) error.
    pub fn method_not_allowed() -> Self {
        Self::error(405, "Method not allowed")
    }

    pub fn bad_request() -> Self {
        Self::error(400, "Bad request")
    }

    pub fn forbidden() -> Self {
        Self::error(403, "Forbidden")
    }

    /// Internal server error. The error is logged by the caller, never sent to the client.
    pub fn internal_error() -> Self {
        Self::error(500, "Internal server error")
    }

    pub fn unauthorized(auth: &str) -> Self {
        Self::error(401, "Unauthorized").header("www-authenticate", auth)
    }

    pub fn too_many() -> Self {
        Self::error(429, "Too many requests")
    }

    pub fn content_too_large() -> Self {
        Self::error(413, "Request body is too large").header("connection", "close")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_send() {
        let response = Response::error(400, "Invalid JSON");
        let mut buf = vec![];
        response.send(&mut buf).await.expect("send");
        let raw = String::from_utf8(buf).unwrap();

        assert!(raw.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(raw.contains("content-type: application/json\r\n"));
        assert!(raw.contains("content-length: 24\r\n"));
        assert!(raw.ends_with("\r\n\r\n{\"error\":\"Invalid JSON\"}"));
    }

    #[tokio::test]
    async fn test_send_empty() {
        let response = Response::new();
        let mut buf = vec![];
        response.send(&mut buf).await.expect("send");
        let raw = String::from_utf8(buf).unwrap();

        assert!(raw.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(raw.contains("content-length: 0\r\n"));
        assert!(raw.ends_with("\r\n\r\n"));
    }

    #[tokio::test]
    async fn test_send_head() {
        let response = Response::not_found();
        let mut buf = vec![];
        response.send_head(&mut buf).await.expect("send");
        let raw = String::from_utf8(buf).unwrap();

        assert!(raw.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(raw.contains("content-length: 9\r\n"));
        assert!(raw.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_status() {
        assert_eq!(Response::not_found().status(), Status::NotFound);
        assert_eq!(Response::not_found().body_bytes(), b"Not Found");
        assert!(Response::new().status().ok());
        assert!(!Response::too_many().status().ok());
        assert_eq!(Status::from(418).code(), 418);
    }
}
