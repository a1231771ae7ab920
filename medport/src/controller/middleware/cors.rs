//! Cross-origin resource sharing.
//!
//! The portal front end is served from a different origin than this API,
//! so browsers preflight every non-simple request with `OPTIONS`.
use async_trait::async_trait;

use super::{Middleware, Outcome};
use crate::controller::Error;
use crate::http::{Method, Request, Response};

/// Answers CORS preflights and decorates every response with the CORS headers.
pub struct Cors {
    origin: String,
    methods: String,
    headers: String,
}

impl Cors {
    /// Allow requests from this origin, e.g. `*` or `https://portal.example`.
    pub fn new(origin: impl ToString) -> Self {
        Self {
            origin: origin.to_string(),
            methods: "GET, POST, OPTIONS".into(),
            headers: "Content-Type".into(),
        }
    }

    /// Methods advertised in `Access-Control-Allow-Methods`.
    pub fn methods(mut self, methods: &[Method]) -> Self {
        self.methods = methods
            .iter()
            .map(|method| method.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        self
    }

    /// Headers advertised in `Access-Control-Allow-Headers`.
    pub fn allow_headers(mut self, headers: &[&str]) -> Self {
        self.headers = headers.join(", ");
        self
    }

    fn decorate(&self, response: Response) -> Response {
        allow_origin(response, &self.origin)
            .header("access-control-allow-methods", &self.methods)
            .header("access-control-allow-headers", &self.headers)
    }
}

#[async_trait]
impl Middleware for Cors {
    async fn handle_request(&self, request: Request) -> Result<Outcome, Error> {
        if request.method() == &Method::Options {
            Ok(Outcome::Stop(request, Response::new()))
        } else {
            Ok(Outcome::Forward(request))
        }
    }

    async fn handle_response(
        &self,
        _request: &Request,
        response: Response,
    ) -> Result<Response, Error> {
        Ok(self.decorate(response))
    }
}

/// Set `Access-Control-Allow-Origin`, unless a middleware set it already.
pub fn allow_origin(mut response: Response, origin: &str) -> Response {
    response
        .headers_mut()
        .insert_missing("access-control-allow-origin", origin);
    response
}
