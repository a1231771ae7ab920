//! HTTP middleware.
//!
//! Middleware runs before a request reaches a controller and
//! after the controller has returned a response. It can transform requests, reject them
//! and return a different response, or decorate the response on the way out.
//!
//! Implementing your own middleware requires implementing the [`Middleware`] trait on a struct.
//! See [`Cors`] and [`RateLimiter`] for the ones the portal uses.
use super::Error;
use crate::{
    colors::MaybeColorize,
    http::{Request, Response},
};
use async_trait::async_trait;
use std::ops::Deref;
use std::sync::Arc;
use tracing::debug;

pub mod cors;
pub use cors::Cors;

pub mod rate_limiter;
pub use rate_limiter::RateLimiter;

/// The result of middleware processing a request.
pub enum Outcome {
    /// Forward the request to the next middleware in the chain, or if none are left,
    /// to the controller.
    Forward(Request),
    /// Intercept the request, and return the response instead.
    Stop(Request, Response),
}

/// HTTP middleware, code which runs before a request is sent to a controller
/// and after the controller has provided a response.
///
/// # Example
///
/// ```
/// use medport::controller::{Error, Middleware, Outcome};
/// use medport::http::{Request, Response};
/// use medport::async_trait;
///
/// struct RequireHeader;
///
/// #[async_trait]
/// impl Middleware for RequireHeader {
///     async fn handle_request(&self, request: Request) -> Result<Outcome, Error> {
///         if request.header("x-portal-client").is_some() {
///             Ok(Outcome::Forward(request))
///         } else {
///             Ok(Outcome::Stop(request, Response::forbidden()))
///         }
///     }
/// }
/// ```
#[async_trait]
#[allow(unused_variables)]
pub trait Middleware: Send + Sync {
    /// Process the request before it reaches the controller. You can modify it,
    /// forward it without modification, or block the request entirely
    /// and return a response.
    async fn handle_request(&self, request: Request) -> Result<Outcome, Error>;

    /// Process the response returned by a controller. You can modify it
    /// or forward it without modification.
    async fn handle_response(
        &self,
        request: &Request,
        response: Response,
    ) -> Result<Response, Error> {
        Ok(response)
    }

    /// Get the middleware handler, used when adding middleware to a [`MiddlewareSet`].
    fn middleware(self) -> MiddlewareHandler
    where
        Self: Sized + 'static,
    {
        MiddlewareHandler::new(self)
    }

    fn middleware_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Wrapper around a struct implementing the [`Middleware`] trait.
#[derive(Clone)]
pub struct MiddlewareHandler {
    middleware: Arc<Box<dyn Middleware>>,
}

impl MiddlewareHandler {
    /// Create new middleware wrapper.
    pub fn new(middleware: impl Middleware + 'static) -> Self {
        Self {
            middleware: Arc::new(Box::new(middleware)),
        }
    }

    async fn handle_request(&self, request: Request) -> Result<Outcome, Error> {
        debug!(
            "{} {} => {}",
            "middleware".purple(),
            request.path().base().purple(),
            self.middleware.deref().middleware_name().green()
        );
        self.middleware.deref().handle_request(request).await
    }

    async fn handle_response(
        &self,
        request: &Request,
        response: Response,
    ) -> Result<Response, Error> {
        debug!(
            "{} {} <= {}",
            "middleware".purple(),
            request.path().base().purple(),
            self.middleware.deref().middleware_name().green()
        );
        self.middleware
            .deref()
            .handle_response(request, response)
            .await
    }
}

/// A middleware collection, executed in the order given at creation.
#[derive(Default, Clone)]
pub struct MiddlewareSet {
    handlers: Vec<MiddlewareHandler>,
}

impl MiddlewareSet {
    pub fn new(handlers: Vec<MiddlewareHandler>) -> Self {
        Self { handlers }
    }

    /// Handle an incoming request, by sending it through the middleware chain.
    ///
    /// Returns the outcome and how many middleware ran, the one that stopped the
    /// request included.
    pub async fn handle_request(&self, mut request: Request) -> Result<(Outcome, usize), Error> {
        for (idx, middleware) in self.handlers.iter().enumerate() {
            match middleware.handle_request(request).await? {
                Outcome::Forward(req) => request = req,
                Outcome::Stop(request, response) => {
                    return Ok((Outcome::Stop(request, response), idx + 1))
                }
            }
        }

        Ok((Outcome::Forward(request), self.handlers.len()))
    }

    /// Handle the response received from a controller, by sending it back
    /// through the middleware chain in reverse order.
    ///
    /// If a request was intercepted by a middleware in the chain, only
    /// the middleware that already ran will be executed.
    pub async fn handle_response(
        &self,
        request: &Request,
        mut response: Response,
        executed: usize,
    ) -> Result<Response, Error> {
        let skip = self.handlers.len().saturating_sub(executed);
        for middleware in self.handlers.iter().rev().skip(skip) {
            response = middleware.handle_response(request, response).await?;
        }

        Ok(response)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
