use async_trait::async_trait;
use once_cell::sync::Lazy;

pub mod auth;
pub mod error;
pub mod middleware;

pub use auth::{AllowAll, AuthHandler, Authentication, BearerToken};
pub use error::Error;
pub use middleware::{Cors, Middleware, MiddlewareHandler, MiddlewareSet, Outcome, RateLimiter};

use super::http::{Handler, Method, Request, Response, ToParameter};

use tracing::error;

static ALLOW_ALL: Lazy<AuthHandler> = Lazy::new(AuthHandler::default);
static NO_MIDDLEWARE: Lazy<MiddlewareSet> = Lazy::new(MiddlewareSet::default);

/// The HTTP controller.
///
/// The most basic version of a controller handles all requests
/// which match the path it's assigned to.
#[async_trait]
#[allow(unused_variables)]
pub trait Controller: Sync + Send {
    /// Authentication mechanism for this controller. All requests are allowed by default.
    fn auth(&self) -> &AuthHandler {
        &ALLOW_ALL
    }

    /// Middleware wrapping this controller. None by default.
    fn middleware(&self) -> &MiddlewareSet {
        &NO_MIDDLEWARE
    }

    fn route(self, path: &str) -> Result<Handler, crate::http::Error>
    where
        Self: Sized + 'static,
    {
        Handler::route(path, self)
    }

    /// Internal function to handle the HTTP request. Do not implement this unless
    /// you're looking to do something really custom.
    ///
    /// Middleware sees the request first, so CORS preflights are answered without
    /// credentials. Authentication runs on forwarded requests only. Every response,
    /// including denials and errors, goes back through the middleware that ran.
    async fn handle_internal(&self, request: Request) -> Result<Response, Error> {
        let (outcome, executed) = self.middleware().handle_request(request).await?;

        let (request, response) = match outcome {
            Outcome::Forward(request) => {
                let auth = self.auth().auth();

                let response = if !auth.authorize(&request).await? {
                    auth.denied(&request).await?
                } else {
                    match self.handle(&request).await {
                        Ok(response) => response,
                        Err(err) => {
                            error!("{}", err);
                            err.response()
                        }
                    }
                };

                (request, response)
            }

            Outcome::Stop(request, response) => (request, response),
        };

        self.middleware()
            .handle_response(&request, response, executed)
            .await
    }

    /// Handle the request. Implement this function to define how your controller
    /// will respond to requests.
    async fn handle(&self, request: &Request) -> Result<Response, Error>;

    /// The name of this controller. Used for logging.
    fn controller_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// REST controller.
///
/// Splits incoming requests based on the method and the presence of an `:id`
/// and routes them to their respective methods:
///
/// - list (GET /)
/// - create (POST /)
/// - get (GET /:id)
/// - update (PUT /:id)
/// - patch (PATCH /:id)
/// - delete (DELETE /:id)
///
/// By default, all methods respond with `405 - Method Not Allowed`.
///
/// # Example
///
/// ```
/// use medport::controller::{Controller, RestController, Error};
/// use medport::http::{Request, Response};
/// use medport::async_trait;
///
/// struct Products;
///
/// #[async_trait]
/// impl Controller for Products {
///     async fn handle(&self, request: &Request) -> Result<Response, Error> {
///         RestController::handle(self, request).await
///     }
/// }
///
/// #[async_trait]
/// impl RestController for Products {
///     type Resource = String;
///
///     async fn get(&self, _request: &Request, id: &String) -> Result<Response, Error> {
///         Ok(Response::new().text(format!("product {}", id)))
///     }
/// }
/// ```
#[async_trait]
#[allow(unused_variables)]
pub trait RestController: Controller {
    type Resource: ToParameter;

    /// Figure out which method to call based on request method and path.
    async fn handle(&self, request: &Request) -> Result<Response, Error> {
        let method = request.method();
        let parameter = request.parameter::<Self::Resource>("id");

        match parameter {
            Ok(Some(id)) => match method {
                Method::Get => self.get(request, &id).await,
                Method::Put => self.update(request, &id).await,
                Method::Delete => self.delete(request, &id).await,
                Method::Patch => self.patch(request, &id).await,
                _ => Ok(Response::method_not_allowed()),
            },
            Ok(None) => match method {
                Method::Get => self.list(request).await,
                Method::Post => self.create(request).await,
                _ => Ok(Response::method_not_allowed()),
            },
            Err(_) => self.invalid_id(request).await,
        }
    }

    fn rest(self, path: &str) -> Result<Handler, crate::http::Error>
    where
        Self: Sized + 'static,
    {
        Handler::rest(path, self)
    }

    /// The `:id` in the path could not be converted to [`Self::Resource`].
    async fn invalid_id(&self, request: &Request) -> Result<Response, Error> {
        Ok(Response::bad_request())
    }

    async fn list(&self, request: &Request) -> Result<Response, Error> {
        Ok(Response::method_not_allowed())
    }

    async fn get(&self, request: &Request, id: &Self::Resource) -> Result<Response, Error> {
        Ok(Response::method_not_allowed())
    }

    async fn create(&self, request: &Request) -> Result<Response, Error> {
        Ok(Response::method_not_allowed())
    }

    async fn update(&self, request: &Request, id: &Self::Resource) -> Result<Response, Error> {
        Ok(Response::method_not_allowed())
    }

    async fn patch(&self, request: &Request, id: &Self::Resource) -> Result<Response, Error> {
        Ok(Response::method_not_allowed())
    }

    async fn delete(&self, request: &Request, id: &Self::Resource) -> Result<Response, Error> {
        Ok(Response::method_not_allowed())
    }
}
