//! HTTP controllers for the contact form and the admin dashboard.
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{error, info};
use uuid::Uuid;

use super::{Error, Messages, Status};
use crate::config::Config;
use crate::controller::{
    AuthHandler, Authentication, BearerToken, Controller, Cors, Error as ControllerError,
    Middleware, MiddlewareSet, RateLimiter, RestController,
};
use crate::http::{Method, Request, Response};
use crate::store::KvStore;

/// Turn a workflow error into its response, logging the ones that are our fault.
fn failed(err: Error) -> Response {
    if err.is_internal() {
        error!("{}", err);
    }
    err.response()
}

fn parse_body(request: &Request) -> Result<Value, Error> {
    request.json_raw().map_err(|_| Error::InvalidJson)
}

/// `POST /contact`, the portal's contact form.
pub struct ContactController {
    messages: Messages,
    middleware: MiddlewareSet,
}

impl ContactController {
    pub fn new(config: &Config, store: Arc<dyn KvStore>) -> Self {
        let mut middleware = vec![Cors::new(&config.allowed_origin)
            .methods(&[Method::Post, Method::Options])
            .allow_headers(&["Content-Type"])
            .middleware()];

        if let Some(limit) = config.contact_rate_limit {
            middleware.push(
                RateLimiter::per_minute(limit)
                    .trust_forwarded_for(config.trust_forwarded_for)
                    .middleware(),
            );
        }

        Self {
            messages: Messages::new(store),
            middleware: MiddlewareSet::new(middleware),
        }
    }

    async fn submit(&self, request: &Request) -> Result<Uuid, Error> {
        let body = parse_body(request)?;
        let form = super::ContactForm::from_json(&body)?;
        let message = self.messages.create(form).await?;

        Ok(message.id)
    }
}

#[async_trait]
impl Controller for ContactController {
    fn middleware(&self) -> &MiddlewareSet {
        &self.middleware
    }

    async fn handle(&self, request: &Request) -> Result<Response, ControllerError> {
        if request.method() != &Method::Post {
            return Ok(Response::method_not_allowed());
        }

        match self.submit(request).await {
            Ok(id) => {
                info!("received contact message {}", id);
                Ok(Response::new().json(json!({ "success": true, "id": id }))?)
            }
            Err(err) => Ok(failed(err)),
        }
    }
}

/// `/admin/messages[/:id]`, message review for admins.
pub struct AdminMessagesController {
    messages: Messages,
    auth: AuthHandler,
    middleware: MiddlewareSet,
}

impl AdminMessagesController {
    pub fn new(config: &Config, store: Arc<dyn KvStore>) -> Self {
        let auth = match config.admin_token {
            Some(ref token) => BearerToken::new(token).handler(),
            None => AuthHandler::default(),
        };

        Self {
            messages: Messages::new(store),
            auth,
            middleware: MiddlewareSet::new(vec![Cors::new(&config.allowed_origin)
                .methods(&[Method::Get, Method::Patch, Method::Options])
                .allow_headers(&["Content-Type", "Authorization"])
                .middleware()]),
        }
    }
}

#[async_trait]
impl Controller for AdminMessagesController {
    fn auth(&self) -> &AuthHandler {
        &self.auth
    }

    fn middleware(&self) -> &MiddlewareSet {
        &self.middleware
    }

    async fn handle(&self, request: &Request) -> Result<Response, ControllerError> {
        RestController::handle(self, request).await
    }
}

#[async_trait]
impl RestController for AdminMessagesController {
    type Resource = Uuid;

    /// Message ids are UUIDs, anything else can't exist.
    async fn invalid_id(&self, _request: &Request) -> Result<Response, ControllerError> {
        Ok(Error::NotFound.response())
    }

    async fn list(&self, request: &Request) -> Result<Response, ControllerError> {
        let status = match request.query().get::<String>("status") {
            Some(status) => match status.parse::<Status>() {
                Ok(status) => Some(status),
                Err(err) => return Ok(failed(err)),
            },
            None => None,
        };

        match self.messages.list(status).await {
            Ok(messages) => Ok(Response::new().json(json!({ "messages": messages }))?),
            Err(err) => Ok(failed(err)),
        }
    }

    async fn get(&self, _request: &Request, id: &Uuid) -> Result<Response, ControllerError> {
        match self.messages.get(id).await {
            Ok(message) => Ok(Response::new().json(message)?),
            Err(err) => Ok(failed(err)),
        }
    }

    async fn patch(&self, request: &Request, id: &Uuid) -> Result<Response, ControllerError> {
        let status = parse_body(request).and_then(|body| {
            body.get("status")
                .and_then(Value::as_str)
                .ok_or(Error::InvalidStatus)?
                .parse::<Status>()
        });

        let status = match status {
            Ok(status) => status,
            Err(err) => return Ok(failed(err)),
        };

        match self.messages.set_status(id, status).await {
            Ok(message) => {
                info!("message {} is now {}", message.id, message.status);
                Ok(Response::new().json(message)?)
            }
            Err(err) => Ok(failed(err)),
        }
    }
}
