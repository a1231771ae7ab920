//! Authentication system.
//!
//! Implement the [`Authentication`] trait and set it on a controller to restrict access.
//! The admin routes use [`BearerToken`]; everything else allows all requests.
use super::Error;
use crate::http::{Authorization, Request, Response};

use async_trait::async_trait;

use std::sync::Arc;

/// An authentication mechanism wrapper that can be attached to a controller.
#[derive(Clone)]
pub struct AuthHandler {
    auth: Arc<Box<dyn Authentication>>,
}

impl Default for AuthHandler {
    fn default() -> Self {
        Self::new(AllowAll {})
    }
}

impl AuthHandler {
    /// Create new authentication mechanism using the provided authentication method.
    pub fn new(auth: impl Authentication + 'static) -> Self {
        AuthHandler {
            auth: Arc::new(Box::new(auth)),
        }
    }

    /// Get the authentication method.
    pub fn auth(&self) -> &dyn Authentication {
        self.auth.as_ref().as_ref()
    }
}

/// Authenticators need to implement this trait.
#[async_trait]
#[allow(unused_variables)]
pub trait Authentication: Sync + Send {
    /// Perform the authentication and allow or deny the request from
    /// going forward.
    async fn authorize(&self, request: &Request) -> Result<bool, Error>;

    /// If the request is denied, return a specific response.
    /// Default is `403 - Forbidden`.
    async fn denied(&self, request: &Request) -> Result<Response, Error> {
        Ok(Response::forbidden())
    }

    fn handler(self) -> AuthHandler
    where
        Self: Sized + 'static,
    {
        AuthHandler::new(self)
    }
}

/// Allow all requests. This is the default authentication method for all controllers.
pub struct AllowAll;

#[async_trait]
impl Authentication for AllowAll {
    async fn authorize(&self, _request: &Request) -> Result<bool, Error> {
        Ok(true)
    }
}

/// Static token authentication, issued out of band to admins.
///
/// Accepts `Authorization: Bearer <token>`, or HTTP Basic with the token as the password
/// (any user name), which is convenient with `curl -u`.
pub struct BearerToken {
    token: String,
}

impl BearerToken {
    pub fn new(token: impl ToString) -> Self {
        Self {
            token: token.to_string(),
        }
    }

    /// Generate a random 256-bit token, URL-safe base64 encoded.
    pub fn generate() -> String {
        use base64::{engine::general_purpose, Engine as _};
        use rand::Rng;

        let bytes = rand::thread_rng().gen::<[u8; 256 / 8]>();

        general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }

    fn matches(&self, candidate: &str) -> bool {
        // Compare every byte so the comparison time doesn't depend on the prefix matched.
        candidate.len() == self.token.len()
            && candidate
                .bytes()
                .zip(self.token.bytes())
                .fold(0u8, |diff, (a, b)| diff | (a ^ b))
                == 0
    }
}

#[async_trait]
impl Authentication for BearerToken {
    async fn authorize(&self, request: &Request) -> Result<bool, Error> {
        Ok(match request.authorization() {
            Some(Authorization::Bearer { token }) => self.matches(&token),
            Some(Authorization::Basic { password, .. }) => self.matches(&password),
            None => false,
        })
    }

    async fn denied(&self, _request: &Request) -> Result<Response, Error> {
        Ok(Response::unauthorized("Bearer"))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::http::request::test::request;

    #[tokio::test]
    async fn test_bearer_token() {
        let auth = BearerToken::new("s3cret");

        let ok = request("GET", "/admin/messages", &[("Authorization", "Bearer s3cret")], "")
            .await
            .unwrap();
        assert!(auth.authorize(&ok).await.unwrap());

        // admin:s3cret
        let basic = request(
            "GET",
            "/admin/messages",
            &[("Authorization", "Basic YWRtaW46czNjcmV0")],
            "",
        )
        .await
        .unwrap();
        assert!(auth.authorize(&basic).await.unwrap());

        let wrong = request("GET", "/admin/messages", &[("Authorization", "Bearer s3cre")], "")
            .await
            .unwrap();
        assert!(!auth.authorize(&wrong).await.unwrap());

        let missing = request("GET", "/admin/messages", &[], "").await.unwrap();
        assert!(!auth.authorize(&missing).await.unwrap());

        let denied = auth.denied(&missing).await.unwrap();
        assert_eq!(denied.status().code(), 401);
        assert_eq!(denied.headers().get("www-authenticate").unwrap(), "Bearer");
    }

    #[test]
    fn test_generate() {
        let token = BearerToken::generate();
        assert_eq!(token.len(), 43);
        assert_ne!(token, BearerToken::generate());
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
