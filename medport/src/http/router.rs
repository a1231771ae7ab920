//! HTTP request routing.
//!
use super::{Error, Handler, Path};
use crate::colors::MaybeColorize;

use regex::RegexSet;
use tracing::info;

#[derive(Default)]
pub struct Router {
    regex: RegexSet,
    handlers: Vec<Handler>,
}

impl Router {
    pub fn new(handlers: Vec<Handler>) -> Result<Self, Error> {
        let paths = handlers
            .iter()
            .map(|h| h.path_with_regex().regex().as_str())
            .collect::<Vec<_>>();
        let regex = RegexSet::new(paths)?;

        Ok(Self { regex, handlers })
    }

    /// Find the handler for the path. When several match, the longest route wins.
    pub fn find(&self, path: &Path) -> Option<&Handler> {
        self.regex
            .matches(path.base())
            .iter()
            .map(|i| &self.handlers[i])
            .max_by_key(|h| h.path().base().len())
    }

    pub fn log_routes(&self) {
        let mut handlers = self.handlers.iter().collect::<Vec<_>>();
        handlers.sort_by_key(|h| h.path().path());
        for handler in handlers {
            info!(
                ">> {} => {}",
                handler.path().path().purple(),
                handler.controller_name().green()
            );
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::async_trait;
    use crate::controller::{Controller, Error as ControllerError};
    use crate::http::{Request, Response};

    struct ContactController;
    struct MessagesController;

    #[async_trait]
    impl Controller for ContactController {
        async fn handle(&self, _request: &Request) -> Result<Response, ControllerError> {
            Ok(Response::default().text("ContactController"))
        }
    }

    #[async_trait]
    impl Controller for MessagesController {
        async fn handle(&self, _request: &Request) -> Result<Response, ControllerError> {
            Ok(Response::default().text("MessagesController"))
        }
    }

    #[tokio::test]
    async fn test_find() {
        let router = Router::new(vec![
            Handler::route("/contact", ContactController).unwrap(),
            Handler::rest("/admin/messages", MessagesController).unwrap(),
        ])
        .expect("to compile");

        let handler = router
            .find(&Path::parse("/admin/messages/abc-123").unwrap())
            .expect("to match");
        let response = handler.handle(&Request::default()).await.unwrap();
        assert_eq!(response.body_bytes(), b"MessagesController");

        let handler = router
            .find(&Path::parse("/contact?ref=footer").unwrap())
            .expect("to match");
        assert!(handler.controller_name().ends_with("ContactController"));

        assert!(router.find(&Path::parse("/unknown").unwrap()).is_none());
        assert!(router.find(&Path::parse("/admin").unwrap()).is_none());
    }
}
