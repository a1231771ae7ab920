//! The service: routes and startup.
use std::sync::Arc;

use crate::config::Config;
use crate::controller::{Controller, RestController};
use crate::http::{Error, Handler, Server};
use crate::messages::{AdminMessagesController, ContactController};
use crate::store::{self, KvStore};

/// All routes served by medport.
pub fn routes(config: &Config, store: Arc<dyn KvStore>) -> Result<Vec<Handler>, Error> {
    Ok(vec![
        ContactController::new(config, store.clone()).route("/contact")?,
        AdminMessagesController::new(config, store).rest("/admin/messages")?,
    ])
}

/// Open the configured store and serve until Ctrl-C.
pub async fn launch(config: Config) -> Result<(), Error> {
    let store = store::open(&config).await?;
    let handlers = routes(&config, store)?;

    Server::new(Arc::new(config), handlers)?.launch().await
}
