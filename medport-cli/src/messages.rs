//! Read messages straight from the file store's log. A running server is not needed,
//! nor disturbed.
use medport::colors::MaybeColorize;
use medport::config::Config;
use medport::messages::{self, Messages, Status};
use medport::prelude::Uuid;
use medport::store::FileStore;

use std::sync::Arc;
use time::format_description::well_known::Rfc3339;

use crate::logging::{error, warning};

async fn open(config: &Config) -> Option<Messages> {
    let path = match config.store_path {
        Some(ref path) => path,
        None => {
            error("no store path configured, set [store] path or MEDPORT_STORE_PATH");
            return None;
        }
    };

    if !path.exists() {
        warning(format!("\"{}\" doesn't exist yet", path.display()));
    }

    // Never open the log for writing, the server may be appending to it.
    match FileStore::snapshot(path).await {
        Ok(store) => Some(Messages::new(Arc::new(store))),
        Err(err) => {
            error(format!("can't read \"{}\": {}", path.display(), err));
            None
        }
    }
}

pub async fn list(config: &Config, status: Option<String>) -> bool {
    let status = match status.map(|status| status.parse::<Status>()).transpose() {
        Ok(status) => status,
        Err(_) => {
            error("status must be one of: new, read, archived");
            return false;
        }
    };

    let Some(messages) = open(config).await else {
        return false;
    };

    match messages.list(status).await {
        Ok(messages) => {
            for message in &messages {
                let subject = if message.subject.is_empty() {
                    "(no subject)"
                } else {
                    message.subject.as_str()
                };

                let received = message.timestamp.format(&Rfc3339).unwrap_or_default();

                println!(
                    "{} {} {:<8} {} <{}> {}",
                    message.id,
                    received,
                    message.status.as_str().purple(),
                    message.name.green(),
                    message.email,
                    subject,
                );
            }

            eprintln!("{} messages", messages.len());
            true
        }

        Err(err) => {
            error(err);
            false
        }
    }
}

pub async fn show(config: &Config, id: &str) -> bool {
    let Ok(id) = Uuid::parse_str(id) else {
        error(format!("\"{}\" is not a message id", id));
        return false;
    };

    let Some(messages) = open(config).await else {
        return false;
    };

    match messages.get(&id).await {
        Ok(message) => match serde_json::to_string_pretty(&message) {
            Ok(json) => {
                println!("{}", json);
                true
            }
            Err(err) => {
                error(err);
                false
            }
        },

        Err(messages::Error::NotFound) => {
            error(format!("message {} not found", id));
            false
        }

        Err(err) => {
            error(err);
            false
        }
    }
}
