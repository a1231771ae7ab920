//! Contact messages: intake from the portal and review by admins.
//!
//! Messages live in the key-value store under `msg:<uuid>`, serialized as JSON.
use thiserror::Error;

use crate::http::Response;
use crate::store;

pub mod controllers;
pub mod model;
pub mod repository;

pub use controllers::{AdminMessagesController, ContactController};
pub use model::{ContactForm, ContactMessage, Status};
pub use repository::Messages;

/// Prefix of every message key in the store.
pub const KEY_PREFIX: &str = "msg:";

/// Errors of the message workflow. Each one maps to exactly one HTTP response.
#[derive(Error, Debug)]
pub enum Error {
    #[error("missing required fields")]
    MissingFields,

    #[error("body is not valid JSON")]
    InvalidJson,

    #[error("invalid status")]
    InvalidStatus,

    #[error("message not found")]
    NotFound,

    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition { from: Status, to: Status },

    #[error("failed to save message: {0}")]
    Save(#[source] store::Error),

    #[error("failed to load messages: {0}")]
    Load(#[source] store::Error),
}

impl Error {
    pub fn response(&self) -> Response {
        match self {
            Error::MissingFields => Response::error(400, "Missing required fields"),
            Error::InvalidJson => Response::error(400, "Invalid JSON"),
            Error::InvalidStatus => Response::error(400, "Invalid status"),
            Error::NotFound => Response::error(404, "Message not found"),
            Error::InvalidTransition { .. } => Response::error(409, "Invalid status transition"),
            Error::Save(_) => Response::error(500, "Failed to save message"),
            Error::Load(_) => Response::error(500, "Failed to load messages"),
        }
    }

    /// Failures on our side, as opposed to a bad request.
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::Save(_) | Error::Load(_))
    }
}

/// Store key of a message.
pub fn key(id: &uuid::Uuid) -> String {
    format!("{}{}", KEY_PREFIX, id)
}
