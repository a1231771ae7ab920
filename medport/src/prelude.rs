//! A collection of types and traits which, when imported, make writing controllers easy.
//!
//! ```
//! use medport::prelude::*;
//! ```
pub use crate::config::Config;
pub use crate::controller::{
    AuthHandler, Authentication, Controller, Error, Middleware, MiddlewareSet, Outcome,
    RestController,
};
pub use crate::http::{Method, Request, Response};
pub use crate::logging::Logger;
pub use crate::messages::{ContactMessage, Messages, Status};
pub use crate::store::KvStore;

/// A macro to easily implement async traits methods.
pub use async_trait::async_trait;

pub use serde::{Deserialize, Serialize};
pub use time::OffsetDateTime;
pub use tokio;
pub use uuid::Uuid;
