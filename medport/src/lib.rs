//! Medport is the contact intake and admin review service behind the distributor portal.
//!
//! The static portal front end posts contact-form submissions to this service, and the admin
//! dashboard reads them back. Everything runs on a small HTTP/1.1 server built on Tokio.
//!
//! # Getting started
//!
//! ```rust,ignore
//! use medport::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), medport::http::Error> {
//!     let config = Config::load()?;
//!     Logger::init(&config);
//!     medport::app::launch(config).await
//! }
//! ```
//!
//! ### Controllers
//!
//! Requests are served by controllers, structs implementing the [`controller::Controller`]
//! trait:
//!
//! ```rust
//! use medport::prelude::*;
//!
//! struct Ping;
//!
//! #[medport::async_trait]
//! impl Controller for Ping {
//!     async fn handle(&self, _request: &Request) -> Result<Response, Error> {
//!         Ok(Response::new().text("pong"))
//!     }
//! }
//! ```
//!
//! ### Storage
//!
//! Messages are kept in a key-value namespace implementing [`store::KvStore`]. The in-memory
//! store is used by default; configuring `store_path` switches to the durable file store.
pub mod app;
pub mod colors;
pub mod config;
pub mod controller;
pub mod http;
pub mod logging;
pub mod messages;
pub mod prelude;
pub mod store;

/// Wrapper around async traits to make them easy to use.
pub use async_trait::async_trait;
/// Serde is used for (de)serialization.
pub use serde;
/// Tokio is an asynchronous runtime for Rust.
pub use tokio;

use std::net::SocketAddr;

/// Extract the first socket address from a string, e.g. the `X-Forwarded-For` header.
pub fn peer_addr(addr: &str) -> Option<SocketAddr> {
    use std::net::{IpAddr, ToSocketAddrs};

    // Proxies append themselves, the client is first.
    let first = addr.split(',').next()?.trim();

    if let Ok(ip) = first.parse::<IpAddr>() {
        return Some(SocketAddr::new(ip, 0));
    }

    first.to_socket_addrs().ok()?.next()
}
