//! HTTP/1.1 primitives: request parsing, responses, routing and the server loop.
pub mod authorization;
pub mod body;
pub mod error;
pub mod handler;
pub mod head;
pub mod headers;
pub mod path;
pub mod request;
pub mod response;
pub mod router;
pub mod server;
pub mod url;

pub use authorization::Authorization;
pub use body::Body;
pub use error::Error;
pub use handler::Handler;
pub use head::{Head, Method, Version};
pub use headers::Headers;
pub use path::{Params, Path, Query, ToParameter};
pub use request::Request;
pub use response::{Response, Status};
pub use router::Router;
pub use server::Server;
pub use url::urldecode;
