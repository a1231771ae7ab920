//! Conversion between URL parameters and Rust types.
use super::Error;
use std::fmt::Debug;
use uuid::Uuid;

/// Convert a URL parameter to a Rust type.
pub trait ToParameter: Sync + Send + Debug {
    /// Perform the type conversion.
    fn to_parameter(s: &str) -> Result<Self, Error>
    where
        Self: Sized;
}

impl ToParameter for String {
    fn to_parameter(s: &str) -> Result<String, Error> {
        Ok(s.to_string())
    }
}

impl ToParameter for Uuid {
    fn to_parameter(s: &str) -> Result<Uuid, Error> {
        Uuid::parse_str(s).map_err(|_| Error::MalformedRequest("uuid"))
    }
}
