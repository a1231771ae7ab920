//! HTTP URL path, e.g. `/admin/messages/6f1c...?status=new`
//!
//! Paths are parsed for each incoming request and compared against
//! the router's regex set to find a handler.
use super::Error;

use std::fmt::Debug;

pub mod with_regex;
pub use with_regex::{PathType, PathWithRegex};

pub mod to_parameter;
pub use to_parameter::ToParameter;

pub mod params;
pub use params::Params;

pub mod query;
pub use query::Query;

/// HTTP URL path.
#[derive(Clone, Debug)]
pub struct Path {
    query: Query,
    base: String,
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.base)?;
        if !self.query.is_empty() {
            write!(f, "?{}", self.query)?;
        }

        Ok(())
    }
}

impl Default for Path {
    fn default() -> Self {
        Path {
            query: Query::new(),
            base: "/".to_string(),
        }
    }
}

impl Path {
    /// Path URL base, without the query.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Get the parsed query.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Get the base path.
    pub fn path(&self) -> &str {
        &self.base
    }

    /// Parse the path from a string.
    ///
    /// # Example
    ///
    /// ```
    /// # use medport::http::Path;
    /// let path = Path::parse("/admin/messages?status=new").unwrap();
    ///
    /// assert_eq!(path.path(), "/admin/messages");
    /// assert_eq!(path.query().get::<String>("status").unwrap(), "new");
    /// ```
    pub fn parse(path: &str) -> Result<Path, Error> {
        // Fragments are never sent by browsers, but be lenient.
        let path = path.split('#').next().unwrap_or_default();

        // All paths must be absolute.
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            "/".to_string() + path
        };

        let (base, query) = match path.split_once('?') {
            None => (path, Query::new()),
            Some((base, query)) => {
                if query.contains('?') {
                    return Err(Error::MalformedRequest("path has malformed query"));
                }
                (base.to_owned(), Query::parse(query))
            }
        };

        Ok(Path { base, query })
    }

    /// Constuct a matching regex for this path. Used for matching of
    /// incoming requests to a controller.
    pub fn with_regex(self, path_type: PathType) -> Result<PathWithRegex, Error> {
        PathWithRegex::new(self, path_type)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_path() {
        let path = Path::parse("/admin/messages?status=archived&q=hello%20world").unwrap();
        assert_eq!(path.path(), "/admin/messages");
        assert_eq!(path.query().get("status"), Some("archived".to_string()));
        assert_eq!(path.query().get("q"), Some("hello world".to_string()));

        let path = Path::parse("contact").unwrap();
        assert_eq!(path.to_string(), "/contact");
        assert!(path.query().is_empty());

        assert!(Path::parse("/contact?a=1?b=2").is_err());
    }

    #[test]
    fn test_regex() {
        let path = Path::parse("/admin/messages")
            .unwrap()
            .with_regex(PathType::Rest)
            .unwrap();
        let regex = path.regex();
        assert!(regex.is_match("/admin/messages"));
        assert!(regex.is_match("/admin/messages/"));
        assert!(regex.is_match(
            "/admin/messages/0b6cd4a0-3d5c-4d4e-9f83-2f0c1bb0f2a1"
        ));
        assert!(!regex.is_match("/admin/messages/1/2"));
        assert!(!regex.is_match("/admin"));
    }
}
