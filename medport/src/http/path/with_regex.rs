//! Path with regex is used to:
//!
//! 1. Route requests to a controller
//! 2. Extract parameters from the URL
//!
//! Parameters are denoted by the colon notation, e.g. `:id`.

use super::{Error, Params, Path};
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

/// A path and the regex that matches requests for it.
#[derive(Debug, Clone)]
pub struct PathWithRegex {
    path: Path,
    params: Arc<Params>,
    path_type: PathType,
}

/// Kind of path routing used for a controller.
#[derive(PartialEq, Debug, Clone)]
pub enum PathType {
    /// Matches the path itself and the path followed by one `/:id` segment.
    Rest,
    /// Will only match the specific path.
    Route,
}

impl PathWithRegex {
    pub(crate) fn new(path: Path, path_type: PathType) -> Result<Self, Error> {
        let mut params = HashMap::new();
        // Group 0 is the whole match.
        let mut group = 1;
        let mut regex = Vec::new();

        for part in path.base().split('/') {
            if let Some(name) = part.strip_prefix(':') {
                params.insert(name.to_owned(), group);
                group += 1;
                regex.push("([a-zA-Z0-9_-]+)".to_string());
            } else {
                regex.push(regex::escape(part));
            }
        }

        let tail = match path_type {
            PathType::Rest => {
                params.insert("id".to_string(), group);
                r#"(\/[a-zA-Z0-9_-]+)?"#
            }
            PathType::Route => "",
        };

        // Trailing slash is optional.
        let end = if path.base().ends_with('/') {
            "$"
        } else {
            r#"\/?$"#
        };

        let regex = Regex::new(&format!("^{}{}{}", regex.join(r#"\/"#), tail, end))?;

        Ok(Self {
            path,
            params: Arc::new(Params::new(regex, params)),
            path_type,
        })
    }

    /// Get the params handler.
    pub fn params(&self) -> Arc<Params> {
        self.params.clone()
    }

    /// Get the regex used to route to this path.
    pub fn regex(&self) -> &Regex {
        self.params.regex()
    }

    pub fn path_type(&self) -> &PathType {
        &self.path_type
    }
}

impl std::ops::Deref for PathWithRegex {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.path
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parameters() {
        let path = Path::parse("/admin/:section/messages").unwrap();
        let with_regex = PathWithRegex::new(path, PathType::Rest).unwrap();
        assert_eq!(
            r#"^\/admin\/([a-zA-Z0-9_-]+)\/messages(\/[a-zA-Z0-9_-]+)?\/?$"#,
            with_regex.regex().as_str()
        );
        let params = with_regex.params();

        let url = "/admin/partners/messages/5f2b";
        assert_eq!(params.parameter(url, "section"), Some("partners"));
        assert_eq!(params.parameter(url, "id"), Some("5f2b"));

        let url = "/admin/partners/messages/";
        assert_eq!(params.parameter(url, "id"), None);
    }

    #[test]
    fn test_route() {
        let path = Path::parse("/contact").unwrap();
        let with_regex = PathWithRegex::new(path, PathType::Route).unwrap();
        assert!(with_regex.regex().is_match("/contact"));
        assert!(with_regex.regex().is_match("/contact/"));
        assert!(!with_regex.regex().is_match("/contact/1"));
        assert!(!with_regex.regex().is_match("/contacts"));
    }
}
