//! Handles HTTP URL parameters, e.g. '/admin/messages/:id`.
use regex::Regex;
use std::collections::HashMap;

/// Extracts named URL parameters using the route's regex captures.
#[derive(Debug)]
pub struct Params {
    params: HashMap<String, usize>,
    regex: Regex,
}

impl Params {
    /// Create new parameters handler from the route regex and the capture
    /// group index of each named parameter.
    pub fn new(regex: Regex, params: HashMap<String, usize>) -> Self {
        Self { params, regex }
    }

    /// Extract a parameter from the URL.
    pub fn parameter<'a>(&'a self, base: &'a str, name: &str) -> Option<&'a str> {
        let index = self.params.get(name)?;
        let capture = self.regex.captures(base)?.get(*index)?.as_str();

        // Optional trailing segments are captured with their slash.
        Some(capture.strip_prefix('/').unwrap_or(capture))
    }

    /// Get the regex that parses the parameters.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}
