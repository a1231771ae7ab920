//! HTTP headers.
use std::collections::HashMap;

/// HTTP headers, keyed by lowercase name.
#[derive(Clone, Debug, Default)]
pub struct Headers {
    headers: HashMap<String, String>,
}

impl Headers {
    /// Create new empty headers storage.
    pub fn new() -> Self {
        Self {
            headers: HashMap::new(),
        }
    }

    /// Add a header. The name is converted to lowercase, an existing value is replaced.
    ///
    /// # Example
    ///
    /// ```
    /// # use medport::http::Headers;
    /// let mut headers = Headers::new();
    /// headers.insert("Content-Type", "application/json");
    /// assert_eq!(headers.get("content-type").map(|s| s.as_str()), Some("application/json"));
    /// ```
    pub fn insert(&mut self, name: impl ToString, value: impl ToString) {
        self.headers
            .insert(name.to_string().to_lowercase(), value.to_string());
    }

    /// Add a header only if it's not set already.
    pub fn insert_missing(&mut self, name: impl ToString, value: impl ToString) {
        self.headers
            .entry(name.to_string().to_lowercase())
            .or_insert_with(|| value.to_string());
    }

    /// Get a header value by name. Case insensitive.
    pub fn get(&self, name: &str) -> Option<&String> {
        self.headers.get(&name.to_lowercase())
    }

    /// Is the header set? Case insensitive.
    pub fn contains(&self, name: &str) -> bool {
        self.headers.contains_key(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Serialize headers the way they're sent on the wire.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        for (name, value) in &self.headers {
            bytes.extend_from_slice(name.as_bytes());
            bytes.extend_from_slice(b": ");
            bytes.extend_from_slice(value.as_bytes());
            bytes.extend_from_slice(b"\r\n");
        }
        bytes
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_insert_missing() {
        let mut headers = Headers::new();
        headers.insert("Access-Control-Allow-Origin", "https://portal.example");
        headers.insert_missing("access-control-allow-origin", "*");
        assert_eq!(
            headers.get("ACCESS-CONTROL-ALLOW-ORIGIN").unwrap(),
            "https://portal.example"
        );

        headers.insert_missing("vary", "Origin");
        assert!(headers.contains("Vary"));
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_to_bytes() {
        let mut headers = Headers::new();
        headers.insert("Content-Length", 0);
        assert_eq!(headers.to_bytes(), b"content-length: 0\r\n");
    }
}
