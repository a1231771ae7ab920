use std::collections::HashMap;
use std::ops::Deref;
use std::str::FromStr;

use crate::http::urldecode;

/// URL query, e.g. `status=new&page=2`.
#[derive(Debug, Clone, Default)]
pub struct Query {
    query: HashMap<String, String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(data: &str) -> Self {
        let mut query = Self::new();

        for part in data.split('&').filter(|part| !part.is_empty()) {
            // ?flag is the same as ?flag=
            let (key, value) = part.split_once('=').unwrap_or((part, ""));

            // Decode any URL-encoded values back into UTF-8.
            query.query.insert(urldecode(key), urldecode(value));
        }

        query
    }

    pub fn get<T: FromStr>(&self, name: &str) -> Option<T> {
        self.query.get(name)?.parse::<T>().ok()
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut params = self
            .query
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>();
        params.sort();

        write!(f, "{}", params.join("&"))
    }
}

impl Deref for Query {
    type Target = HashMap<String, String>;

    fn deref(&self) -> &Self::Target {
        &self.query
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() {
        let query = Query::parse("status=new&flag&page=2&");
        assert_eq!(query.get::<String>("status"), Some("new".into()));
        assert_eq!(query.get::<String>("flag"), Some("".into()));
        assert_eq!(query.get::<i64>("page"), Some(2));
        assert_eq!(query.get::<i64>("status"), None);
        assert_eq!(query.get::<String>("missing"), None);
        assert_eq!(query.to_string(), "flag=&page=2&status=new");
    }
}
