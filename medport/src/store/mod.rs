//! Key-value storage for serialized records.
//!
//! Records are opaque strings keyed by name. Listing by prefix returns entries in the order
//! their keys were first written, which is the order the admin dashboard shows them in.
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::Config;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

#[derive(Error, Debug)]
pub enum Error {
    #[error("store io: {0}")]
    Io(#[from] std::io::Error),

    #[error("store json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Asynchronous key-value namespace.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Write a value. The last write for a key wins.
    async fn put(&self, key: &str, value: String) -> Result<(), Error>;

    /// Read a value, if the key exists.
    async fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// All entries whose key starts with `prefix`, in first-insertion order.
    async fn list(&self, prefix: &str) -> Result<Vec<(String, String)>, Error>;
}

/// Open the store selected by the configuration.
pub async fn open(config: &Config) -> Result<Arc<dyn KvStore>, Error> {
    match config.store_path {
        Some(ref path) => Ok(Arc::new(FileStore::open(path).await?)),
        None => Ok(Arc::new(MemoryStore::new())),
    }
}

/// Insertion-ordered map shared by the store backends.
#[derive(Debug, Default, Clone)]
pub(crate) struct Entries {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl Entries {
    pub(crate) fn put(&mut self, key: &str, value: String) {
        match self.index.get(key) {
            Some(&position) => self.entries[position].1 = value,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), value));
            }
        }
    }

    pub(crate) fn get(&self, key: &str) -> Option<&String> {
        self.index
            .get(key)
            .map(|&position| &self.entries[position].1)
    }

    pub(crate) fn list(&self, prefix: &str) -> Vec<(String, String)> {
        self.entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_entries_order() {
        let mut entries = Entries::default();
        entries.put("msg:b", "1".into());
        entries.put("msg:a", "2".into());
        entries.put("other", "3".into());
        entries.put("msg:b", "4".into());

        assert_eq!(entries.len(), 3);
        assert_eq!(entries.get("msg:b").unwrap(), "4");
        assert_eq!(
            entries.list("msg:"),
            vec![
                ("msg:b".to_string(), "4".to_string()),
                ("msg:a".to_string(), "2".to_string()),
            ]
        );
        assert!(entries.get("msg:c").is_none());
    }

    #[tokio::test]
    async fn test_open_default() {
        let store = open(&Config::default()).await.unwrap();
        store.put("msg:1", "{}".into()).await.unwrap();
        assert_eq!(store.list("msg:").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_open_file() {
        let dir = tempdir::TempDir::new("medport").unwrap();
        let mut config = Config::default();
        config.store_path = Some(dir.path().join("messages.jsonl"));

        {
            let store = open(&config).await.unwrap();
            store.put("msg:1", "{}".into()).await.unwrap();
        }

        // Written to disk, so a second store sees it.
        let store = open(&config).await.unwrap();
        assert_eq!(store.get("msg:1").await.unwrap().as_deref(), Some("{}"));
        assert!(dir.path().join("messages.jsonl").exists());
    }
}
