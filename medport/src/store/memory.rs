//! In-process store. Contents are lost when the process exits.
use async_trait::async_trait;
use parking_lot::Mutex;

use super::{Entries, Error, KvStore};

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<Entries>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_entries(entries: Entries) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Number of keys stored.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn put(&self, key: &str, value: String) -> Result<(), Error> {
        self.entries.lock().put(key, value);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<(String, String)>, Error> {
        Ok(self.entries.lock().list(prefix))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.put("msg:1", "one".into()).await.unwrap();
        store.put("msg:2", "two".into()).await.unwrap();
        store.put("msg:1", "uno".into()).await.unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("msg:1").await.unwrap().unwrap(), "uno");
        assert!(store.get("msg:3").await.unwrap().is_none());

        let keys = store
            .list("msg:")
            .await
            .unwrap()
            .into_iter()
            .map(|(key, _)| key)
            .collect::<Vec<_>>();
        assert_eq!(keys, vec!["msg:1", "msg:2"]);
    }
}
