use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

use super::{key, ContactForm, ContactMessage, Error, Status, KEY_PREFIX};
use crate::store::{self, KvStore};

/// Messages kept in a key-value store.
#[derive(Clone)]
pub struct Messages {
    store: Arc<dyn KvStore>,
    // Held across read-modify-write so status only moves forward.
    updates: Arc<Mutex<()>>,
}

impl Messages {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            updates: Arc::new(Mutex::new(())),
        }
    }

    /// Store a new message. Exactly one write, under a fresh key.
    pub async fn create(&self, form: ContactForm) -> Result<ContactMessage, Error> {
        let message = ContactMessage::new(Uuid::new_v4(), OffsetDateTime::now_utc(), form);
        self.save(&message).await.map_err(Error::Save)?;

        Ok(message)
    }

    /// All messages in the order they were received, optionally with one status only.
    ///
    /// Records that can't be read are skipped.
    pub async fn list(&self, status: Option<Status>) -> Result<Vec<ContactMessage>, Error> {
        let entries = self.store.list(KEY_PREFIX).await.map_err(Error::Load)?;

        Ok(entries
            .into_iter()
            .filter_map(
                |(key, value)| match serde_json::from_str::<ContactMessage>(&value) {
                    Ok(message) => Some(message),
                    Err(err) => {
                        warn!("skipping unreadable message \"{}\": {}", key, err);
                        None
                    }
                },
            )
            .filter(|message| status.is_none() || status == Some(message.status))
            .collect())
    }

    pub async fn get(&self, id: &Uuid) -> Result<ContactMessage, Error> {
        let value = self
            .store
            .get(&key(id))
            .await
            .map_err(Error::Load)?
            .ok_or(Error::NotFound)?;

        serde_json::from_str(&value).map_err(|err| Error::Load(err.into()))
    }

    /// Move a message forward in its review lifecycle. Setting the current status is a no-op.
    pub async fn set_status(&self, id: &Uuid, status: Status) -> Result<ContactMessage, Error> {
        let _guard = self.updates.lock().await;
        let mut message = self.get(id).await?;

        if message.status == status {
            return Ok(message);
        }

        if !message.status.can_transition_to(status) {
            return Err(Error::InvalidTransition {
                from: message.status,
                to: status,
            });
        }

        message.status = status;
        self.save(&message).await.map_err(Error::Save)?;

        Ok(message)
    }

    async fn save(&self, message: &ContactMessage) -> Result<(), store::Error> {
        let value = serde_json::to_string(message)?;
        self.store.put(&key(&message.id), value).await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::time::Duration;

    /// Memory store with slow reads, so concurrent updates overlap.
    struct SlowStore(MemoryStore);

    #[async_trait]
    impl KvStore for SlowStore {
        async fn put(&self, key: &str, value: String) -> Result<(), store::Error> {
            self.0.put(key, value).await
        }

        async fn get(&self, key: &str) -> Result<Option<String>, store::Error> {
            let value = self.0.get(key).await;
            tokio::time::sleep(Duration::from_millis(50)).await;
            value
        }

        async fn list(&self, prefix: &str) -> Result<Vec<(String, String)>, store::Error> {
            self.0.list(prefix).await
        }
    }

    fn form(name: &str) -> ContactForm {
        ContactForm {
            name: name.into(),
            email: "buyer@clinic.example".into(),
            message: "Please call back.".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let store = Arc::new(MemoryStore::new());
        let messages = Messages::new(store.clone());

        let first = messages.create(form("First")).await.unwrap();
        let second = messages.create(form("Second")).await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(store.len(), 2);

        let listed = messages.list(None).await.unwrap();
        assert_eq!(listed, vec![first.clone(), second]);

        assert_eq!(messages.get(&first.id).await.unwrap(), first);
        assert!(matches!(
            messages.get(&Uuid::new_v4()).await,
            Err(Error::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_unreadable_records_skipped() {
        let store = Arc::new(MemoryStore::new());
        let messages = Messages::new(store.clone());

        store.put("msg:garbage", "{not json".into()).await.unwrap();
        let message = messages.create(form("Valid")).await.unwrap();
        store.put("other:key", "{}".into()).await.unwrap();

        assert_eq!(messages.list(None).await.unwrap(), vec![message]);
    }

    #[tokio::test]
    async fn test_status_lifecycle() {
        let store = Arc::new(MemoryStore::new());
        let messages = Messages::new(store.clone());
        let message = messages.create(form("Lifecycle")).await.unwrap();

        let read = messages.set_status(&message.id, Status::Read).await.unwrap();
        assert_eq!(read.status, Status::Read);
        assert_eq!(read.timestamp, message.timestamp);

        // Same status again doesn't fail.
        messages.set_status(&message.id, Status::Read).await.unwrap();

        assert!(matches!(
            messages.set_status(&message.id, Status::New).await,
            Err(Error::InvalidTransition { .. })
        ));

        messages
            .set_status(&message.id, Status::Archived)
            .await
            .unwrap();

        assert!(messages.list(Some(Status::New)).await.unwrap().is_empty());
        assert_eq!(messages.list(Some(Status::Archived)).await.unwrap().len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_updates_stay_forward() {
        let messages = Messages::new(Arc::new(SlowStore(MemoryStore::new())));
        let id = messages.create(form("Racy")).await.unwrap().id;

        let archive = {
            let messages = messages.clone();
            tokio::spawn(async move { messages.set_status(&id, Status::Archived).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        let read = {
            let messages = messages.clone();
            tokio::spawn(async move { messages.set_status(&id, Status::Read).await })
        };

        assert_eq!(archive.await.unwrap().unwrap().status, Status::Archived);
        assert!(matches!(
            read.await.unwrap(),
            Err(Error::InvalidTransition {
                from: Status::Archived,
                to: Status::Read
            })
        ));
        assert_eq!(messages.get(&id).await.unwrap().status, Status::Archived);
    }
}
