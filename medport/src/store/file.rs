//! Durable store backed by an append-only log.
//!
//! Every write appends one JSON line, `{"key": "...", "value": "..."}`, and flushes it.
//! Opening the store replays the log: the last write for a key wins and keys keep the
//! position of their first write. Lines that don't parse, e.g. a write cut short by a crash,
//! are skipped.
//!
//! A write that fails halfway is cut back off the log, so it can't swallow the next one.
use std::borrow::Cow;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{Entries, Error, KvStore, MemoryStore};

#[derive(Serialize, Deserialize)]
struct Line<'a> {
    key: Cow<'a, str>,
    value: Cow<'a, str>,
}

struct Inner {
    file: File,
    entries: Entries,
    // Length of the log up to the last complete line.
    len: u64,
    // A failed write left bytes we couldn't cut off.
    dirty: bool,
}

impl Inner {
    async fn append(&mut self, line: &[u8]) -> Result<(), Error> {
        if self.dirty {
            self.write(b"\n").await?;
            self.len = self.file.metadata().await?.len();
            self.dirty = false;
        }

        match self.write(line).await {
            Ok(()) => {
                self.len += line.len() as u64;
                Ok(())
            }
            Err(err) => {
                self.discard_partial().await;
                Err(err)
            }
        }
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.file.write_all(bytes).await?;
        self.file.flush().await?;
        Ok(())
    }

    /// Drop whatever a failed write left after the last complete line.
    async fn discard_partial(&mut self) {
        if let Err(err) = self.file.set_len(self.len).await {
            warn!("can't truncate store log after failed write: {}", err);
            self.dirty = true;
        }
    }
}

pub struct FileStore {
    path: PathBuf,
    inner: Mutex<Inner>,
}

impl FileStore {
    /// Open the log at `path`, creating it if it doesn't exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref().to_owned();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(err) => return Err(err.into()),
        };

        let entries = Self::replay(&path, &contents);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        // Terminate a partial last line so the next write starts clean.
        if !contents.is_empty() && !contents.ends_with('\n') {
            file.write_all(b"\n").await?;
            file.flush().await?;
        }

        let len = file.metadata().await?.len();

        debug!(
            "opened store \"{}\" with {} keys",
            path.display(),
            entries.len()
        );

        Ok(Self {
            path,
            inner: Mutex::new(Inner {
                file,
                entries,
                len,
                dirty: false,
            }),
        })
    }

    /// Read the log at `path` into memory without opening it for writing.
    ///
    /// Safe to use while a server is appending to the same log. A missing log reads as empty.
    pub async fn snapshot(path: impl AsRef<Path>) -> Result<MemoryStore, Error> {
        let path = path.as_ref();

        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(err) => return Err(err.into()),
        };

        Ok(MemoryStore::from_entries(Self::replay(path, &contents)))
    }

    fn replay(path: &Path, contents: &str) -> Entries {
        let mut entries = Entries::default();

        for (number, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<Line>(line) {
                Ok(line) => entries.put(&line.key, line.value.into_owned()),
                Err(err) => warn!(
                    "skipping line {} of \"{}\": {}",
                    number + 1,
                    path.display(),
                    err
                ),
            }
        }

        entries
    }

    /// Location of the log on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of keys stored.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl KvStore for FileStore {
    async fn put(&self, key: &str, value: String) -> Result<(), Error> {
        let mut line = serde_json::to_vec(&Line {
            key: Cow::Borrowed(key),
            value: Cow::Borrowed(&value),
        })?;
        line.push(b'\n');

        let mut inner = self.inner.lock().await;
        inner.append(&line).await?;
        inner.entries.put(key, value);

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.inner.lock().await.entries.get(key).cloned())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<(String, String)>, Error> {
        Ok(self.inner.lock().await.entries.list(prefix))
    }
}
