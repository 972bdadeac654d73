use std::{
    collections::BTreeMap,
    future::Future,
    io::{ErrorKind, SeekFrom},
    ops::Deref,
    path::{Path, PathBuf},
};

use anyhow::Result;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
    sync::Mutex,
};
use tracing::{debug, warn};

pub const STORAGE_FILE_NAME: &str = "storage.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageChange {
    Set(&'static str, String),
    Remove(&'static str),
}

/// String key/value storage that outlives the process. Values are opaque to the storage; callers
/// decide how to encode them.
pub trait LocalStorage {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>>;

    /// Applies all changes and persists them with a single write.
    fn apply(&self, changes: Vec<StorageChange>) -> impl Future<Output = Result<()>>;

    fn set(&self, key: &'static str, value: String) -> impl Future<Output = Result<()>> {
        self.apply(vec![StorageChange::Set(key, value)])
    }

    fn remove(&self, key: &'static str) -> impl Future<Output = Result<()>> {
        self.apply(vec![StorageChange::Remove(key)])
    }
}

impl<T: Deref> LocalStorage for T
where
    T::Target: LocalStorage,
{
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> {
        self.deref().get(key)
    }

    fn apply(&self, changes: Vec<StorageChange>) -> impl Future<Output = Result<()>> {
        self.deref().apply(changes)
    }
}

/// The main realization of [LocalStorage]. Keeps every entry of a single JSON object file cached in
/// memory and rewrites the file on each change.
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    pub async fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let entries = Self::read_entries(&path).await?;
        debug!("Opened storage {path:?} with {} entries", entries.len());
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(path: &Path) -> Result<BTreeMap<String, String>> {
        async fn extract(path: &Path) -> std::result::Result<String, std::io::Error> {
            let mut file = File::open(path).await?;
            file.lock_shared()?;
            let mut content = String::new();
            let result = file.read_to_string(&mut content).await;
            file.unlock_async().await?;
            result.map(|_| content)
        }

        let content = match extract(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => Err(e)?,
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                // Might happen after a write got cut off. Starting over is better than refusing to
                // start at all.
                warn!("Storage {path:?} is corrupted, starting empty: {e}");
                Ok(BTreeMap::new())
            }
        }
    }

    async fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let buffer = serde_json::to_vec_pretty(entries)?;

        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .await?;

        // Semi-safe acquire-release for a file
        file.lock_exclusive()?;
        let result = async {
            file.set_len(0).await?;
            file.seek(SeekFrom::Start(0)).await?;
            file.write_all(&buffer).await?;
            file.flush().await?;
            file.sync_data().await
        }
        .await;
        file.unlock_async().await?;
        Ok(result?)
    }
}

impl LocalStorage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn apply(&self, changes: Vec<StorageChange>) -> Result<()> {
        let mut entries = self.entries.lock().await;
        for change in changes {
            match change {
                StorageChange::Set(key, value) => {
                    entries.insert(key.to_string(), value);
                }
                StorageChange::Remove(key) => {
                    entries.remove(key);
                }
            }
        }
        self.write_entries(&entries).await
    }
}
