use anyhow::Result;
use tracing::{debug, info, warn};

use super::{entities::Record, local::LocalStorage};

pub const RECORDS_KEY: &str = "records";

/// Finished sessions in completion order. Every mutation is written through to [LocalStorage]
/// right away.
pub struct RecordStore<S: LocalStorage> {
    storage: S,
    records: Vec<Record>,
    restored: bool,
}

impl<S: LocalStorage> RecordStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            records: vec![],
            restored: false,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Loads previously checkpointed records. Only the first call per store does anything; it
    /// returns the amount of recovered records when a checkpoint existed so the user can be told.
    pub async fn restore(&mut self) -> Result<Option<usize>> {
        if self.restored {
            return Ok(None);
        }
        self.restored = true;

        let Some(raw) = self.storage.get(RECORDS_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<Vec<Record>>(&raw) {
            Ok(records) => {
                info!("Recovered {} records", records.len());
                self.records = records;
                Ok(Some(self.records.len()))
            }
            Err(e) => {
                warn!("Checkpointed records are unreadable, ignoring them: {e}");
                Ok(None)
            }
        }
    }

    pub async fn append(&mut self, record: Record) -> Result<()> {
        debug!("Appending record {record:?}");
        self.records.push(record);
        self.checkpoint().await
    }

    /// Swaps every record for `records`. Destructive, callers confirm with the user first.
    pub async fn replace_all(&mut self, records: Vec<Record>) -> Result<()> {
        info!(
            "Replacing {} records with {}",
            self.records.len(),
            records.len()
        );
        self.records = records;
        self.checkpoint().await
    }

    /// Drops every record together with the checkpoint. Destructive, callers confirm with the user
    /// first.
    pub async fn clear(&mut self) -> Result<()> {
        info!("Clearing {} records", self.records.len());
        self.records.clear();
        self.storage.remove(RECORDS_KEY).await
    }

    pub async fn checkpoint(&self) -> Result<()> {
        let raw = serde_json::to_string(&self.records)?;
        self.storage.set(RECORDS_KEY, raw).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use chrono::Duration;
    use tempfile::{tempdir, TempDir};

    use crate::{
        storage::{
            entities::Record,
            local::{FileStorage, LocalStorage, STORAGE_FILE_NAME},
        },
        tracker::activity::Activity,
        utils::clock::test_clock::test_start,
    };

    use super::{RecordStore, RECORDS_KEY};

    async fn storage(dir: &TempDir) -> Result<Arc<FileStorage>> {
        Ok(Arc::new(
            FileStorage::open(dir.path().join(STORAGE_FILE_NAME)).await?,
        ))
    }

    fn record(offset: i64, activity: Activity) -> Record {
        let start = test_start() + Duration::minutes(offset);
        Record::finish(
            start,
            start + Duration::seconds(90),
            80,
            10,
            activity,
            String::new(),
        )
    }

    #[tokio::test]
    async fn test_append_persists_in_order() -> Result<()> {
        let dir = tempdir()?;
        let mut store = RecordStore::new(storage(&dir).await?);
        let records = [
            record(0, Activity::Plan),
            record(5, Activity::Code),
            record(10, Activity::Test),
        ];
        for record in records.clone() {
            store.append(record).await?;
        }
        assert_eq!(store.records(), records);

        let mut reopened = RecordStore::new(storage(&dir).await?);
        assert_eq!(reopened.restore().await?, Some(3));
        assert_eq!(reopened.records(), records);
        Ok(())
    }

    #[tokio::test]
    async fn test_restore_happens_once() -> Result<()> {
        let dir = tempdir()?;
        let storage = storage(&dir).await?;
        let mut store = RecordStore::new(storage.clone());
        assert_eq!(store.restore().await?, None);

        RecordStore::new(storage.clone())
            .replace_all(vec![record(0, Activity::Meeting)])
            .await?;

        // The first restore already happened, so the new checkpoint isn't picked up.
        assert_eq!(store.restore().await?, None);
        assert!(store.is_empty());

        let mut fresh = RecordStore::new(storage);
        assert_eq!(fresh.restore().await?, Some(1));
        assert_eq!(fresh.restore().await?, None);
        assert_eq!(fresh.records().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_checkpoint_still_counts_as_recovery() -> Result<()> {
        let dir = tempdir()?;
        let storage = storage(&dir).await?;
        storage.set(RECORDS_KEY, "[]".into()).await?;
        let mut store = RecordStore::new(storage);
        assert_eq!(store.restore().await?, Some(0));
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_removes_checkpoint() -> Result<()> {
        let dir = tempdir()?;
        let storage = storage(&dir).await?;
        let mut store = RecordStore::new(storage.clone());
        store.append(record(0, Activity::Diagram)).await?;
        assert!(storage.get(RECORDS_KEY).await?.is_some());

        store.clear().await?;
        assert!(store.is_empty());
        assert_eq!(storage.get(RECORDS_KEY).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_replace_all_overwrites() -> Result<()> {
        let dir = tempdir()?;
        let mut store = RecordStore::new(storage(&dir).await?);
        store.append(record(0, Activity::Diagram)).await?;
        let imported = vec![record(1, Activity::Release), record(2, Activity::Analyze)];
        store.replace_all(imported.clone()).await?;
        assert_eq!(store.records(), imported);

        let mut reopened = RecordStore::new(storage(&dir).await?);
        reopened.restore().await?;
        assert_eq!(reopened.records(), imported);
        Ok(())
    }
}
