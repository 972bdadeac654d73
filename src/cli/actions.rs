//! Flows around the record store that need the user's input: naming files and confirming
//! destructive operations. Shared by the interactive mode and the one-shot commands.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::NaiveDate;
use tracing::{info, warn};

use crate::{
    console::Prompter,
    export::{
        file::{read_records, save_records},
        report::{write_report, Report},
    },
    storage::{entities::Record, local::LocalStorage, record_store::RecordStore},
};

pub const NO_RECORDS: &str = "No records captured";
pub const FILE_NAME_QUESTION: &str = "How do you want to name the JSON file?";
pub const PROJECT_QUESTION: &str = "What is the project name?";
pub const IMPORT_CONFIRMATION: &str =
    "Are you sure you want to load a new file? This will erase the current data.";
pub const IMPORT_FAILED: &str = "Error importing the file. Make sure it is a valid JSON export.";
pub const CLEAR_CONFIRMATION: &str = "Are you sure you want to delete all records?";

/// Uses `given` when it has content, otherwise asks. `None` means the user gave up.
async fn resolve_name(
    prompter: &mut dyn Prompter,
    given: Option<String>,
    question: &str,
) -> Result<Option<String>> {
    let name = match given {
        Some(name) => Some(name),
        None => prompter.ask(question).await?,
    };
    Ok(name
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

pub async fn save(
    records: &[Record],
    prompter: &mut dyn Prompter,
    name: Option<String>,
    dir: &Path,
) -> Result<Option<PathBuf>> {
    if records.is_empty() {
        prompter.alert(NO_RECORDS);
        return Ok(None);
    }
    let Some(name) = resolve_name(prompter, name, FILE_NAME_QUESTION).await? else {
        return Ok(None);
    };
    Ok(Some(save_records(records, dir, &name).await?))
}

/// Replaces the store with the records of `path`. Returns whether the store changed; an unreadable
/// file or a declined confirmation leave it untouched.
pub async fn import<S: LocalStorage>(
    store: &mut RecordStore<S>,
    prompter: &mut dyn Prompter,
    path: &Path,
    assume_yes: bool,
) -> Result<bool> {
    let records = match read_records(path).await {
        Ok(records) => records,
        Err(e) => {
            warn!("Import of {path:?} failed: {e:?}");
            prompter.alert(&format!("{IMPORT_FAILED} ({e:#})"));
            return Ok(false);
        }
    };
    if !assume_yes && !prompter.confirm(IMPORT_CONFIRMATION).await? {
        info!("Import of {path:?} declined");
        return Ok(false);
    }
    store.replace_all(records).await?;
    Ok(true)
}

pub async fn clear<S: LocalStorage>(
    store: &mut RecordStore<S>,
    prompter: &mut dyn Prompter,
    assume_yes: bool,
) -> Result<bool> {
    if !assume_yes && !prompter.confirm(CLEAR_CONFIRMATION).await? {
        return Ok(false);
    }
    store.clear().await?;
    Ok(true)
}

pub async fn report(
    records: &[Record],
    prompter: &mut dyn Prompter,
    project: Option<String>,
    dir: &Path,
    today: NaiveDate,
) -> Result<Option<PathBuf>> {
    let Some(project) = resolve_name(prompter, project, PROJECT_QUESTION).await? else {
        return Ok(None);
    };
    let report = Report {
        project: &project,
        records,
        end_date: today,
    };
    Ok(Some(write_report(&report, dir).await?))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use chrono::{Duration, NaiveDate};
    use tempfile::{tempdir, TempDir};

    use crate::{
        console::MockPrompter,
        export::file::save_records,
        storage::{
            entities::Record,
            local::{FileStorage, STORAGE_FILE_NAME},
            record_store::RecordStore,
        },
        tracker::activity::Activity,
        utils::clock::test_clock::test_start,
    };

    use super::{clear, import, report, save, CLEAR_CONFIRMATION, IMPORT_CONFIRMATION, NO_RECORDS};

    async fn store(dir: &TempDir) -> Result<RecordStore<Arc<FileStorage>>> {
        Ok(RecordStore::new(Arc::new(
            FileStorage::open(dir.path().join(STORAGE_FILE_NAME)).await?,
        )))
    }

    fn record(activity: Activity) -> Record {
        Record::finish(
            test_start(),
            test_start() + Duration::seconds(10),
            10,
            0,
            activity,
            String::new(),
        )
    }

    #[tokio::test]
    async fn test_save_without_records_alerts() -> Result<()> {
        let dir = tempdir()?;
        let mut prompter = MockPrompter::new();
        prompter
            .expect_alert()
            .withf(|message| message.to_string() == NO_RECORDS)
            .times(1)
            .return_const(());
        prompter.expect_ask().never();
        assert_eq!(save(&[], &mut prompter, None, dir.path()).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_save_asks_for_name() -> Result<()> {
        let dir = tempdir()?;
        let mut prompter = MockPrompter::new();
        prompter
            .expect_ask()
            .times(1)
            .returning(|_| Ok(Some(" sprint ".into())));
        let path = save(&[record(Activity::Code)], &mut prompter, None, dir.path()).await?;
        assert_eq!(path, Some(dir.path().join("sprint.json")));

        let mut prompter = MockPrompter::new();
        prompter
            .expect_ask()
            .times(1)
            .returning(|_| Ok(Some(String::new())));
        let path = save(&[record(Activity::Code)], &mut prompter, None, dir.path()).await?;
        assert_eq!(path, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_import_replaces_after_confirmation() -> Result<()> {
        let dir = tempdir()?;
        let exported = vec![record(Activity::Release), record(Activity::Meeting)];
        let path = save_records(&exported, dir.path(), "export").await?;

        let mut store = store(&dir).await?;
        store.append(record(Activity::Plan)).await?;

        let mut prompter = MockPrompter::new();
        prompter
            .expect_confirm()
            .withf(|question| question.to_string() == IMPORT_CONFIRMATION)
            .times(1)
            .returning(|_| Ok(false));
        assert!(!import(&mut store, &mut prompter, &path, false).await?);
        assert_eq!(store.records(), [record(Activity::Plan)]);

        let mut prompter = MockPrompter::new();
        prompter.expect_confirm().times(1).returning(|_| Ok(true));
        assert!(import(&mut store, &mut prompter, &path, false).await?);
        assert_eq!(store.records(), exported);
        Ok(())
    }

    #[tokio::test]
    async fn test_import_of_invalid_file_keeps_store() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "[{\"date\": 3}]")?;

        let mut store = store(&dir).await?;
        store.append(record(Activity::Plan)).await?;

        let mut prompter = MockPrompter::new();
        prompter.expect_alert().times(1).return_const(());
        prompter.expect_confirm().never();
        assert!(!import(&mut store, &mut prompter, &path, true).await?);
        assert_eq!(store.records().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_needs_confirmation() -> Result<()> {
        let dir = tempdir()?;
        let mut store = store(&dir).await?;
        store.append(record(Activity::Test)).await?;

        let mut prompter = MockPrompter::new();
        prompter
            .expect_confirm()
            .withf(|question| question.to_string() == CLEAR_CONFIRMATION)
            .times(1)
            .returning(|_| Ok(false));
        assert!(!clear(&mut store, &mut prompter, false).await?);
        assert!(!store.is_empty());

        let mut prompter = MockPrompter::new();
        prompter.expect_confirm().never();
        assert!(clear(&mut store, &mut prompter, true).await?);
        assert!(store.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_report_uses_given_project() -> Result<()> {
        let dir = tempdir()?;
        let mut prompter = MockPrompter::new();
        prompter.expect_ask().never();
        let path = report(
            &[record(Activity::Analyze)],
            &mut prompter,
            Some("atlas".into()),
            dir.path(),
            NaiveDate::from_ymd_opt(2018, 7, 5).unwrap(),
        )
        .await?;
        assert_eq!(path, Some(dir.path().join("atlas.txt")));
        Ok(())
    }
}
