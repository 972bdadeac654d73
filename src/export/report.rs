use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::info;

use crate::storage::entities::Record;

use super::{
    summary::summarize,
    table::{records_table, totals_table},
};

pub const REPORT_EXTENSION: &str = "txt";

const NOT_AVAILABLE: &str = "N/A";

/// Read-only overview of a project: its time span, every record and per-activity totals.
pub struct Report<'a> {
    pub project: &'a str,
    pub records: &'a [Record],
    /// Day the report was produced.
    pub end_date: NaiveDate,
}

impl Report<'_> {
    /// Records are kept in completion order, so the first one marks the start.
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|v| v.date)
    }
}

impl Display for Report<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let start_date = self
            .start_date()
            .map(|v| v.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.into());
        writeln!(f, "Project: {}", self.project)?;
        writeln!(f, "Start date: {start_date}")?;
        writeln!(f, "End date: {}", self.end_date)?;
        writeln!(f)?;
        writeln!(f, "Records")?;
        for line in records_table(self.records) {
            writeln!(f, "{line}")?;
        }
        writeln!(f)?;
        writeln!(f, "Time per activity")?;
        for line in totals_table(&summarize(self.records)) {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Writes the report into `<dir>/<project>.txt`.
pub async fn write_report(report: &Report<'_>, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(format!("{}.{REPORT_EXTENSION}", report.project));
    tokio::fs::write(&path, report.to_string())
        .await
        .with_context(|| format!("Couldn't write {path:?}"))?;
    info!("Wrote report for {} into {path:?}", report.project);
    Ok(path)
}
