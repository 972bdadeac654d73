use crate::{storage::entities::Record, utils::time::TIME_OF_DAY_FORMAT};

use super::summary::ActivityTotals;

pub const RECORD_HEADERS: [&str; 7] = [
    "Date",
    "Start",
    "End",
    "Interrupted",
    "Active",
    "Activity",
    "Comment",
];

pub const TOTALS_HEADERS: [&str; 4] = ["Activity", "Active", "Interrupted", "Active share"];

fn record_row(record: &Record) -> Vec<String> {
    vec![
        record.date.format("%Y-%m-%d").to_string(),
        record.start_time.format(TIME_OF_DAY_FORMAT).to_string(),
        record.end_time.format(TIME_OF_DAY_FORMAT).to_string(),
        format!("{}s", record.inactive_seconds),
        format!("{}s", record.active_seconds),
        record.activity.to_string(),
        record.comment.clone(),
    ]
}

fn totals_row(totals: &ActivityTotals) -> Vec<String> {
    vec![
        totals.activity.to_string(),
        format!("{}s", totals.active_seconds),
        format!("{}s", totals.inactive_seconds),
        totals
            .active_share()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".into()),
    ]
}

/// Lays out rows into left aligned columns. The first returned line is the header.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths = headers
        .iter()
        .map(|v| v.chars().count())
        .collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}", width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![line(headers.to_vec())];
    lines.extend(rows.iter().map(|row| line(row.iter().map(String::as_str).collect())));
    lines
}

pub fn records_table(records: &[Record]) -> Vec<String> {
    let rows = records.iter().map(record_row).collect::<Vec<_>>();
    render_table(&RECORD_HEADERS, &rows)
}

pub fn totals_table(totals: &[ActivityTotals]) -> Vec<String> {
    let rows = totals.iter().map(totals_row).collect::<Vec<_>>();
    render_table(&TOTALS_HEADERS, &rows)
}
