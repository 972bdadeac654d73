//! Read-only views of the record list: JSON files that can be imported back, per-activity totals
//! and plain text reports.

pub mod file;
pub mod report;
pub mod summary;
pub mod table;
