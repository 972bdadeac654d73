//! Terminal time tracker. Sessions of an activity are started, paused and stopped with a comment;
//! finished sessions become records that can be listed, summarized per activity, saved into JSON
//! or written into a project report. Everything is kept in a single local state directory.
//!

pub mod cli;
pub mod console;
pub mod export;
pub mod storage;
pub mod tracker;
pub mod utils;
