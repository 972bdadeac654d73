//! Everything that outlives the process goes through [local::LocalStorage], a string key/value
//! file in the application directory:
//!  - [record_store::RecordStore] keeps finished records under the `records` key.
//!  - [checkpoint] keeps the in-flight session so it can be resumed after a restart.

pub mod checkpoint;
pub mod entities;
pub mod local;
pub mod record_store;
