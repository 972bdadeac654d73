//! Layout of the in-flight session inside [LocalStorage]. Every value is a string:
//!
//! | key            | value                          |
//! |----------------|--------------------------------|
//! | `activeTime`   | active seconds                 |
//! | `inactiveTime` | inactive seconds               |
//! | `startTime`    | RFC 3339 start of the session  |
//! | `activity`     | activity label                 |
//! | `isTracking`   | `true` while a session is open |
//! | `isPaused`     | `true` while paused            |
//! | `isActive`     | `true` while running           |
//!
//! Absence of the keys means there is no session to resume.

use anyhow::Result;
use chrono::{DateTime, Local};
use tracing::{debug, warn};

use crate::tracker::{
    activity::Activity,
    state::{Phase, SessionState},
};

use super::local::{LocalStorage, StorageChange};

pub const ACTIVE_TIME_KEY: &str = "activeTime";
pub const INACTIVE_TIME_KEY: &str = "inactiveTime";
pub const START_TIME_KEY: &str = "startTime";
pub const ACTIVITY_KEY: &str = "activity";
pub const IS_TRACKING_KEY: &str = "isTracking";
pub const IS_PAUSED_KEY: &str = "isPaused";
pub const IS_ACTIVE_KEY: &str = "isActive";

const SESSION_KEYS: [&str; 7] = [
    ACTIVE_TIME_KEY,
    INACTIVE_TIME_KEY,
    START_TIME_KEY,
    ACTIVITY_KEY,
    IS_TRACKING_KEY,
    IS_PAUSED_KEY,
    IS_ACTIVE_KEY,
];

fn flag(value: bool) -> String {
    value.to_string()
}

/// Writes the session so it can be resumed after a restart. Sessions that aren't tracking time
/// leave nothing behind.
pub async fn save_session(storage: &impl LocalStorage, state: &SessionState) -> Result<()> {
    let changes = match (state.is_tracking(), state.start_time) {
        (true, Some(start_time)) => vec![
            StorageChange::Set(ACTIVE_TIME_KEY, state.active_seconds.to_string()),
            StorageChange::Set(INACTIVE_TIME_KEY, state.inactive_seconds.to_string()),
            StorageChange::Set(START_TIME_KEY, start_time.to_rfc3339()),
            StorageChange::Set(
                ACTIVITY_KEY,
                state.activity.map(|v| v.label().to_string()).unwrap_or_default(),
            ),
            StorageChange::Set(IS_TRACKING_KEY, flag(true)),
            StorageChange::Set(IS_PAUSED_KEY, flag(state.is_paused())),
            StorageChange::Set(IS_ACTIVE_KEY, flag(state.is_active())),
        ],
        _ => clear_changes(),
    };
    storage.apply(changes).await
}

fn clear_changes() -> Vec<StorageChange> {
    SESSION_KEYS.into_iter().map(StorageChange::Remove).collect()
}

/// Reads back a session written by [save_session]. Returns `None` when there is nothing to resume
/// or when the stored values can't describe an open session.
pub async fn load_session(storage: &impl LocalStorage) -> Result<Option<SessionState>> {
    let is_tracking = storage.get(IS_TRACKING_KEY).await?.as_deref() == Some("true");
    let start_time = storage.get(START_TIME_KEY).await?.unwrap_or_default();
    if !is_tracking || start_time.is_empty() {
        return Ok(None);
    }

    let start_time = match DateTime::parse_from_rfc3339(&start_time) {
        Ok(v) => v.with_timezone(&Local),
        Err(e) => {
            warn!("Stored session start {start_time:?} is unreadable: {e}");
            return Ok(None);
        }
    };

    let activity = match storage.get(ACTIVITY_KEY).await?.map(|v| v.parse::<Activity>()) {
        Some(Ok(activity)) => activity,
        Some(Err(e)) => {
            warn!("Stored session activity is unreadable: {e}");
            return Ok(None);
        }
        None => {
            warn!("Stored session has no activity");
            return Ok(None);
        }
    };

    let phase = if storage.get(IS_PAUSED_KEY).await?.as_deref() == Some("true") {
        Phase::Paused
    } else {
        Phase::Running
    };

    let state = SessionState {
        phase,
        activity: Some(activity),
        start_time: Some(start_time),
        active_seconds: read_counter(storage, ACTIVE_TIME_KEY).await?,
        inactive_seconds: read_counter(storage, INACTIVE_TIME_KEY).await?,
    };
    debug!("Loaded session {state:?}");
    Ok(Some(state))
}

async fn read_counter(storage: &impl LocalStorage, key: &str) -> Result<u64> {
    Ok(match storage.get(key).await? {
        Some(v) => v.parse().unwrap_or_else(|e| {
            warn!("Counter {key} has unreadable value {v:?}: {e}");
            0
        }),
        None => 0,
    })
}
