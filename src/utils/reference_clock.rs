use std::fmt::Display;

use anyhow::{anyhow, Result};
use chrono::{DateTime, FixedOffset, Utc};
use tracing::warn;

use super::{clock::Clock, time::format_time_of_day};

pub const LOADING_PLACEHOLDER: &str = "Loading...";

/// Source of the secondary time shown next to the system time.
pub trait ReferenceClock: Send + Sync {
    fn label(&self) -> &str;

    fn reference_time(&self, now: DateTime<Utc>) -> Result<DateTime<FixedOffset>>;
}

/// Reference time of a zone without daylight saving.
pub struct FixedZoneClock {
    label: String,
    offset: FixedOffset,
}

impl FixedZoneClock {
    pub const MEXICO_CITY_OFFSET_HOURS: i32 = -6;

    pub fn new(label: impl Into<String>, offset_hours: i32) -> Result<Self> {
        let offset = FixedOffset::east_opt(offset_hours * 3600)
            .ok_or_else(|| anyhow!("UTC offset of {offset_hours} hours is out of range"))?;
        Ok(Self {
            label: label.into(),
            offset,
        })
    }
}

impl ReferenceClock for FixedZoneClock {
    fn label(&self) -> &str {
        &self.label
    }

    fn reference_time(&self, now: DateTime<Utc>) -> Result<DateTime<FixedOffset>> {
        Ok(now.with_timezone(&self.offset))
    }
}

/// Both clock read-outs formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockReadout {
    pub system: String,
    pub reference_label: String,
    pub reference: String,
}

impl ClockReadout {
    /// A failing reference clock doesn't fail the read-out, it shows [LOADING_PLACEHOLDER] until
    /// the next read.
    pub fn read(clock: &dyn Clock, reference: &dyn ReferenceClock) -> Self {
        let now = clock.now();
        let reference_time = match reference.reference_time(now.with_timezone(&Utc)) {
            Ok(time) => format_time_of_day(&time),
            Err(e) => {
                warn!("Couldn't read {} time: {e:?}", reference.label());
                LOADING_PLACEHOLDER.to_string()
            }
        };
        Self {
            system: format_time_of_day(&now),
            reference_label: reference.label().to_string(),
            reference: reference_time,
        }
    }
}

impl Display for ClockReadout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} time: {}", self.reference_label, self.reference)?;
        write!(f, "System time: {}", self.system)
    }
}
