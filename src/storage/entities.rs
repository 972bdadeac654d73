use chrono::{DateTime, Local, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::tracker::activity::Activity;

/// A finished session. Records are never modified after creation, only appended, replaced in bulk
/// or cleared. Field names match the JSON files the tracker exports.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(with = "date_ser")]
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(rename = "inactiveTime", alias = "inactiveTimeSeconds")]
    pub inactive_seconds: u64,
    #[serde(rename = "activeTime", alias = "activeTimeSeconds")]
    pub active_seconds: u64,
    pub activity: Activity,
    #[serde(default)]
    pub comment: String,
}

impl Record {
    /// Builds a record for a session that started at `start` and ended at `end`. Times are kept
    /// with second precision.
    pub fn finish(
        start: DateTime<Local>,
        end: DateTime<Local>,
        active_seconds: u64,
        inactive_seconds: u64,
        activity: Activity,
        comment: String,
    ) -> Self {
        Self {
            date: end.date_naive(),
            start_time: whole_seconds(start.time()),
            end_time: whole_seconds(end.time()),
            inactive_seconds,
            active_seconds,
            activity,
            comment,
        }
    }
}

fn whole_seconds(time: NaiveTime) -> NaiveTime {
    time.with_nanosecond(0).unwrap_or(time)
}

mod date_ser {
    use chrono::NaiveDate;
    use serde::{self, de::Error, Deserialize, Deserializer, Serializer};

    const WRITE_FORMAT: &str = "%Y-%m-%d";

    /// Files exported by older versions used locale dependent dates. Slash dates are read day
    /// first, as es-MX writes them; month first only applies when that can't be a date.
    const READ_FORMATS: [&str; 4] = [WRITE_FORMAT, "%d/%m/%Y", "%m/%d/%Y", "%d.%m.%Y"];

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(WRITE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        READ_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(&s, format).ok())
            .ok_or_else(|| D::Error::custom(format!("unrecognized date {s:?}")))
    }
}
