use chrono::{DateTime, Duration};

/// Clock read-outs are shown as 24 hour `HH:MM:SS`.
pub const TIME_OF_DAY_FORMAT: &str = "%H:%M:%S";

pub fn format_time_of_day<Tz: chrono::TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format(TIME_OF_DAY_FORMAT).to_string()
}

pub fn format_duration(v: Duration) -> String {
    if v.num_hours() > 0 {
        format!(
            "{}h{}m{}s",
            v.num_hours(),
            v.num_minutes() % 60,
            v.num_seconds() % 60
        )
    } else if v.num_minutes() > 0 {
        format!("{}m{}s", v.num_minutes() % 60, v.num_seconds() % 60)
    } else {
        format!("{}s", v.num_seconds() % 60)
    }
}

pub fn format_seconds(seconds: u64) -> String {
    format_duration(Duration::seconds(seconds as i64))
}
