use std::collections::HashMap;

use crate::{
    storage::entities::Record,
    tracker::activity::Activity,
    utils::percentage::{seconds_percentage, Percentage},
};

/// Accumulated time of one activity over a set of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityTotals {
    pub activity: Activity,
    pub active_seconds: u64,
    pub inactive_seconds: u64,
}

impl ActivityTotals {
    fn new(activity: Activity) -> Self {
        Self {
            activity,
            active_seconds: 0,
            inactive_seconds: 0,
        }
    }

    pub fn total_seconds(&self) -> u64 {
        self.active_seconds.saturating_add(self.inactive_seconds)
    }

    /// Share of tracked time that was active. `None` for activities that were never tracked.
    pub fn active_share(&self) -> Option<Percentage> {
        seconds_percentage(self.active_seconds, self.total_seconds())
    }
}

/// Returns totals for every activity, in menu order, including the ones without records.
pub fn summarize(records: &[Record]) -> Vec<ActivityTotals> {
    let mut map = HashMap::<Activity, ActivityTotals>::new();

    for record in records {
        let totals = map
            .entry(record.activity)
            .or_insert_with(|| ActivityTotals::new(record.activity));
        totals.active_seconds = totals.active_seconds.saturating_add(record.active_seconds);
        totals.inactive_seconds = totals.inactive_seconds.saturating_add(record.inactive_seconds);
    }

    Activity::ALL
        .into_iter()
        .map(|activity| {
            map.remove(&activity)
                .unwrap_or_else(|| ActivityTotals::new(activity))
        })
        .collect()
}
