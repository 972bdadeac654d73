//! Session tracking. The [machine] decides how a session reacts to user actions and timer ticks,
//! the [driver] carries the decisions out.

use std::time::Duration;

use machine::MachineConfig;

pub mod activity;
pub mod comment;
pub mod driver;
pub mod machine;
pub mod state;
pub mod ticker;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
    pub tick_interval: Duration,
    pub machine: MachineConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            machine: MachineConfig::default(),
        }
    }
}
