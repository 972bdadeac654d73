use std::fmt::Display;

use chrono::{DateTime, Local};

use super::activity::Activity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    AwaitingActivitySelection,
    Running,
    Paused,
}

impl Phase {
    /// A session is open while time is being accounted, active or not.
    pub fn is_tracking(&self) -> bool {
        matches!(self, Phase::Running | Phase::Paused)
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::AwaitingActivitySelection => write!(f, "awaiting activity selection"),
            Phase::Running => write!(f, "running"),
            Phase::Paused => write!(f, "paused"),
        }
    }
}

/// The single in-flight session. Counters only grow while a session is open and go back to zero
/// once it is stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionState {
    pub phase: Phase,
    pub activity: Option<Activity>,
    pub start_time: Option<DateTime<Local>>,
    pub active_seconds: u64,
    pub inactive_seconds: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tracking(&self) -> bool {
        self.phase.is_tracking()
    }

    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Running
    }
}
