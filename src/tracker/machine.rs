//! The session state machine. [transition] is pure: it never touches timers or storage, it only
//! describes what has to happen through [Effect]s which the [driver](super::driver) executes.

use std::fmt::Display;

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::storage::entities::Record;

use super::{
    activity::Activity,
    comment::Comment,
    state::{Phase, SessionState},
};

/// Active seconds after which a running session raises an alert.
pub const DEFAULT_ALERT_THRESHOLD: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start,
    SelectActivity {
        activity: Activity,
        at: DateTime<Local>,
    },
    /// Leaves activity selection without opening a session.
    Cancel,
    /// Toggles between running and paused.
    Pause,
    Stop {
        comment: Comment,
        at: DateTime<Local>,
    },
    Tick,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Start => "start",
            Event::SelectActivity { .. } => "select",
            Event::Cancel => "cancel",
            Event::Pause => "pause",
            Event::Stop { .. } => "stop",
            Event::Tick => "tick",
        }
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Cancels the ticker of the previous phase. Always precedes [Effect::StartTicker].
    CancelTicker,
    StartTicker,
    EmitRecord(Record),
    Alert { active_seconds: u64 },
    Checkpoint,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Can't {event} while {phase}")]
    Invalid { phase: Phase, event: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: SessionState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn new(state: SessionState, effects: Vec<Effect>) -> Self {
        Self { state, effects }
    }

    fn unchanged(state: &SessionState) -> Self {
        Self::new(*state, vec![])
    }
}

/// Switches behavior that differs between tracker setups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineConfig {
    /// The alert fires when the active counter equals this value, which happens at most once per
    /// session.
    pub alert_threshold: Option<u64>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            alert_threshold: Some(DEFAULT_ALERT_THRESHOLD),
        }
    }
}

pub fn transition(
    state: &SessionState,
    event: Event,
    config: &MachineConfig,
) -> Result<Transition, TransitionError> {
    let invalid = |event: &Event| TransitionError::Invalid {
        phase: state.phase,
        event: event.name(),
    };

    match (state.phase, event) {
        (Phase::Idle, Event::Start) => Ok(Transition::new(
            SessionState {
                phase: Phase::AwaitingActivitySelection,
                ..*state
            },
            vec![Effect::Checkpoint],
        )),
        (Phase::AwaitingActivitySelection, Event::SelectActivity { activity, at }) => {
            Ok(Transition::new(
                SessionState {
                    phase: Phase::Running,
                    activity: Some(activity),
                    start_time: Some(at),
                    ..*state
                },
                vec![Effect::CancelTicker, Effect::StartTicker, Effect::Checkpoint],
            ))
        }
        (Phase::AwaitingActivitySelection, Event::Cancel) => Ok(Transition::new(
            SessionState {
                phase: Phase::Idle,
                ..*state
            },
            vec![Effect::Checkpoint],
        )),
        (Phase::Running, Event::Pause) | (Phase::Paused, Event::Pause) => {
            let phase = if state.phase == Phase::Running {
                Phase::Paused
            } else {
                Phase::Running
            };
            Ok(Transition::new(
                SessionState { phase, ..*state },
                vec![Effect::CancelTicker, Effect::StartTicker, Effect::Checkpoint],
            ))
        }
        (Phase::Running | Phase::Paused, Event::Stop { comment, at }) => {
            // An open session always has both, but a damaged checkpoint might not.
            let (Some(start), Some(activity)) = (state.start_time, state.activity) else {
                return Err(invalid(&Event::Stop { comment, at }));
            };
            let record = Record::finish(
                start,
                at,
                state.active_seconds,
                state.inactive_seconds,
                activity,
                comment.into_inner(),
            );
            Ok(Transition::new(
                SessionState::new(),
                vec![
                    Effect::CancelTicker,
                    Effect::EmitRecord(record),
                    Effect::Checkpoint,
                ],
            ))
        }
        (Phase::Running, Event::Tick) => {
            let active_seconds = state.active_seconds.saturating_add(1);
            let mut effects = vec![];
            if config.alert_threshold == Some(active_seconds) {
                effects.push(Effect::Alert { active_seconds });
            }
            effects.push(Effect::Checkpoint);
            Ok(Transition::new(
                SessionState {
                    active_seconds,
                    ..*state
                },
                effects,
            ))
        }
        (Phase::Paused, Event::Tick) => Ok(Transition::new(
            SessionState {
                inactive_seconds: state.inactive_seconds.saturating_add(1),
                ..*state
            },
            vec![Effect::Checkpoint],
        )),
        (Phase::Idle | Phase::AwaitingActivitySelection, Event::Tick) => {
            Ok(Transition::unchanged(state))
        }
        (_, event) => Err(invalid(&event)),
    }
}
