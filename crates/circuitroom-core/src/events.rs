use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workout::{Phase, WorkoutConfig};

/// Every state change of the workout engine produces an Event.
/// Front ends print or log them; nothing in the core consumes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    WorkoutStarted {
        phase: Phase,
        round: u32,
        station: u32,
        remaining_secs: u32,
        /// True when Start re-initialized a finished workout.
        restarted: bool,
        at: DateTime<Utc>,
    },
    WorkoutPaused {
        phase: Phase,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    WorkoutReset {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    PhaseChanged {
        from: Phase,
        to: Phase,
        round: u32,
        station: u32,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    WorkoutCompleted {
        rounds: u32,
        stations: u32,
        at: DateTime<Utc>,
    },
    /// A configuration edit was applied to a paused workout.
    ConfigApplied {
        config: WorkoutConfig,
        remaining_secs: u32,
        station: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        previous_phase: Option<Phase>,
        round: u32,
        station: u32,
        remaining_secs: u32,
        running: bool,
        config: WorkoutConfig,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Snake-case name for logs and terse output.
    pub fn name(&self) -> &'static str {
        match self {
            Event::WorkoutStarted { .. } => "workout_started",
            Event::WorkoutPaused { .. } => "workout_paused",
            Event::WorkoutReset { .. } => "workout_reset",
            Event::PhaseChanged { .. } => "phase_changed",
            Event::WorkoutCompleted { .. } => "workout_completed",
            Event::ConfigApplied { .. } => "config_applied",
            Event::StateSnapshot { .. } => "state_snapshot",
        }
    }
}
