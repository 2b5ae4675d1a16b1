use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Every state change in the core produces an Event.
/// Consumers poll or subscribe and render; the CLI prints them as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Today's step total changed (accepted sensor update, debug add,
    /// or day-rollover reset to zero).
    StepCountUpdated {
        date: NaiveDate,
        steps: u64,
        at: DateTime<Utc>,
    },
    TimerStarted {
        workout_id: i64,
        total_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        workout_id: i64,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        workout_id: i64,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Remaining time was observed at or below zero while running.
    TimerCompleted {
        workout_id: i64,
        at: DateTime<Utc>,
    },
    TimerRemoved {
        workout_id: i64,
        at: DateTime<Utc>,
    },
    /// Point-in-time view of one timer, remaining time freshly computed.
    TimerSnapshot {
        workout_id: i64,
        total_secs: u64,
        remaining_secs: u64,
        is_running: bool,
        is_paused: bool,
        at: DateTime<Utc>,
    },
}
