//! Workout countdown timer registry.
//!
//! A process-wide table of independent countdown timers keyed by workout
//! id. Remaining time is always derived from wall-clock timestamps at
//! the moment of observation rather than a background tick, so a query
//! is correct even if the process was suspended since the last update.
//!
//! ## State Transitions
//!
//! ```text
//! Created -> Running <-> Paused
//!               |
//!               v (remaining observed <= 0)
//!           Completed -> Removed (explicit)
//! ```
//!
//! Completion is triggered by observation: a caller must poll
//! [`WorkoutTimerRegistry::current_remaining`] to discover expiry. Only
//! `start` resurrects a removed id, and it always starts fresh.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::events::Event;

/// State of one countdown timer.
///
/// Exactly one of `is_running`/`is_paused` is true while the timer is
/// live; both are false once completion has been observed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerState {
    pub workout_id: i64,
    pub total_secs: u64,
    /// Last frozen remaining time; authoritative while not running.
    pub remaining_secs: u64,
    pub is_running: bool,
    pub is_paused: bool,
    /// Epoch ms at which the current running interval began. Synthetic
    /// after a resume so the elapsed formula keeps working unchanged.
    pub started_at_ms: u64,
    /// Paused time subtracted from the elapsed computation.
    pub paused_accum_ms: u64,
}

impl TimerState {
    fn elapsed_secs(&self, now_ms: u64) -> u64 {
        now_ms
            .saturating_sub(self.started_at_ms)
            .saturating_sub(self.paused_accum_ms)
            / 1000
    }
}

/// Registry of active workout countdown timers.
///
/// All methods take `&self`; the table lives behind a single mutation
/// lock so each operation appears whole to concurrent observers.
/// Operations on absent ids are silent no-ops, never errors. A poisoned
/// lock degrades the same way: queries read as absent.
pub struct WorkoutTimerRegistry {
    timers: Mutex<HashMap<i64, TimerState>>,
    clock: Arc<dyn Clock>,
}

impl WorkoutTimerRegistry {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            timers: Mutex::new(HashMap::new()),
            clock,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Create or unconditionally replace the timer for `workout_id`,
    /// running from now with the full duration.
    pub fn start(&self, workout_id: i64, total_min: u64) -> Option<Event> {
        let total_secs = total_min.saturating_mul(60);
        let state = TimerState {
            workout_id,
            total_secs,
            remaining_secs: total_secs,
            is_running: true,
            is_paused: false,
            started_at_ms: self.clock.now_ms(),
            paused_accum_ms: 0,
        };
        let mut timers = self.timers.lock().ok()?;
        timers.insert(workout_id, state);
        Some(Event::TimerStarted {
            workout_id,
            total_secs,
            at: Utc::now(),
        })
    }

    /// Freeze the remaining time and stop the clock. No-op unless the
    /// timer exists and is running.
    pub fn pause(&self, workout_id: i64) -> Option<Event> {
        let now_ms = self.clock.now_ms();
        let mut timers = self.timers.lock().ok()?;
        let timer = timers.get_mut(&workout_id)?;
        if !timer.is_running {
            return None;
        }
        let elapsed = timer.elapsed_secs(now_ms);
        timer.remaining_secs = timer.total_secs.saturating_sub(elapsed);
        timer.is_running = false;
        timer.is_paused = true;
        Some(Event::TimerPaused {
            workout_id,
            remaining_secs: timer.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Restart the clock from the frozen remaining time. No-op unless
    /// the timer exists and is paused.
    pub fn resume(&self, workout_id: i64) -> Option<Event> {
        let now_ms = self.clock.now_ms();
        let mut timers = self.timers.lock().ok()?;
        let timer = timers.get_mut(&workout_id)?;
        if !timer.is_paused {
            return None;
        }
        // Synthetic start so elapsed = total - remaining right now.
        let consumed_ms = timer
            .total_secs
            .saturating_sub(timer.remaining_secs)
            .saturating_mul(1000);
        timer.started_at_ms = now_ms.saturating_sub(consumed_ms);
        timer.paused_accum_ms = 0;
        timer.is_running = true;
        timer.is_paused = false;
        Some(Event::TimerResumed {
            workout_id,
            remaining_secs: timer.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Delete the timer unconditionally. No-op if absent.
    pub fn remove(&self, workout_id: i64) -> Option<Event> {
        let mut timers = self.timers.lock().ok()?;
        timers.remove(&workout_id)?;
        Some(Event::TimerRemoved {
            workout_id,
            at: Utc::now(),
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Remaining seconds, computed from wall-clock timestamps on demand.
    ///
    /// Returns 0 for absent timers and the frozen value for paused or
    /// completed ones. Observing a running timer at or past its end
    /// freezes it to `remaining 0, not running, not paused`.
    pub fn current_remaining(&self, workout_id: i64) -> u64 {
        let now_ms = self.clock.now_ms();
        let Ok(mut timers) = self.timers.lock() else {
            return 0;
        };
        let Some(timer) = timers.get_mut(&workout_id) else {
            return 0;
        };
        if !timer.is_running {
            return timer.remaining_secs;
        }
        let elapsed = timer.elapsed_secs(now_ms);
        if elapsed >= timer.total_secs {
            timer.remaining_secs = 0;
            timer.is_running = false;
            timer.is_paused = false;
            return 0;
        }
        timer.total_secs - elapsed
    }

    /// True if an entry exists for the id, in any state.
    pub fn is_active(&self, workout_id: i64) -> bool {
        self.timers
            .lock()
            .map(|t| t.contains_key(&workout_id))
            .unwrap_or(false)
    }

    pub fn is_running(&self, workout_id: i64) -> bool {
        self.timers
            .lock()
            .ok()
            .and_then(|t| t.get(&workout_id).map(|s| s.is_running))
            .unwrap_or(false)
    }

    pub fn is_paused(&self, workout_id: i64) -> bool {
        self.timers
            .lock()
            .ok()
            .and_then(|t| t.get(&workout_id).map(|s| s.is_paused))
            .unwrap_or(false)
    }

    /// Elapsed portion of the timer in whole minutes, floored, with a
    /// floor of 1 minute. 0 if absent. Uses the frozen remaining-time
    /// snapshot, so call it after `pause` or observed completion.
    pub fn actual_duration_min(&self, workout_id: i64) -> u64 {
        let Ok(timers) = self.timers.lock() else {
            return 0;
        };
        match timers.get(&workout_id) {
            Some(timer) => {
                let elapsed_secs = timer.total_secs.saturating_sub(timer.remaining_secs);
                (elapsed_secs / 60).max(1)
            }
            None => 0,
        }
    }

    /// Point-in-time view of one timer with freshly computed remaining
    /// time. `None` if absent.
    pub fn snapshot(&self, workout_id: i64) -> Option<Event> {
        let remaining_secs = self.current_remaining(workout_id);
        let timers = self.timers.lock().ok()?;
        let timer = timers.get(&workout_id)?;
        Some(Event::TimerSnapshot {
            workout_id,
            total_secs: timer.total_secs,
            remaining_secs,
            is_running: timer.is_running,
            is_paused: timer.is_paused,
            at: Utc::now(),
        })
    }

    // ── Persistence hooks ────────────────────────────────────────────

    /// Clone out every entry, for serialization by the caller.
    pub fn states(&self) -> Vec<TimerState> {
        self.timers
            .lock()
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Replace the whole table with previously exported entries.
    pub fn restore(&self, states: Vec<TimerState>) {
        if let Ok(mut timers) = self.timers.lock() {
            *timers = states.into_iter().map(|s| (s.workout_id, s)).collect();
        }
    }
}
