//! Daily step accumulator.
//!
//! Converts raw step-sensor events into a same-day step total. Totals are
//! persisted on every accepted change, keyed by local calendar date, so
//! the count survives process restarts and resets at local-day
//! boundaries. Continuous process lifetime is never assumed.
//!
//! ## Update acceptance
//!
//! A candidate total is accepted only if it is `>=` the stored total for
//! today, or the stored total is exactly zero (first legitimate write
//! after a reset). This keeps a spurious small delta from a sensor
//! restart or counter rollover from erasing a larger already-recorded
//! count. Known limitation, kept as-is: if the lifetime counter resets
//! mid-day while the stored total is non-zero, subsequent updates are
//! ignored until the stored total is externally zeroed.

use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};
use tokio::sync::watch;

use crate::clock::Clock;
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::storage::Database;

use super::sensor::{SensorAvailability, StepSensorEvent};

struct Inner {
    db: Database,
    /// Whether a lifetime-counter baseline has been captured since this
    /// accumulator was constructed.
    has_initial_count: bool,
    is_listening: bool,
}

/// Restart-safe counter of steps taken on the current local day.
///
/// All methods take `&self`; persisted counters and transient flags live
/// behind a single mutation lock so every update appears whole to
/// concurrent observers.
pub struct StepAccumulator {
    inner: Mutex<Inner>,
    availability: SensorAvailability,
    clock: Arc<dyn Clock>,
    steps_tx: watch::Sender<u64>,
}

impl StepAccumulator {
    /// Create an accumulator over the given database.
    ///
    /// Performs the day-rollover check immediately, so a stale
    /// `last_date` from a previous run is resolved before the first
    /// event arrives.
    pub fn new(
        db: Database,
        availability: SensorAvailability,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let mut inner = Inner {
            db,
            has_initial_count: false,
            is_listening: false,
        };
        let today = clock.local_date();
        roll_over_if_needed(&mut inner, today)?;
        let steps = inner.db.daily_steps(today)?;
        let (steps_tx, _) = watch::channel(steps);
        Ok(Self {
            inner: Mutex::new(inner),
            availability,
            clock,
            steps_tx,
        })
    }

    /// True if at least one step sensor kind is present on the device.
    pub fn is_available(&self) -> bool {
        self.availability.any()
    }

    /// Begin receiving sensor events. Idempotent; no-op when no sensor
    /// is available.
    pub fn start_listening(&self) -> Result<()> {
        let mut inner = self.lock()?;
        if self.availability.any() {
            inner.is_listening = true;
        }
        Ok(())
    }

    /// Stop receiving sensor events. Idempotent.
    pub fn stop_listening(&self) -> Result<()> {
        self.lock()?.is_listening = false;
        Ok(())
    }

    pub fn is_listening(&self) -> Result<bool> {
        Ok(self.lock()?.is_listening)
    }

    /// Today's persisted step total.
    ///
    /// Re-checks the day boundary, so a poll shortly after midnight
    /// reads 0 without waiting for the next sensor event.
    pub fn daily_steps(&self) -> Result<u64> {
        let mut inner = self.lock()?;
        let today = self.clock.local_date();
        if roll_over_if_needed(&mut inner, today)? {
            self.steps_tx.send_replace(0);
        }
        Ok(inner.db.daily_steps(today)?)
    }

    /// Observable stream of today's step total.
    ///
    /// Every accepted change is published; late subscribers see the
    /// latest value immediately.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.steps_tx.subscribe()
    }

    /// Process one sensor event.
    ///
    /// Returns the update event when a change was accepted, `None` when
    /// the event was a baseline capture or was rejected by the
    /// acceptance rule.
    pub fn on_event(&self, event: StepSensorEvent) -> Result<Option<Event>> {
        let mut inner = self.lock()?;
        let today = self.clock.local_date();
        if roll_over_if_needed(&mut inner, today)? {
            self.steps_tx.send_replace(0);
        }

        match event {
            StepSensorEvent::LifetimeCount { value } => {
                let value = value.max(0);
                if !inner.has_initial_count {
                    // First lifetime reading since construction becomes
                    // today's baseline; reports no steps itself.
                    inner.db.set_initial_count(today, value)?;
                    inner.has_initial_count = true;
                    return Ok(None);
                }
                let baseline = inner.db.initial_count(today)?.unwrap_or(0);
                let candidate = value.saturating_sub(baseline).max(0) as u64;
                self.apply(&mut inner, today, candidate)
            }
            StepSensorEvent::StepDetected => {
                let candidate = inner.db.daily_steps(today)?.saturating_add(1);
                self.apply(&mut inner, today, candidate)
            }
        }
    }

    /// Directly add `n` steps to today's total. Debug tooling only; the
    /// result always passes the acceptance rule.
    pub fn add_steps_for_testing(&self, n: u64) -> Result<u64> {
        let mut inner = self.lock()?;
        let today = self.clock.local_date();
        if roll_over_if_needed(&mut inner, today)? {
            self.steps_tx.send_replace(0);
        }
        let total = inner.db.daily_steps(today)?.saturating_add(n);
        inner.db.set_daily_steps(today, total)?;
        self.steps_tx.send_replace(total);
        Ok(total)
    }

    fn apply(&self, inner: &mut Inner, date: NaiveDate, candidate: u64) -> Result<Option<Event>> {
        let current = inner.db.daily_steps(date)?;
        if candidate < current && current != 0 {
            return Ok(None);
        }
        inner.db.set_daily_steps(date, candidate)?;
        self.steps_tx.send_replace(candidate);
        Ok(Some(Event::StepCountUpdated {
            date,
            steps: candidate,
            at: Utc::now(),
        }))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| CoreError::Custom("step accumulator lock poisoned".into()))
    }
}

/// Reset today's counter and baseline flag once per date transition.
/// Returns true when a rollover actually fired.
fn roll_over_if_needed(inner: &mut Inner, today: NaiveDate) -> Result<bool> {
    if inner.db.last_date()? == Some(today) {
        return Ok(false);
    }
    inner.db.set_daily_steps(today, 0)?;
    inner.db.set_last_date(today)?;
    inner.has_initial_count = false;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn accumulator(date: NaiveDate) -> StepAccumulator {
        let db = Database::open_memory().unwrap();
        let clock = Arc::new(ManualClock::new(0, date));
        StepAccumulator::new(db, SensorAvailability::both(), clock).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    #[test]
    fn first_lifetime_event_only_captures_baseline() {
        let acc = accumulator(date());
        let event = acc
            .on_event(StepSensorEvent::LifetimeCount { value: 1000 })
            .unwrap();
        assert!(event.is_none());
        assert_eq!(acc.daily_steps().unwrap(), 0);
    }

    #[test]
    fn detector_pulses_increment_by_one() {
        let acc = accumulator(date());
        for _ in 0..5 {
            acc.on_event(StepSensorEvent::StepDetected).unwrap();
        }
        assert_eq!(acc.daily_steps().unwrap(), 5);
    }

    #[test]
    fn smaller_delta_is_rejected_when_current_nonzero() {
        let acc = accumulator(date());
        acc.on_event(StepSensorEvent::LifetimeCount { value: 1000 })
            .unwrap();
        acc.on_event(StepSensorEvent::LifetimeCount { value: 1050 })
            .unwrap();
        assert_eq!(acc.daily_steps().unwrap(), 50);
        acc.on_event(StepSensorEvent::LifetimeCount { value: 1040 })
            .unwrap();
        assert_eq!(acc.daily_steps().unwrap(), 50);
        acc.on_event(StepSensorEvent::LifetimeCount { value: 1070 })
            .unwrap();
        assert_eq!(acc.daily_steps().unwrap(), 70);
    }

    #[test]
    fn negative_lifetime_values_clamp_to_zero() {
        let acc = accumulator(date());
        acc.on_event(StepSensorEvent::LifetimeCount { value: -50 })
            .unwrap();
        acc.on_event(StepSensorEvent::LifetimeCount { value: -10 })
            .unwrap();
        assert_eq!(acc.daily_steps().unwrap(), 0);
    }

    #[test]
    fn listening_toggles_are_idempotent() {
        let acc = accumulator(date());
        acc.start_listening().unwrap();
        acc.start_listening().unwrap();
        assert!(acc.is_listening().unwrap());
        acc.stop_listening().unwrap();
        acc.stop_listening().unwrap();
        assert!(!acc.is_listening().unwrap());
    }

    #[test]
    fn unavailable_sensors_never_listen() {
        let db = Database::open_memory().unwrap();
        let clock = Arc::new(ManualClock::new(0, date()));
        let acc = StepAccumulator::new(db, SensorAvailability::none(), clock).unwrap();
        assert!(!acc.is_available());
        acc.start_listening().unwrap();
        assert!(!acc.is_listening().unwrap());
    }

    #[test]
    fn subscribers_see_latest_value() {
        let acc = accumulator(date());
        acc.on_event(StepSensorEvent::StepDetected).unwrap();
        acc.on_event(StepSensorEvent::StepDetected).unwrap();
        let rx = acc.subscribe();
        assert_eq!(*rx.borrow(), 2);
    }
}
