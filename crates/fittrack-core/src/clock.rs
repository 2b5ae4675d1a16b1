//! Time sources.
//!
//! Both core components derive elapsed time and the current day from
//! timestamps taken at the moment of observation, so the clock is behind
//! a trait: production code uses [`SystemClock`], tests drive
//! [`ManualClock`] to simulate elapsed time and day rollovers
//! deterministically.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{Local, NaiveDate};

/// A source of wall-clock time and the local calendar date.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;

    /// The current date in the device's configured local timezone.
    fn local_date(&self) -> NaiveDate;
}

/// Clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    fn local_date(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Manually advanced clock for deterministic tests.
///
/// Time only moves when `advance_*` is called; the date only changes via
/// [`ManualClock::set_date`].
#[derive(Debug)]
pub struct ManualClock {
    now_ms: AtomicU64,
    date: Mutex<NaiveDate>,
}

impl ManualClock {
    pub fn new(start_ms: u64, date: NaiveDate) -> Self {
        Self {
            now_ms: AtomicU64::new(start_ms),
            date: Mutex::new(date),
        }
    }

    pub fn advance_ms(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance_ms(secs.saturating_mul(1000));
    }

    pub fn set_date(&self, date: NaiveDate) {
        if let Ok(mut d) = self.date.lock() {
            *d = date;
        }
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    fn local_date(&self) -> NaiveDate {
        self.date
            .lock()
            .map(|d| *d)
            .unwrap_or_else(|_| NaiveDate::default())
    }
}
