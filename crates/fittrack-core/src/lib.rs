//! # Fittrack Core Library
//!
//! This library provides the core logic for the Fittrack fitness tracker.
//! It implements a CLI-first philosophy where all operations are available
//! via a standalone CLI binary, with any GUI being a thin layer over the
//! same core library.
//!
//! ## Architecture
//!
//! - **Step Accumulator**: converts raw step-sensor events into a
//!   restart-safe, per-day step total backed by the local database
//! - **Timer Registry**: independent workout countdown timers whose
//!   remaining time is derived from wall-clock timestamps at the moment
//!   of observation -- no background ticking task
//! - **Storage**: SQLite-based counters and workout log, TOML-based
//!   configuration
//!
//! ## Key Components
//!
//! - [`StepAccumulator`]: daily step counting state machine
//! - [`WorkoutTimerRegistry`]: countdown timer table keyed by workout id
//! - [`Database`]: counter, registry-snapshot and workout persistence
//! - [`Config`]: application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod steps;
pub mod storage;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError};
pub use events::Event;
pub use steps::{SensorAvailability, StepAccumulator, StepSensorEvent};
pub use storage::{Config, Database, WorkoutStats};
pub use timer::{TimerState, WorkoutTimerRegistry};
