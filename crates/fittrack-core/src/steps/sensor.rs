use serde::{Deserialize, Serialize};

/// The two step-sensor event kinds the accumulator understands.
///
/// A device may expose either, both, or neither. The two kinds are
/// treated as independent sources; when both fire for the same physical
/// step that step is counted twice (accepted limitation, no dedup).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepSensorEvent {
    /// Cumulative step total since an indeterminate device-level reset
    /// point, typically boot. Monotonically increasing in hardware, but
    /// the accumulator tolerates dips.
    LifetimeCount { value: i64 },
    /// One discrete pulse per detected step, no running total.
    StepDetected,
}

/// Which sensor kinds the device exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorAvailability {
    pub lifetime_counter: bool,
    pub step_detector: bool,
}

impl SensorAvailability {
    pub fn both() -> Self {
        Self {
            lifetime_counter: true,
            step_detector: true,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    /// True if at least one sensor kind is present.
    pub fn any(&self) -> bool {
        self.lifetime_counter || self.step_detector
    }
}
