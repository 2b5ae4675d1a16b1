mod registry;

pub use registry::{TimerState, WorkoutTimerRegistry};
