mod accumulator;
mod sensor;

pub use accumulator::StepAccumulator;
pub use sensor::{SensorAvailability, StepSensorEvent};
