use std::sync::Arc;

use clap::Subcommand;
use serde::Serialize;

use fittrack_core::steps::{SensorAvailability, StepAccumulator, StepSensorEvent};
use fittrack_core::storage::{Config, Database};
use fittrack_core::SystemClock;

#[derive(Subcommand)]
pub enum StepsAction {
    /// Print today's step total as JSON
    Status,
    /// Feed lifetime-counter readings (first one becomes the baseline)
    Counter {
        /// Counter values, in delivery order
        #[arg(long = "value", required = true)]
        values: Vec<i64>,
    },
    /// Feed step-detector pulses
    Detect {
        /// Number of pulses
        #[arg(long, default_value = "1")]
        count: u32,
    },
    /// Directly add steps (debug)
    Add {
        #[arg(long)]
        n: u64,
    },
}

#[derive(Serialize)]
struct StepsStatus {
    date: chrono::NaiveDate,
    steps: u64,
    daily_goal: u32,
}

fn open_accumulator() -> Result<StepAccumulator, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    // The CLI has no sensor hardware; it simulates both kinds.
    let acc = StepAccumulator::new(db, SensorAvailability::both(), Arc::new(SystemClock))?;
    Ok(acc)
}

fn print_status(acc: &StepAccumulator) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let status = StepsStatus {
        date: chrono::Local::now().date_naive(),
        steps: acc.daily_steps()?,
        daily_goal: config.tracking.daily_step_goal,
    };
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

pub fn run(action: StepsAction) -> Result<(), Box<dyn std::error::Error>> {
    let acc = open_accumulator()?;
    acc.start_listening()?;

    match action {
        StepsAction::Status => print_status(&acc)?,
        StepsAction::Counter { values } => {
            for value in values {
                if let Some(event) = acc.on_event(StepSensorEvent::LifetimeCount { value })? {
                    println!("{}", serde_json::to_string_pretty(&event)?);
                }
            }
            print_status(&acc)?;
        }
        StepsAction::Detect { count } => {
            for _ in 0..count {
                acc.on_event(StepSensorEvent::StepDetected)?;
            }
            print_status(&acc)?;
        }
        StepsAction::Add { n } => {
            acc.add_steps_for_testing(n)?;
            print_status(&acc)?;
        }
    }
    Ok(())
}
