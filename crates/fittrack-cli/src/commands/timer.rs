use std::sync::Arc;

use chrono::Utc;
use clap::Subcommand;

use fittrack_core::storage::{Config, Database};
use fittrack_core::timer::{TimerState, WorkoutTimerRegistry};
use fittrack_core::SystemClock;

const REGISTRY_KEY: &str = "timer_registry";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start (or restart) a countdown for a workout
    Start {
        #[arg(long)]
        id: i64,
        /// Duration in minutes; falls back to the configured default
        #[arg(long)]
        minutes: Option<u64>,
    },
    /// Pause a running countdown
    Pause {
        #[arg(long)]
        id: i64,
    },
    /// Resume a paused countdown
    Resume {
        #[arg(long)]
        id: i64,
    },
    /// Print the current state of a countdown as JSON
    Status {
        #[arg(long)]
        id: i64,
    },
    /// Record the elapsed workout and remove the countdown
    Finish {
        #[arg(long)]
        id: i64,
    },
    /// Discard a countdown without recording anything
    Remove {
        #[arg(long)]
        id: i64,
    },
}

fn load_registry(db: &Database) -> WorkoutTimerRegistry {
    let registry = WorkoutTimerRegistry::new(Arc::new(SystemClock));
    if let Ok(Some(json)) = db.kv_get(REGISTRY_KEY) {
        if let Ok(states) = serde_json::from_str::<Vec<TimerState>>(&json) {
            registry.restore(states);
        }
    }
    registry
}

fn save_registry(
    db: &Database,
    registry: &WorkoutTimerRegistry,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(&registry.states())?;
    db.kv_set(REGISTRY_KEY, &json)?;
    Ok(())
}

fn print_status(registry: &WorkoutTimerRegistry, id: i64) -> Result<(), Box<dyn std::error::Error>> {
    match registry.snapshot(id) {
        Some(snapshot) => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        None => println!("{{\"type\": \"no_timer\", \"workout_id\": {id}}}"),
    }
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let registry = load_registry(&db);

    match action {
        TimerAction::Start { id, minutes } => {
            let minutes = minutes
                .unwrap_or_else(|| Config::load_or_default().workout.default_duration_min as u64);
            if let Some(event) = registry.start(id, minutes) {
                println!("{}", serde_json::to_string_pretty(&event)?);
            }
        }
        TimerAction::Pause { id } => match registry.pause(id) {
            Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
            None => print_status(&registry, id)?,
        },
        TimerAction::Resume { id } => match registry.resume(id) {
            Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
            None => print_status(&registry, id)?,
        },
        TimerAction::Status { id } => print_status(&registry, id)?,
        TimerAction::Finish { id } => {
            // Freeze the remaining time before reading the elapsed part.
            registry.pause(id);
            let minutes = registry.actual_duration_min(id);
            if minutes > 0 {
                let row = db.record_workout(id, minutes, Utc::now())?;
                println!(
                    "{{\"type\": \"workout_recorded\", \"id\": {row}, \"workout_id\": {id}, \"duration_min\": {minutes}}}"
                );
            }
            registry.remove(id);
        }
        TimerAction::Remove { id } => {
            if let Some(event) = registry.remove(id) {
                println!("{}", serde_json::to_string_pretty(&event)?);
            }
        }
    }

    save_registry(&db, &registry)?;
    Ok(())
}
