use clap::Subcommand;

use fittrack_core::storage::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the current configuration as JSON
    Show,
    /// Set the daily step goal
    SetStepGoal {
        #[arg(long)]
        steps: u32,
    },
    /// Set the default workout duration in minutes
    SetWorkoutDuration {
        #[arg(long)]
        minutes: u32,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;

    match action {
        ConfigAction::Show => {}
        ConfigAction::SetStepGoal { steps } => {
            config.tracking.daily_step_goal = steps;
            config.save()?;
        }
        ConfigAction::SetWorkoutDuration { minutes } => {
            config.workout.default_duration_min = minutes;
            config.save()?;
        }
    }

    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
