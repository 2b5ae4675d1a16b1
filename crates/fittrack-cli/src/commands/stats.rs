use clap::Subcommand;
use serde::Serialize;

use fittrack_core::storage::Database;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Workout totals for today
    Today,
    /// All-time workout totals
    All,
    /// Recent daily step totals
    History {
        #[arg(long, default_value = "7")]
        days: usize,
    },
    /// Recently completed workouts
    Recent {
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

#[derive(Serialize)]
struct HistoryEntry {
    date: chrono::NaiveDate,
    steps: u64,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        StatsAction::Today => {
            println!("{}", serde_json::to_string_pretty(&db.stats_today()?)?);
        }
        StatsAction::All => {
            println!("{}", serde_json::to_string_pretty(&db.stats_all()?)?);
        }
        StatsAction::History { days } => {
            let history: Vec<HistoryEntry> = db
                .step_history(days)?
                .into_iter()
                .map(|(date, steps)| HistoryEntry { date, steps })
                .collect();
            println!("{}", serde_json::to_string_pretty(&history)?);
        }
        StatsAction::Recent { limit } => {
            println!(
                "{}",
                serde_json::to_string_pretty(&db.recent_workouts(limit)?)?
            );
        }
    }
    Ok(())
}
