use annoyer_core::format_duration;
use clap::Subcommand;
use std::path::Path;

use super::open_store;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List recorded check-ins
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Summary statistics
    Stats,
    /// Delete all recorded check-ins
    Clear,
}

pub fn run(file: Option<&Path>, action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(file)?;

    match action {
        HistoryAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(store.history())?);
                return Ok(());
            }
            if store.history().is_empty() {
                println!("no check-ins recorded");
            }
            for (i, r) in store.history().iter().enumerate() {
                println!(
                    "{:>4}  {:<6}  {:<5}  {:>14}  target {:>14}",
                    i + 1,
                    r.outcome,
                    if r.is_early { "early" } else { "late" },
                    format_duration(r.duration_sec),
                    format_duration(r.target_duration_sec),
                );
            }
        }
        HistoryAction::Stats => {
            println!("{}", serde_json::to_string_pretty(&store.stats())?);
        }
        HistoryAction::Clear => {
            let n = store.history().len();
            store.clear_history()?;
            println!("cleared {n} check-ins");
        }
    }
    Ok(())
}
