use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod bell;
mod commands;

#[derive(Parser)]
#[command(name = "annoyer", version, about = "Annoyer CLI")]
struct Cli {
    /// Storage file to use instead of ~/.config/annoyer/annoyer.toml
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the alarm interactively (r/y/g + Enter to check in)
    Run {
        /// Tick interval in milliseconds
        #[arg(long, default_value_t = 100)]
        tick_ms: u64,
    },
    /// Print the state a new period would start in, as JSON
    Status,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Alarm sound selection
    Sound {
        #[command(subcommand)]
        action: commands::sound::SoundAction,
    },
    /// Check-in history
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
}

fn main() {
    let filter = EnvFilter::try_from_env("ANNOYER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let file = cli.file.as_deref();
    let result = match cli.command {
        Commands::Run { tick_ms } => commands::run::run(file, tick_ms),
        Commands::Status => commands::run::status(file),
        Commands::Config { action } => commands::config::run(file, action),
        Commands::Sound { action } => commands::sound::run(file, action),
        Commands::History { action } => commands::history::run(file, action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
