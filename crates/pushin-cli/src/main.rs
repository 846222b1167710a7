use chrono::{DateTime, Utc};
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "pushin", version, about = "PUSHIN' CLI: earn screen time with a workout")]
struct Cli {
    /// Use this time instead of the system clock (RFC 3339)
    #[arg(long, global = true, value_parser = parse_time)]
    at: Option<DateTime<Utc>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply due expiries and print the current state as JSON
    Status,
    /// Advance the clock; same report as `status`, for periodic callers
    Tick,
    /// Lock all targets immediately, discarding any workout or session
    Lock,
    /// Workout control
    Workout {
        #[command(subcommand)]
        action: commands::workout::WorkoutAction,
    },
    /// Block target management
    Targets {
        #[command(subcommand)]
        action: commands::targets::TargetsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn parse_time(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {e}"))
}

fn main() {
    // Logs go to stderr; stdout carries JSON only.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let now = cli.at.unwrap_or_else(Utc::now);

    let result = match cli.command {
        Commands::Status | Commands::Tick => commands::access::status(now),
        Commands::Lock => commands::access::lock(now),
        Commands::Workout { action } => commands::workout::run(action, now),
        Commands::Targets { action } => commands::targets::run(action, now),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "pushin", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
