//! Tau Reco CLI - Build tau candidates from serialized events
//!
//! Command-line interface for the plugin-based tau construction pipeline.

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use rayon::ThreadPoolBuilder;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;

use commands::run::RunCommand;

#[derive(Parser)]
#[command(
    name = "tau-reco",
    version,
    about = "Build tau candidates from jet seeds with pluggable builders and modifiers",
    after_help = "EXAMPLES:\n  \
                  # List all available plugins\n  \
                  tau-reco plugins\n\n  \
                  # Run a producer configuration over a file of events\n  \
                  tau-reco run --config config/combinatoric.yaml --input events.json\n\n  \
                  # Write output and print a fingerprint for reproducibility checks\n  \
                  tau-reco run -c config/combinatoric.yaml -i events.json -o taus.json --digest"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a producer configuration over a JSON file of events
    Run(RunCommand),

    /// List available builder and modifier plugins
    Plugins,
}

fn main() -> Result<()> {
    // Lets tests cap parallelism
    if let Ok(threads_str) = std::env::var("TAU_RECO_THREADS") {
        if let Ok(num_threads) = threads_str.parse::<usize>() {
            ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()
                .ok(); // Ignore error if already initialized
        }
    }

    let cli = Cli::parse();

    let log_level = match &cli.command {
        Commands::Plugins => Level::WARN,
        _ => {
            if cli.verbose {
                Level::DEBUG
            } else {
                Level::INFO
            }
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    match cli.command {
        Commands::Run(cmd) => cmd.execute(),
        Commands::Plugins => commands::plugins::list_plugins(),
    }
}
