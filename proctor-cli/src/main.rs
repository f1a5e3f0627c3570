use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod backend;
mod commands;
mod config;

#[derive(Parser)]
#[command(name = "proctor", about = "Timed quizzes and judged coding practice")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a timed multiple-choice quiz
    Quiz(commands::quiz::QuizArgs),
    /// Run or submit code against a problem
    Code(commands::code::CodeArgs),
    /// List recorded sessions
    History(commands::history::HistoryArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Quiz(args) => commands::quiz::run(args).await,
        Commands::Code(args) => commands::code::run(args).await,
        Commands::History(args) => commands::history::run(args).await,
        Commands::Config(args) => commands::config::run(args),
    }
}
