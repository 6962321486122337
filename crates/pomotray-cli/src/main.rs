use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "pomotray", version, about = "Pomodoro timer with shell hooks")]
pub struct Cli {
    /// Configuration file (default: ~/.config/pomotray/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print debug information
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the timer, reading control commands from stdin
    Run,
    /// List the task cycle
    Tasks {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration inspection
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Run => commands::run::run(config),
        Commands::Tasks { json } => commands::tasks::run(config, json),
        Commands::Config { action } => commands::config::run(config, action),
        Commands::Completions { shell } => commands::completions::run(shell),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
