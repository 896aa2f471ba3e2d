mod commands;
mod config;

use clap::{Parser, Subcommand};
use skyhop_core::SkyhopError;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "skyhop")]
#[command(about = "Skyhop - a jump game with an encrypted on-chain leaderboard")]
#[command(version)]
struct Cli {
    /// Data directory for session storage
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Leaderboard contract address (overrides the stored config)
    #[arg(short, long, global = true)]
    contract: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a round in the terminal
    Play,
    /// Submit a score to the encrypted leaderboard
    Submit {
        /// Score to submit; defaults to the most recent session
        #[arg(short, long)]
        score: Option<u32>,
    },
    /// Show the on-chain leaderboard
    Leaderboard {
        /// Keep refreshing until interrupted
        #[arg(short, long)]
        watch: bool,
    },
    /// Show locally recorded sessions
    History {
        /// Number of sessions to show
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
    /// Show relayer, wallet and contract status
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "skyhop={}",
            log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Get data directory
    let data_dir = cli.data_dir.unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skyhop")
    });

    // Ensure data directory exists
    tokio::fs::create_dir_all(&data_dir).await?;

    let cli_config = config::CliConfig::load(&data_dir);
    let result = run(cli.command, &cli_config, cli.contract.as_deref(), &data_dir).await;

    if let Err(e) = result {
        match e {
            SkyhopError::Config(msg) => {
                eprintln!("Error: {}", msg);
                eprintln!("Set the contract with '--contract <address>' or in config.json");
            }
            SkyhopError::InvalidAddress(addr) => {
                eprintln!("Error: Invalid address: {}", addr);
            }
            SkyhopError::Wallet(msg) => {
                eprintln!("Error: {}", msg);
                eprintln!("Make sure a wallet provider is running and exposes an account");
            }
            SkyhopError::Timeout(msg) => {
                eprintln!("Error: Timed out: {}", msg);
            }
            _ => {
                eprintln!("Error: {}", e);
            }
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn run(
    command: Commands,
    cli_config: &config::CliConfig,
    contract_override: Option<&str>,
    data_dir: &std::path::Path,
) -> skyhop_core::Result<()> {
    let chain = cli_config.chain_config(contract_override)?;
    let app = commands::App::new(chain, data_dir).await?;

    match command {
        Commands::Play => commands::handle_play(&app).await,
        Commands::Submit { score } => commands::handle_submit(&app, score).await,
        Commands::Leaderboard { watch } => commands::handle_leaderboard(&app, watch).await,
        Commands::History { limit } => commands::handle_history(&app, limit).await,
        Commands::Status => commands::handle_status(&app).await,
    }
}
