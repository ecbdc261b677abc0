//! Sorting Hat CLI — the main entry point.
//!
//! Commands:
//! - `init`            — Write a default config file
//! - `serve`           — Start the labeler gateway
//! - `label`           — Process one subject from the command line
//! - `show`            — Show a subject's label history and current state
//! - `register-labels` — Publish the label definitions to the issuer's repo
//! - `status`          — Show configuration and ledger status

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "sortinghat",
    about = "Sorting Hat — a house-assignment labeler for Bluesky",
    version,
    author
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
    /// Write a default config file
    Init,

    /// Start the labeler gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Process one subject (classify and label, or negate)
    Label {
        /// DID or handle of the subject
        subject: String,

        /// Negate the subject's active label instead of assigning one
        #[arg(long)]
        negate: bool,
    },

    /// Show a subject's label history and current state
    Show {
        /// DID or handle of the subject
        subject: String,
    },

    /// Publish the house label definitions to the issuer's repository
    RegisterLabels,

    /// Show configuration and ledger status
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init => commands::init::run().await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Label { subject, negate } => commands::label::run(subject, negate).await?,
        Commands::Show { subject } => commands::show::run(subject).await?,
        Commands::RegisterLabels => commands::register_labels::run().await?,
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}
