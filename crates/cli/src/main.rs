//! Nikola CLI - session migrations and holiday mode.
//!
//! # Usage
//!
//! ```bash
//! # Create the storefront session table
//! nikola-cli migrate storefront
//!
//! # Create the admin session table (schema `admin`)
//! nikola-cli migrate admin
//!
//! # Both
//! nikola-cli migrate all
//!
//! # Show holiday mode
//! nikola-cli holiday status
//!
//! # Switch holiday mode (needs an admin account)
//! nikola-cli holiday set --enabled --discount 25
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "nikola-cli")]
#[command(author, version, about = "Nikola CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create session tables
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Inspect or switch holiday mode
    Holiday {
        #[command(subcommand)]
        action: HolidayAction,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Storefront session table
    Storefront,
    /// Admin session table
    Admin,
    /// Every session table
    All,
}

#[derive(Subcommand)]
enum HolidayAction {
    /// Print the current holiday status
    Status,
    /// Switch holiday mode on or off
    Set {
        /// Turn holiday mode on (off when omitted)
        #[arg(long)]
        enabled: bool,

        /// Storewide discount percentage (0-100)
        #[arg(short, long, default_value_t = 0)]
        discount: i64,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Storefront => commands::migrate::storefront().await?,
            MigrateTarget::Admin => commands::migrate::admin().await?,
            MigrateTarget::All => {
                commands::migrate::storefront().await?;
                commands::migrate::admin().await?;
            }
        },
        Commands::Holiday { action } => match action {
            HolidayAction::Status => commands::holiday::status().await?,
            HolidayAction::Set { enabled, discount } => {
                commands::holiday::set(enabled, discount).await?;
            }
        },
    }
    Ok(())
}
