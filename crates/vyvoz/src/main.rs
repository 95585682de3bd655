// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vyvoz - Telegram intake bot for bulky-waste pickups and complaints.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod commands;
mod doctor;
mod logging;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Vyvoz - Telegram intake bot for bulky-waste pickups and complaints.
#[derive(Parser, Debug)]
#[command(name = "vyvoz", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Run the bot (default).
    Serve,
    /// Create the database schema and exit.
    InitDb,
    /// Send a one-off mail through the configured SMTP account.
    Mail {
        /// Recipient address.
        #[arg(long)]
        to: String,
        /// Plain-text message body.
        body: String,
    },
    /// Print the effective configuration with secrets masked.
    Config,
    /// Check configuration, database and external services.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => vyvoz_config::load_and_validate_path(path),
        None => vyvoz_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            vyvoz_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let command = cli.command.unwrap_or(Commands::Serve);
    if !matches!(command, Commands::Config | Commands::Doctor { .. })
        && let Err(e) = logging::init_tracing(&config.bot)
    {
        eprintln!("error: {e}");
        std::process::exit(1);
    }

    let result = match command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::InitDb => commands::run_init_db(&config).await,
        Commands::Mail { to, body } => commands::run_mail(&config, &body, &to).await,
        Commands::Config => commands::print_config(&config),
        Commands::Doctor { plain } => doctor::run_doctor(&config, plain).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
