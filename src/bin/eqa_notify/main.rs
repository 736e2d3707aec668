// ABOUTME: eqa-notify - command-line client for EQA portal notifications
// ABOUTME: Lists, watches, and dismisses notifications for the signed-in user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Show active and dismissed notifications
//! EQA_USERNAME=lab EQA_PASSWORD=secret eqa-notify list
//!
//! # Follow the live push channel until Ctrl-C
//! eqa-notify watch --base-url https://eqa.example.org --subdirectory /rsv
//!
//! # Dismiss one notification
//! eqa-notify dismiss 42
//!
//! # End the backend session
//! eqa-notify logout
//! ```

mod commands;
mod helpers;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use eqa_notify::config::PortalConfig;
use eqa_notify::formatters::OutputFormat;
use eqa_notify::logging::LoggingConfig;
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "eqa-notify",
    about = "EQA portal notification client",
    long_about = "Lists, follows, and dismisses the signed-in user's EQA portal notifications."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Portal origin override (defaults to EQA_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Deployment sub-path override (defaults to EQA_SUBDIRECTORY)
    #[arg(long, global = true)]
    subdirectory: Option<String>,

    /// Output format: text or json
    #[arg(long, global = true, default_value = "text")]
    format: String,

    /// More log output: -v for debug, -vv for trace
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Show active and dismissed notifications
    List,

    /// Follow the push channel and print the toolbar on every change
    Watch {
        /// Print only the final state on exit instead of every change
        #[arg(long)]
        quiet: bool,
    },

    /// Dismiss a notification by id
    Dismiss {
        /// Notification id as shown by `list`
        id: String,
    },

    /// End the backend session
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    LoggingConfig::from_env()
        .with_verbosity(cli.verbose)
        .init()?;

    let mut config = PortalConfig::from_env()?;
    if let Some(base_url) = cli.base_url.as_deref() {
        config.base_url = PortalConfig::new(base_url)?.base_url;
    }
    if let Some(subdirectory) = cli.subdirectory.as_deref() {
        config = config.with_subdirectory(subdirectory);
    }
    debug!(root = %config.endpoints().root(), "Resolved portal endpoints");

    let format = OutputFormat::from_str_param(&cli.format);

    match cli.command {
        Command::List => commands::list::run(&config, format).await?,
        Command::Watch { quiet } => commands::watch::run(&config, format, quiet).await?,
        Command::Dismiss { id } => commands::dismiss::run(&config, &id, format).await?,
        Command::Logout => commands::logout::run(&config).await?,
    }

    Ok(())
}
