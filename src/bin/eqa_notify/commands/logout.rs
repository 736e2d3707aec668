// ABOUTME: `logout` subcommand ending the backend session
// ABOUTME: Establishes the configured session, then logs it out
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::helpers::session;
use eqa_notify::config::PortalConfig;
use eqa_notify::errors::AppResult;

/// Log out the configured session
pub async fn run(config: &PortalConfig) -> AppResult<()> {
    let context = session::establish(config).await?;
    session::auth_client(config)?.logout(&context).await?;
    println!("Logged out {}", context.identity());
    Ok(())
}
