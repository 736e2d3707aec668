// ABOUTME: Session establishment for eqa-notify subcommands
// ABOUTME: Resumes a configured cookie or logs in with configured credentials
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use eqa_notify::auth::AuthClient;
use eqa_notify::config::PortalConfig;
use eqa_notify::context::SessionContext;
use eqa_notify::errors::{AppError, AppResult};
use eqa_notify::http_client::build_client;
use tracing::info;

/// Authentication client for the configured deployment
pub fn auth_client(config: &PortalConfig) -> AppResult<AuthClient> {
    Ok(AuthClient::new(build_client(&config.http)?, config.endpoints()))
}

/// Resume `EQA_SESSION_COOKIE` if set, otherwise log in with `EQA_USERNAME`/`EQA_PASSWORD`
pub async fn establish(config: &PortalConfig) -> AppResult<SessionContext> {
    let auth = auth_client(config)?;

    if let Some(cookie) = config.session_cookie.as_deref() {
        info!("Resuming portal session from EQA_SESSION_COOKIE");
        return auth.current_user(cookie).await;
    }
    if let Some(credentials) = &config.credentials {
        return auth.login(credentials).await;
    }
    Err(AppError::config_missing(
        "EQA_SESSION_COOKIE or EQA_USERNAME/EQA_PASSWORD",
    ))
}
