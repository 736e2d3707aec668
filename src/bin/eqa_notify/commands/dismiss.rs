// ABOUTME: `dismiss` subcommand acknowledging one notification
// ABOUTME: Seeds a local store, then dismisses through the two-phase coordinator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::helpers::{display::print_dismissal, session};
use eqa_notify::config::PortalConfig;
use eqa_notify::errors::AppResult;
use eqa_notify::formatters::OutputFormat;
use eqa_notify::models::NotificationId;
use eqa_notify::notifications::{
    DismissalCoordinator, HttpNotificationBackend, NotificationBackend, NotificationStore,
    SnapshotLoader,
};
use std::convert::Infallible;
use std::sync::Arc;

/// Dismiss `raw_id` and report what changed locally
pub async fn run(config: &PortalConfig, raw_id: &str, format: OutputFormat) -> AppResult<()> {
    let id: NotificationId = raw_id
        .trim()
        .parse()
        .unwrap_or_else(|never: Infallible| match never {});

    let context = session::establish(config).await?;
    let backend: Arc<dyn NotificationBackend> = Arc::new(HttpNotificationBackend::new());

    let mut store = NotificationStore::new();
    SnapshotLoader::new(Arc::clone(&backend))
        .load_into(&context, &mut store)
        .await?;

    let outcome = DismissalCoordinator::new(backend)
        .dismiss(&context, &mut store, &id)
        .await?;
    print_dismissal(&id, outcome, format)
}
