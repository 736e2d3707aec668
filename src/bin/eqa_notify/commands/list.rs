// ABOUTME: `list` subcommand printing the signed-in user's notifications
// ABOUTME: Loads one snapshot into a local store and renders the toolbar view
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::helpers::{display::print_view, session};
use eqa_notify::config::PortalConfig;
use eqa_notify::errors::AppResult;
use eqa_notify::formatters::{OutputFormat, ToolbarView};
use eqa_notify::notifications::{HttpNotificationBackend, NotificationStore, SnapshotLoader};
use std::sync::Arc;
use tracing::warn;

/// Load and print the snapshot
pub async fn run(config: &PortalConfig, format: OutputFormat) -> AppResult<()> {
    let context = session::establish(config).await?;
    let loader = SnapshotLoader::new(Arc::new(HttpNotificationBackend::new()));

    let mut store = NotificationStore::new();
    if !loader.load_into(&context, &mut store).await? {
        warn!("Snapshot skipped: session has no identity");
    }

    let view = ToolbarView::from_state(&store.snapshot(), &context.identity().role);
    print_view(&view, format)
}
