// ABOUTME: `watch` subcommand following the live push channel
// ABOUTME: Runs a toolbar session and prints the view on every change until Ctrl-C
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::helpers::{display::print_view, session};
use eqa_notify::config::PortalConfig;
use eqa_notify::errors::{AppError, AppResult};
use eqa_notify::formatters::{OutputFormat, ToolbarView};
use eqa_notify::notifications::HttpNotificationBackend;
use eqa_notify::toolbar::{ToolbarOptions, ToolbarSession};
use std::sync::Arc;
use tracing::info;

/// Follow notifications until interrupted
pub async fn run(config: &PortalConfig, format: OutputFormat, quiet: bool) -> AppResult<()> {
    let context = session::establish(config).await?;
    let role = context.identity().role.clone();
    let session = ToolbarSession::start(
        context,
        Arc::new(HttpNotificationBackend::new()),
        ToolbarOptions::default(),
    )?;

    let mut store_updates = session.subscribe();
    let mut channel_updates = session
        .channel()
        .map(eqa_notify::channel::ChannelHandle::subscribe_state);

    info!(identity = %session.identity(), "Watching notifications, press Ctrl-C to stop");
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.map_err(|e| AppError::internal("Failed to listen for Ctrl-C").with_source(e))?;
                break;
            }
            changed = store_updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            Some(Ok(())) = async {
                match channel_updates.as_mut() {
                    Some(rx) => Some(rx.changed().await),
                    None => None,
                }
            } => {}
        }
        if !quiet {
            let view = ToolbarView::from_state(&session.state(), &role)
                .with_channel(session.channel_state());
            print_view(&view, format)?;
        }
    }

    let view = ToolbarView::from_state(&session.state(), &role).with_channel(session.channel_state());
    session.shutdown().await?;
    if quiet {
        print_view(&view, format)?;
    }
    Ok(())
}
