// ABOUTME: Main library entry point for the EQA portal notification client
// ABOUTME: Snapshot loading, live push channel, and two-phase dismissal for the portal toolbar
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # EQA Notify
//!
//! Client-side notification state for the EQA portal toolbar. A signed-in
//! user's notifications are loaded once from the REST API, kept current over
//! a Socket.IO push channel, and dismissed only after the backend confirms.
//!
//! ## Architecture
//!
//! - **Context**: the explicit [`context::SessionContext`] every component receives
//! - **Notifications**: the store, snapshot loader, and dismissal coordinator
//! - **Channel**: the auto-reconnecting push channel and its wire codec
//! - **Toolbar**: one session owning one store, fed through a single event loop
//! - **Formatters**: the view model a renderer consumes
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use eqa_notify::auth::AuthClient;
//! use eqa_notify::config::PortalConfig;
//! use eqa_notify::errors::AppResult;
//! use eqa_notify::http_client::build_client;
//! use eqa_notify::notifications::HttpNotificationBackend;
//! use eqa_notify::toolbar::{ToolbarOptions, ToolbarSession};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = PortalConfig::from_env()?;
//!     let auth = AuthClient::new(build_client(&config.http)?, config.endpoints());
//!     let context = auth.current_user("session=...").await?;
//!
//!     let session = ToolbarSession::start(
//!         context,
//!         Arc::new(HttpNotificationBackend::new()),
//!         ToolbarOptions::default(),
//!     )?;
//!     println!("{} active notifications", session.state().active.len());
//!     session.shutdown().await
//! }
//! ```

pub use eqa_core::{constants, errors, models, timestamp};

/// Portal login and session resumption
pub mod auth;

/// Real-time push channel
pub mod channel;

/// Configuration management
pub mod config;

/// Explicit session context
pub mod context;

/// Toolbar view model and output formats
pub mod formatters;

/// HTTP client construction
pub mod http_client;

/// Structured logging setup
pub mod logging;

/// Notification store, snapshot loading, and dismissal
pub mod notifications;

/// Toolbar session event loop
pub mod toolbar;
