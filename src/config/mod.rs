// ABOUTME: Configuration management module for portal endpoints and client settings
// ABOUTME: Environment-only configuration with typed endpoint construction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//! Configuration module for the notification client
//!
//! - **Environment**: Portal configuration from environment variables
//! - **Endpoints**: REST and push channel URLs derived from the base URL and
//!   deployment sub-path

/// Environment-based configuration
pub mod environment;

/// Endpoint URL construction
pub mod endpoints;

pub use endpoints::PortalEndpoints;
pub use environment::{Credentials, Environment, HttpClientConfig, PortalConfig};
