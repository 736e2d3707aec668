// ABOUTME: Core types and constants for the EQA portal notification client
// ABOUTME: Foundation crate with error handling, notification models, and timestamp parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # EQA Core
//!
//! Foundation crate shared by the notification client library and CLI. It is
//! designed to change infrequently, enabling incremental compilation benefits
//! in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **models**: Notification records, snapshots, and caller identity
//! - **timestamp**: Lenient backend timestamp parsing
//! - **constants**: Endpoint paths and push channel event names

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants organized by concern
pub mod constants;

/// Notification and identity models
pub mod models;

/// Backend timestamp parsing and serde adapters
pub mod timestamp;
