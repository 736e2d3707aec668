// ABOUTME: Explicit session context passed to every notification component
// ABOUTME: Carries identity, session cookie, endpoints, and the shared HTTP client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Session context
//!
//! The Snapshot Loader, Push Channel Client, and Dismissal Coordinator never
//! read identity or credentials from process-wide state. Each receives a
//! [`SessionContext`] describing the authenticated user it acts for.

pub mod session;

pub use session::SessionContext;
