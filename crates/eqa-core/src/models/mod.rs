// ABOUTME: Domain models shared by the notification client components
// ABOUTME: Re-exports notification records, snapshots, and caller identity types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Notification records and snapshot payloads
pub mod notification;

/// Caller identity used to route push events
pub mod identity;

pub use identity::{Identity, Role};
pub use notification::{NotificationId, NotificationRecord, NotificationSnapshot};
