// ABOUTME: Notification store plus the components that feed and drain it
// ABOUTME: Snapshot loading, backend access, and two-phase dismissal
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// REST backend trait and HTTP implementation
pub mod backend;
/// Two-phase dismissal
pub mod dismissal;
/// Snapshot loading
pub mod snapshot;
/// Partitioned in-memory store
pub mod store;

pub use backend::{HttpNotificationBackend, NotificationBackend};
pub use dismissal::{DismissOutcome, DismissalCoordinator};
pub use snapshot::{LoadedSnapshot, SnapshotLoader};
pub use store::{InsertOutcome, NotificationStore, StoreSnapshot};
