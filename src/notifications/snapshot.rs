// ABOUTME: Snapshot Loader fetching the authoritative notification state for a session
// ABOUTME: Skips empty identities, sorts both partitions, and leaves the store untouched on failure
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::backend::NotificationBackend;
use super::store::{sort_newest_first, NotificationStore};
use crate::context::SessionContext;
use crate::errors::AppResult;
use crate::models::NotificationRecord;
use std::sync::Arc;
use tracing::{info, warn};

/// Sorted result of one snapshot load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedSnapshot {
    /// Active records, newest first
    pub active: Vec<NotificationRecord>,
    /// Dismissed records, newest first
    pub dismissed: Vec<NotificationRecord>,
}

impl LoadedSnapshot {
    /// Install into a store, replacing its content
    pub fn install(self, store: &mut NotificationStore) {
        store.seed(self.active, self.dismissed);
    }
}

/// Fetches the full notification state from the backend
#[derive(Clone)]
pub struct SnapshotLoader {
    backend: Arc<dyn NotificationBackend>,
}

impl SnapshotLoader {
    /// Create a loader over a backend
    #[must_use]
    pub fn new(backend: Arc<dyn NotificationBackend>) -> Self {
        Self { backend }
    }

    /// Fetch and sort the snapshot for the session's identity
    ///
    /// Returns `Ok(None)` without contacting the backend when the identity is
    /// empty.
    ///
    /// # Errors
    ///
    /// Propagates the backend failure; nothing is retried
    pub async fn load(&self, context: &SessionContext) -> AppResult<Option<LoadedSnapshot>> {
        let identity = context.identity();
        if identity.is_empty() {
            warn!(
                session_id = %context.session_id(),
                "Skipping notification snapshot: identity has no email"
            );
            return Ok(None);
        }

        let snapshot = self.backend.fetch_snapshot(context).await.inspect_err(|e| {
            warn!(identity = %identity, error = %e, "Notification snapshot failed");
        })?;

        let mut active = snapshot.undismissed;
        let mut dismissed = snapshot.dismissed;
        sort_newest_first(&mut active);
        sort_newest_first(&mut dismissed);

        info!(
            identity = %identity,
            active = active.len(),
            dismissed = dismissed.len(),
            "Loaded notification snapshot"
        );
        Ok(Some(LoadedSnapshot { active, dismissed }))
    }

    /// Load and install into `store`
    ///
    /// Returns whether the store was replaced. On error or skip the store is
    /// left exactly as it was.
    ///
    /// # Errors
    ///
    /// Propagates the backend failure
    pub async fn load_into(
        &self,
        context: &SessionContext,
        store: &mut NotificationStore,
    ) -> AppResult<bool> {
        match self.load(context).await? {
            Some(snapshot) => {
                snapshot.install(store);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
