// ABOUTME: Dismissal Coordinator applying dismissals only after the backend confirms them
// ABOUTME: Failures leave the record active and dismissible again
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::backend::NotificationBackend;
use super::store::NotificationStore;
use crate::context::SessionContext;
use crate::errors::AppResult;
use crate::models::NotificationId;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What a confirmed dismissal did to the local store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissOutcome {
    /// The record moved from active to dismissed
    Moved,
    /// The backend confirmed, but the record was not active locally
    NotActive,
    /// The backend confirmed after the owning session ended; nothing was applied
    Discarded,
}

/// Two-phase dismissal: backend first, then the store
#[derive(Clone)]
pub struct DismissalCoordinator {
    backend: Arc<dyn NotificationBackend>,
}

impl DismissalCoordinator {
    /// Create a coordinator over a backend
    #[must_use]
    pub fn new(backend: Arc<dyn NotificationBackend>) -> Self {
        Self { backend }
    }

    /// Phase one: ask the backend to dismiss `id`
    ///
    /// # Errors
    ///
    /// Propagates the backend failure
    pub async fn request(&self, context: &SessionContext, id: &NotificationId) -> AppResult<()> {
        self.backend.dismiss(context, id).await.inspect_err(|e| {
            warn!(notification_id = %id, error = %e, "Dismissal rejected, record stays active");
        })?;
        debug!(notification_id = %id, "Backend confirmed dismissal");
        Ok(())
    }

    /// Phase two: apply a confirmed dismissal to the store
    pub fn apply(store: &mut NotificationStore, id: &NotificationId) -> DismissOutcome {
        if store.dismiss(id) {
            info!(notification_id = %id, "Notification dismissed");
            DismissOutcome::Moved
        } else {
            debug!(notification_id = %id, "Confirmed dismissal for a record that is not active");
            DismissOutcome::NotActive
        }
    }

    /// Both phases against a store the caller owns
    ///
    /// # Errors
    ///
    /// Propagates the backend failure, in which case the store is not touched
    pub async fn dismiss(
        &self,
        context: &SessionContext,
        store: &mut NotificationStore,
        id: &NotificationId,
    ) -> AppResult<DismissOutcome> {
        self.request(context, id).await?;
        Ok(Self::apply(store, id))
    }
}
