// ABOUTME: In-memory notification store with active and dismissed partitions
// ABOUTME: Enforces message de-duplication, disjoint partitions, and newest-first ordering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Notification Store
//!
//! Holds the two partitions the toolbar renders. Every mutation keeps these
//! invariants:
//!
//! - no id appears in both partitions
//! - no two active records share a `message`
//! - each partition is ordered by `created_at`, newest first, with ties kept
//!   in insertion order
//! - a dismissed record never returns to the active partition

use crate::models::{NotificationId, NotificationRecord};
use serde::Serialize;
use std::collections::HashSet;

/// Result of offering a pushed record to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Added to the active partition and the unseen flag raised
    Inserted,
    /// An active record already carries the same message
    DuplicateMessage,
    /// The id is already known, active or dismissed
    KnownId,
}

impl InsertOutcome {
    /// Whether the store changed
    #[must_use]
    pub const fn is_inserted(self) -> bool {
        matches!(self, Self::Inserted)
    }
}

/// Read-only copy of the store, published to observers after each mutation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreSnapshot {
    /// Active records, newest first
    pub active: Vec<NotificationRecord>,
    /// Dismissed records, newest first
    pub dismissed: Vec<NotificationRecord>,
    /// A push arrived since the user last opened the dropdown
    pub has_unseen: bool,
    /// Incremented on every mutation
    pub revision: u64,
}

/// Active and dismissed notifications for one session
#[derive(Debug, Default)]
pub struct NotificationStore {
    active: Vec<NotificationRecord>,
    dismissed: Vec<NotificationRecord>,
    has_unseen: bool,
    revision: u64,
}

impl NotificationStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace both partitions with a freshly loaded snapshot
    ///
    /// Each partition is sorted newest first. An id present in both inputs is
    /// kept only as dismissed, and active records repeating an earlier (newer)
    /// active message are dropped. The unseen flag is left as it was.
    pub fn seed(&mut self, active: Vec<NotificationRecord>, dismissed: Vec<NotificationRecord>) {
        let mut dismissed = dismissed;
        sort_newest_first(&mut dismissed);
        let dismissed_ids: HashSet<&NotificationId> = dismissed.iter().map(|r| &r.id).collect();

        let mut active = active;
        sort_newest_first(&mut active);
        let mut seen_messages = HashSet::new();
        let active: Vec<NotificationRecord> = active
            .into_iter()
            .filter(|record| !dismissed_ids.contains(&record.id))
            .filter(|record| seen_messages.insert(record.message.clone()))
            .collect();

        self.active = active;
        self.dismissed = dismissed;
        self.bump();
    }

    /// Offer a pushed record
    ///
    /// Inserted only if no active record carries the same message and the id
    /// is not already known; a successful insert raises the unseen flag.
    pub fn insert(&mut self, record: NotificationRecord) -> InsertOutcome {
        if self.active.iter().any(|r| r.message == record.message) {
            return InsertOutcome::DuplicateMessage;
        }
        if self.contains_id(&record.id) {
            return InsertOutcome::KnownId;
        }
        self.active.push(record);
        sort_newest_first(&mut self.active);
        self.has_unseen = true;
        self.bump();
        InsertOutcome::Inserted
    }

    /// Move an active record to the dismissed partition
    ///
    /// Returns `false`, leaving the store untouched, when no active record has
    /// this id.
    pub fn dismiss(&mut self, id: &NotificationId) -> bool {
        let Some(position) = self.active.iter().position(|r| &r.id == id) else {
            return false;
        };
        let record = self.active.remove(position);
        self.dismissed.push(record);
        sort_newest_first(&mut self.dismissed);
        self.bump();
        true
    }

    /// Lower the unseen flag, e.g. when the dropdown is opened
    pub fn clear_unseen_flag(&mut self) {
        if self.has_unseen {
            self.has_unseen = false;
            self.bump();
        }
    }

    /// Active records, newest first
    #[must_use]
    pub fn active(&self) -> &[NotificationRecord] {
        &self.active
    }

    /// Dismissed records, newest first
    #[must_use]
    pub fn dismissed(&self) -> &[NotificationRecord] {
        &self.dismissed
    }

    /// Whether a push arrived since the flag was last cleared
    #[must_use]
    pub const fn has_unseen(&self) -> bool {
        self.has_unseen
    }

    /// Mutation counter
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether either partition holds this id
    #[must_use]
    pub fn contains_id(&self, id: &NotificationId) -> bool {
        self.active.iter().chain(&self.dismissed).any(|r| &r.id == id)
    }

    /// Copy of the current state
    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            active: self.active.clone(),
            dismissed: self.dismissed.clone(),
            has_unseen: self.has_unseen,
            revision: self.revision,
        }
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

/// Stable sort by `created_at`, newest first
pub(crate) fn sort_newest_first(records: &mut [NotificationRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
