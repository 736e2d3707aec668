// ABOUTME: Toolbar view model derived from store state for rendering
// ABOUTME: Computes badge count, unseen flag, admin link visibility, and display dates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::channel::ChannelState;
use crate::models::{NotificationId, NotificationRecord, Role};
use crate::notifications::StoreSnapshot;
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;
use std::fmt;

/// `Jan 1, 10:00 AM` in the given time zone
pub fn format_notification_date<Tz>(created_at: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    created_at.with_timezone(tz).format("%b %-d, %I:%M %p").to_string()
}

/// One row of the dropdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolbarEntry {
    /// Id passed back to dismiss
    pub id: NotificationId,
    /// Notification text
    pub message: String,
    /// Display date
    pub date: String,
    /// Whether the row offers a dismiss action
    pub dismissible: bool,
}

/// Everything the toolbar renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolbarView {
    /// Number on the bell; `None` hides the badge
    pub badge_count: Option<usize>,
    /// Bell highlight for unseen pushes
    pub unseen: bool,
    /// Active rows, newest first
    pub active: Vec<ToolbarEntry>,
    /// Dismissed rows, newest first
    pub dismissed: Vec<ToolbarEntry>,
    /// Admin navigation is shown to superusers only
    pub show_admin_link: bool,
    /// Push channel state, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<ChannelState>,
}

impl ToolbarView {
    /// Project store state for a role, with dates in local time
    #[must_use]
    pub fn from_state(state: &StoreSnapshot, role: &Role) -> Self {
        Self::from_state_in(state, role, &Local)
    }

    /// Project store state for a role, with dates in `tz`
    pub fn from_state_in<Tz>(state: &StoreSnapshot, role: &Role, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let entry = |record: &NotificationRecord, dismissible: bool| ToolbarEntry {
            id: record.id.clone(),
            message: record.message.clone(),
            date: format_notification_date(&record.created_at, tz),
            dismissible,
        };

        Self {
            badge_count: (!state.active.is_empty()).then_some(state.active.len()),
            unseen: state.has_unseen,
            active: state.active.iter().map(|r| entry(r, true)).collect(),
            dismissed: state.dismissed.iter().map(|r| entry(r, false)).collect(),
            show_admin_link: role.is_superuser(),
            channel: None,
        }
    }

    /// Attach the push channel state
    #[must_use]
    pub const fn with_channel(mut self, channel: ChannelState) -> Self {
        self.channel = Some(channel);
        self
    }
}

impl fmt::Display for ToolbarView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bell = if self.unseen { "(!)" } else { "" };
        match self.badge_count {
            Some(count) => writeln!(f, "Notifications [{count}]{bell}")?,
            None => writeln!(f, "Notifications{bell}")?,
        }
        if let Some(channel) = self.channel {
            writeln!(f, "  channel: {channel}")?;
        }
        for entry in &self.active {
            writeln!(f, "  #{:<6} {:<16} {}", entry.id.to_string(), entry.date, entry.message)?;
        }
        if !self.dismissed.is_empty() {
            writeln!(f, "Dismissed")?;
            for entry in &self.dismissed {
                writeln!(f, "  #{:<6} {:<16} {}", entry.id.to_string(), entry.date, entry.message)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> StoreSnapshot {
        StoreSnapshot {
            active: vec![NotificationRecord::new(
                2,
                "B",
                Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap(),
            )],
            dismissed: vec![NotificationRecord::new(
                1,
                "A",
                Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
            )],
            has_unseen: true,
            revision: 3,
        }
    }

    #[test]
    fn test_date_format_follows_time_zone() {
        let when = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 0).unwrap();
        assert_eq!(format_notification_date(&when, &Utc), "Mar 5, 02:07 PM");

        let tokyo = chrono::FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(format_notification_date(&when, &tokyo), "Mar 5, 11:07 PM");
    }

    #[test]
    fn test_view_projection() {
        let view = ToolbarView::from_state_in(&state(), &Role::User, &Utc);
        assert_eq!(view.badge_count, Some(1));
        assert!(view.unseen);
        assert!(view.active[0].dismissible);
        assert!(!view.dismissed[0].dismissible);
        assert_eq!(view.dismissed[0].date, "Jan 1, 10:00 AM");
        assert!(!view.show_admin_link);
    }

    #[test]
    fn test_empty_store_hides_badge_and_superuser_sees_admin_link() {
        let view = ToolbarView::from_state_in(&StoreSnapshot::default(), &Role::Superuser, &Utc);
        assert_eq!(view.badge_count, None);
        assert!(view.show_admin_link);
        assert!(view.to_string().starts_with("Notifications\n"));
    }
}
