// ABOUTME: Notification record, identifier, and snapshot payload models
// ABOUTME: Serde mappings match the backend's snapshot and push event JSON shapes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Opaque notification identifier
///
/// The backend issues integer primary keys, but the contract only promises an
/// opaque value that is stable across snapshot and push delivery. Integers and
/// strings never compare equal to each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NotificationId {
    /// Numeric identifier
    Integer(i64),
    /// Textual identifier
    Text(String),
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for NotificationId {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for NotificationId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl FromStr for NotificationId {
    type Err = Infallible;

    /// Numeric text becomes [`NotificationId::Integer`], anything else is kept verbatim
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(raw
            .parse::<i64>()
            .map_or_else(|_| Self::Text(raw.to_owned()), Self::Integer))
    }
}

/// A single notification as delivered by snapshot or push
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// Stable key used for dismissal
    pub id: NotificationId,
    /// Human-readable text, immutable once created
    pub message: String,
    /// Origin-server creation time
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl NotificationRecord {
    /// Create a record
    pub fn new(
        id: impl Into<NotificationId>,
        message: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            created_at,
        }
    }
}

/// Full notification state for the session's user, as returned by `GET notifications`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSnapshot {
    /// Notifications not yet dismissed
    #[serde(default)]
    pub undismissed: Vec<NotificationRecord>,
    /// Notifications the user already acknowledged
    #[serde(default)]
    pub dismissed: Vec<NotificationRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_accepts_integer_and_string() {
        let int_id: NotificationId = serde_json::from_value(json!(17)).unwrap();
        let text_id: NotificationId = serde_json::from_value(json!("n-17")).unwrap();
        assert_eq!(int_id, NotificationId::Integer(17));
        assert_eq!(text_id, NotificationId::Text("n-17".to_owned()));
        assert_ne!(int_id, NotificationId::Text("17".to_owned()));
    }

    #[test]
    fn test_id_from_str_prefers_integer() {
        assert_eq!("42".parse::<NotificationId>().unwrap(), NotificationId::Integer(42));
        assert_eq!(
            "abc".parse::<NotificationId>().unwrap(),
            NotificationId::Text("abc".to_owned())
        );
    }

    #[test]
    fn test_record_ignores_extra_backend_fields() {
        let record: NotificationRecord = serde_json::from_value(json!({
            "id": 3,
            "user_email": "lab@example.org",
            "message": "A new upload of sample RSV-01",
            "is_dismissed": false,
            "created_at": "2024-01-01T10:00:00.123456"
        }))
        .unwrap();
        assert_eq!(record.id, NotificationId::Integer(3));
        assert_eq!(record.message, "A new upload of sample RSV-01");
    }

    #[test]
    fn test_record_without_timestamp_is_rejected() {
        let result = serde_json::from_value::<NotificationRecord>(json!({
            "id": 3,
            "message": "no time"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_snapshot_partitions_default_to_empty() {
        let snapshot: NotificationSnapshot = serde_json::from_value(json!({})).unwrap();
        assert!(snapshot.undismissed.is_empty());
        assert!(snapshot.dismissed.is_empty());
    }
}
