// ABOUTME: Lenient parsing of backend notification timestamps into UTC instants
// ABOUTME: Accepts RFC 3339, naive ISO 8601, the space-separated push form, and RFC 2822
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Backend timestamp parsing
//!
//! The snapshot endpoint serializes `created_at` with `isoformat()` (no offset)
//! while push events carry a space-separated local form. Both are naive and are
//! read as UTC; explicit offsets are honoured.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Naive layouts emitted by the backend, tried in order
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a backend timestamp, returning `None` when no known layout matches
#[must_use]
pub fn parse_backend_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// Serde adapter: deserialize a required backend timestamp
///
/// # Errors
///
/// Returns a deserialization error when the value is not a string or matches
/// none of the accepted layouts
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_backend_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unparseable timestamp '{raw}'")))
}

/// Serde adapter: serialize as RFC 3339 with a `Z` suffix
///
/// # Errors
///
/// Propagates serializer failures
pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true))
}
