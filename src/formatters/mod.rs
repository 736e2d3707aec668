// ABOUTME: Presentation projection of the notification store and CLI output formats
// ABOUTME: Renders the toolbar view as JSON or plain text
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Output formatting
//!
//! [`ToolbarView`] is the shape a renderer consumes: badge count, unseen
//! flag, and the two lists with display dates. [`format_output`] serializes
//! any view for the command line.

/// Toolbar view model
pub mod view;

pub use view::{format_notification_date, ToolbarEntry, ToolbarView};

use crate::errors::AppResult;
use serde::Serialize;
use std::fmt;

/// Output serialization format selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

impl OutputFormat {
    /// Parse format from a string parameter (case-insensitive)
    /// Returns `Text` for unrecognized values
    #[must_use]
    pub fn from_str_param(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    /// Format name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Render a value that has both a text and a JSON form
///
/// # Errors
///
/// Returns `SerializationError` if JSON encoding fails
pub fn format_output<T: Serialize + fmt::Display>(data: &T, format: OutputFormat) -> AppResult<String> {
    match format {
        OutputFormat::Text => Ok(data.to_string()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(data)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_param_parsing() {
        assert_eq!(OutputFormat::from_str_param("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_param("yaml"), OutputFormat::Text);
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }
}
