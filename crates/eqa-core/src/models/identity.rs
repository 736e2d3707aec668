// ABOUTME: Caller identity (role plus email) used to authenticate and route push events
// ABOUTME: Role parsing keeps unknown backend roles instead of rejecting them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;

/// Portal role as reported by the login endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Distribution manager with access to the admin dashboard
    Superuser,
    /// Participating laboratory
    #[default]
    User,
    /// Any role this client does not know about
    Other(String),
}

impl Role {
    /// Wire representation
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Superuser => "superuser",
            Self::User => "user",
            Self::Other(raw) => raw,
        }
    }

    /// Whether this role may open the distribution manager
    #[must_use]
    pub const fn is_superuser(&self) -> bool {
        matches!(self, Self::Superuser)
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "superuser" => Self::Superuser,
            "user" => Self::User,
            _ => Self::Other(raw),
        }
    }
}

impl From<&str> for Role {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_owned())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `{role, email}` pair that routes push events to the right listener
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Portal role
    pub role: Role,
    /// Account email, the backend's user key
    pub email: String,
}

impl Identity {
    /// Create an identity
    pub fn new(role: impl Into<Role>, email: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            email: email.into(),
        }
    }

    /// An identity without an email cannot be routed and must not load a snapshot
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.email.trim().is_empty()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.email, self.role)
    }
}
