// ABOUTME: Authenticated portal session shared by the loader, channel, and dismissal components
// ABOUTME: Holds the {role, email} identity, session cookie, resolved endpoints, and HTTP client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::config::PortalEndpoints;
use crate::errors::AppResult;
use crate::http_client::session_headers;
use crate::models::Identity;
use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use reqwest::Client;
use std::fmt;
use uuid::Uuid;

/// One authenticated user's view of a portal deployment
#[derive(Clone)]
pub struct SessionContext {
    session_id: Uuid,
    identity: Identity,
    organization: Option<String>,
    cookie: Option<String>,
    endpoints: PortalEndpoints,
    http: Client,
    established_at: DateTime<Utc>,
}

impl SessionContext {
    /// Create a context for an identity the caller already knows
    #[must_use]
    pub fn new(
        identity: Identity,
        cookie: Option<String>,
        endpoints: PortalEndpoints,
        http: Client,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            identity,
            organization: None,
            cookie,
            endpoints,
            http,
            established_at: Utc::now(),
        }
    }

    /// Attach the user's organization
    #[must_use]
    pub fn with_organization(mut self, organization: Option<String>) -> Self {
        self.organization = organization;
        self
    }

    /// Local id used to correlate log lines of this session
    #[must_use]
    pub const fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// `{role, email}` of the signed-in user
    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Organization reported at login, if any
    #[must_use]
    pub fn organization(&self) -> Option<&str> {
        self.organization.as_deref()
    }

    /// Raw `Cookie` header value for credentialed requests
    #[must_use]
    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    /// Endpoint URLs of the deployment
    #[must_use]
    pub const fn endpoints(&self) -> &PortalEndpoints {
        &self.endpoints
    }

    /// Shared HTTP client
    #[must_use]
    pub const fn http(&self) -> &Client {
        &self.http
    }

    /// When this context was created
    #[must_use]
    pub const fn established_at(&self) -> DateTime<Utc> {
        self.established_at
    }

    /// Headers for a credentialed request
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the stored cookie is not a valid header value
    pub fn headers(&self) -> AppResult<HeaderMap> {
        session_headers(self.cookie())
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("session_id", &self.session_id)
            .field("identity", &self.identity)
            .field("organization", &self.organization)
            .field("cookie", &self.cookie.as_ref().map(|_| "[REDACTED]"))
            .field("endpoints", &self.endpoints)
            .field("established_at", &self.established_at)
            .finish_non_exhaustive()
    }
}
