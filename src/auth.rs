// ABOUTME: Portal login, session validation, and logout over the REST API
// ABOUTME: Produces the SessionContext consumed by the notification components
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Portal authentication
//!
//! The portal uses cookie sessions: `POST api/login` with form credentials
//! answers with the user's `{role, email}` and a `Set-Cookie` header. That
//! cookie authenticates every later REST call and the push channel handshake.

use crate::config::{Credentials, PortalEndpoints};
use crate::context::SessionContext;
use crate::errors::{AppError, AppResult};
use crate::http_client::{cookies_from_response, session_headers};
use crate::models::{Identity, Role};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Body of a successful login
#[derive(Debug, Deserialize)]
struct LoginResponse {
    role: Role,
    email: String,
}

/// Body of `GET api/user`
#[derive(Debug, Deserialize)]
struct CurrentUserResponse {
    role: Role,
    email: String,
    #[serde(default)]
    organization: Option<String>,
}

/// REST authentication client
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: Client,
    endpoints: PortalEndpoints,
}

impl AuthClient {
    /// Create a client for one deployment
    #[must_use]
    pub const fn new(http: Client, endpoints: PortalEndpoints) -> Self {
        Self { http, endpoints }
    }

    /// Log in with username and password
    ///
    /// # Errors
    ///
    /// Returns `AuthInvalid` when the backend rejects the credentials or sets no
    /// session cookie, `ExternalServiceUnavailable` when it cannot be reached
    pub async fn login(&self, credentials: &Credentials) -> AppResult<SessionContext> {
        let url = self.endpoints.login()?;
        debug!(username = %credentials.username, "Logging in to portal");

        let response = self
            .http
            .post(url)
            .form(&[
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(username = %credentials.username, "Portal rejected login");
            return Err(AppError::auth_invalid("Invalid username or password"));
        }
        let response = ensure_success(response, "login").await?;

        let cookie = cookies_from_response(response.headers())
            .ok_or_else(|| AppError::auth_invalid("Login response did not set a session cookie"))?;
        let body: LoginResponse = response.json().await?;

        let identity = Identity::new(body.role, body.email);
        info!(identity = %identity, "Logged in to portal");
        Ok(SessionContext::new(
            identity,
            Some(cookie),
            self.endpoints.clone(),
            self.http.clone(),
        ))
    }

    /// Resume an existing session from its cookie
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` when the cookie no longer names a signed-in user
    pub async fn current_user(&self, cookie: &str) -> AppResult<SessionContext> {
        let url = self.endpoints.current_user()?;
        let response = self
            .http
            .get(url)
            .headers(session_headers(Some(cookie))?)
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(AppError::auth_required());
        }
        let response = ensure_success(response, "current user").await?;
        let body: CurrentUserResponse = response.json().await?;

        let identity = Identity::new(body.role, body.email);
        debug!(identity = %identity, "Resumed portal session");
        Ok(SessionContext::new(
            identity,
            Some(cookie.to_owned()),
            self.endpoints.clone(),
            self.http.clone(),
        )
        .with_organization(body.organization))
    }

    /// End the session on the backend
    ///
    /// # Errors
    ///
    /// Returns `ExternalServiceError` when the backend reports no signed-in user
    pub async fn logout(&self, context: &SessionContext) -> AppResult<()> {
        let url = self.endpoints.logout()?;
        let response = self
            .http
            .post(url)
            .headers(context.headers()?)
            .send()
            .await?;
        ensure_success(response, "logout").await?;
        info!(identity = %context.identity(), "Logged out of portal");
        Ok(())
    }
}

/// Turn a non-2xx response into `ExternalServiceError`, keeping the body for diagnostics
pub(crate) async fn ensure_success(response: Response, operation: &str) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::external_service(
        operation,
        format!("HTTP {}: {}", status.as_u16(), body.trim()),
    ))
}
