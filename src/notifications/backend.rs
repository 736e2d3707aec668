// ABOUTME: Notification REST backend abstraction and its reqwest implementation
// ABOUTME: Fetches the snapshot and submits dismissals with the session cookie
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::auth::ensure_success;
use crate::context::SessionContext;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::{NotificationId, NotificationSnapshot};
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

/// REST operations the notification components depend on
#[async_trait]
pub trait NotificationBackend: Send + Sync {
    /// `GET notifications`: both partitions for the session's user, unsorted
    ///
    /// # Errors
    ///
    /// Any transport failure, non-success status, or unparseable body
    async fn fetch_snapshot(&self, context: &SessionContext) -> AppResult<NotificationSnapshot>;

    /// `POST notifications/dismiss` with form field `id`
    ///
    /// # Errors
    ///
    /// Any transport failure or non-success status
    async fn dismiss(&self, context: &SessionContext, id: &NotificationId) -> AppResult<()>;
}

/// Backend reached over HTTP with the session's client and cookie
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpNotificationBackend;

impl HttpNotificationBackend {
    /// Create the HTTP backend
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationBackend for HttpNotificationBackend {
    async fn fetch_snapshot(&self, context: &SessionContext) -> AppResult<NotificationSnapshot> {
        let url = context.endpoints().notifications()?;
        debug!(session_id = %context.session_id(), url = %url, "Fetching notification snapshot");

        let response = context
            .http()
            .get(url)
            .headers(context.headers()?)
            .send()
            .await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(AppError::auth_required());
        }
        let response = ensure_success(response, "notifications").await?;

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            AppError::new(
                ErrorCode::SerializationError,
                "Notification snapshot is not in the expected shape",
            )
            .with_source(e)
        })
    }

    async fn dismiss(&self, context: &SessionContext, id: &NotificationId) -> AppResult<()> {
        let url = context.endpoints().dismiss()?;
        let id_field = id.to_string();
        debug!(session_id = %context.session_id(), notification_id = %id, "Submitting dismissal");

        let response = context
            .http()
            .post(url)
            .headers(context.headers()?)
            .form(&[("id", id_field.as_str())])
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(AppError::auth_required()),
            StatusCode::NOT_FOUND => {
                Err(AppError::not_found(format!("Notification {id}")).with_resource_id(id_field))
            }
            _ => ensure_success(response, "dismiss")
                .await
                .map(|_| ())
                .map_err(|e| e.with_resource_id(id_field)),
        }
    }
}
