// ABOUTME: Typed construction of REST and push channel URLs for a portal deployment
// ABOUTME: Applies the deployment sub-path and switches the socket URL to ws/wss
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::{channel, endpoints};
use crate::errors::{AppError, AppResult};
use crate::models::Identity;
use url::Url;

/// Resolved endpoint URLs for one deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalEndpoints {
    /// `{origin}{subdirectory}/`, always with a trailing slash
    root: Url,
}

impl PortalEndpoints {
    /// Resolve the deployment root from an origin and a normalized sub-path
    #[must_use]
    pub fn new(base_url: &Url, subdirectory: &str) -> Self {
        let mut root = base_url.clone();
        root.set_query(None);
        root.set_fragment(None);
        let path = format!("{subdirectory}/");
        root.set_path(&path);
        Self { root }
    }

    /// Deployment root URL
    #[must_use]
    pub const fn root(&self) -> &Url {
        &self.root
    }

    /// `GET` snapshot endpoint
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the URL cannot be joined
    pub fn notifications(&self) -> AppResult<Url> {
        Ok(self.root.join(endpoints::NOTIFICATIONS)?)
    }

    /// `POST` dismissal endpoint
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the URL cannot be joined
    pub fn dismiss(&self) -> AppResult<Url> {
        Ok(self.root.join(endpoints::DISMISS_NOTIFICATION)?)
    }

    /// `POST` login endpoint
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the URL cannot be joined
    pub fn login(&self) -> AppResult<Url> {
        Ok(self.root.join(endpoints::LOGIN)?)
    }

    /// `GET` current user endpoint
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the URL cannot be joined
    pub fn current_user(&self) -> AppResult<Url> {
        Ok(self.root.join(endpoints::CURRENT_USER)?)
    }

    /// `POST` logout endpoint
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the URL cannot be joined
    pub fn logout(&self) -> AppResult<Url> {
        Ok(self.root.join(endpoints::LOGOUT)?)
    }

    /// Push channel URL tagged with the caller's identity
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the URL cannot be joined or converted to a
    /// WebSocket scheme
    pub fn socket(&self, identity: &Identity) -> AppResult<Url> {
        let mut url = self.root.join(channel::SOCKET_PATH)?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme).map_err(|()| {
            AppError::config_invalid(format!("Cannot derive WebSocket URL from {}", self.root))
        })?;
        url.query_pairs_mut()
            .append_pair("EIO", channel::ENGINE_IO_VERSION)
            .append_pair("transport", "websocket")
            .append_pair("role", identity.role.as_str())
            .append_pair("email", &identity.email);
        Ok(url)
    }
}
