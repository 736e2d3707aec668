// ABOUTME: HTTP client construction with configured timeouts for portal REST calls
// ABOUTME: Builds reqwest clients and the session cookie header used on every request
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::config::HttpClientConfig;
use crate::constants::service_names;
use crate::errors::{AppError, AppResult};
use reqwest::header::{HeaderMap, HeaderValue, COOKIE, SET_COOKIE};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Build an HTTP client with the configured timeouts
///
/// # Errors
///
/// Returns `InternalError` if the TLS backend cannot be initialized
pub fn build_client(config: &HttpClientConfig) -> AppResult<Client> {
    ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .user_agent(concat!("eqa-notify/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| {
            AppError::internal(format!(
                "Failed to build HTTP client for {}",
                service_names::EQA_NOTIFY
            ))
            .with_source(e)
        })
}

/// `Cookie` header carrying the session, for credentialed requests
///
/// # Errors
///
/// Returns `InvalidInput` if the cookie contains characters not allowed in a header
pub fn cookie_header(cookie: &str) -> AppResult<HeaderValue> {
    HeaderValue::from_str(cookie)
        .map_err(|e| AppError::invalid_input("Session cookie is not a valid header value").with_source(e))
}

/// Collect `name=value` pairs from every `Set-Cookie` header into a `Cookie` header value
///
/// Attributes such as `Path` or `HttpOnly` are dropped. Returns `None` when the
/// response set no cookies.
#[must_use]
pub fn cookies_from_response(headers: &HeaderMap) -> Option<String> {
    let pairs: Vec<&str> = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::trim)
        .filter(|pair| pair.contains('='))
        .collect();

    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}

/// Headers for a credentialed request
///
/// # Errors
///
/// Returns `InvalidInput` if the cookie is not a valid header value
pub fn session_headers(cookie: Option<&str>) -> AppResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    if let Some(cookie) = cookie {
        headers.insert(COOKIE, cookie_header(cookie)?);
    }
    Ok(headers)
}
