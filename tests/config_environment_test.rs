// ABOUTME: Tests for loading portal configuration from EQA_* environment variables
// ABOUTME: Runs serially because every test mutates the process environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use eqa_notify::config::environment::{
    DEFAULT_BASE_URL, DEFAULT_HTTP_CONNECT_TIMEOUT_SECS, DEFAULT_HTTP_TIMEOUT_SECS,
};
use eqa_notify::config::{Environment, PortalConfig};
use eqa_notify::errors::ErrorCode;
use serial_test::serial;
use std::env;

const VARIABLES: &[&str] = &[
    "EQA_BASE_URL",
    "EQA_SUBDIRECTORY",
    "EQA_HTTP_TIMEOUT_SECS",
    "EQA_HTTP_CONNECT_TIMEOUT_SECS",
    "EQA_USERNAME",
    "EQA_PASSWORD",
    "EQA_SESSION_COOKIE",
    "ENVIRONMENT",
];

fn clear_env() {
    for variable in VARIABLES {
        env::remove_var(variable);
    }
}

#[test]
#[serial]
fn test_defaults_when_nothing_is_set() {
    clear_env();

    let config = PortalConfig::from_env().unwrap();

    assert_eq!(config.base_url.as_str(), format!("{DEFAULT_BASE_URL}/"));
    assert_eq!(config.subdirectory, "");
    assert_eq!(config.http.timeout_secs, DEFAULT_HTTP_TIMEOUT_SECS);
    assert_eq!(config.http.connect_timeout_secs, DEFAULT_HTTP_CONNECT_TIMEOUT_SECS);
    assert!(config.credentials.is_none());
    assert!(config.session_cookie.is_none());
    assert_eq!(config.environment, Environment::Development);
}

#[test]
#[serial]
fn test_full_environment_is_read() {
    clear_env();
    env::set_var("EQA_BASE_URL", "https://eqa.example.org");
    env::set_var("EQA_SUBDIRECTORY", "/rsv/");
    env::set_var("EQA_HTTP_TIMEOUT_SECS", "5");
    env::set_var("EQA_USERNAME", "lab");
    env::set_var("EQA_PASSWORD", "secret");
    env::set_var("EQA_SESSION_COOKIE", "session=abc");
    env::set_var("ENVIRONMENT", "production");

    let config = PortalConfig::from_env().unwrap();

    assert_eq!(config.base_url.host_str(), Some("eqa.example.org"));
    assert_eq!(config.subdirectory, "/rsv");
    assert_eq!(config.http.timeout_secs, 5);
    assert_eq!(config.credentials.as_ref().unwrap().username, "lab");
    assert_eq!(config.session_cookie.as_deref(), Some("session=abc"));
    assert!(config.environment.is_production());
    assert_eq!(
        config.endpoints().notifications().unwrap().as_str(),
        "https://eqa.example.org/rsv/api/notifications"
    );

    clear_env();
}

#[test]
#[serial]
fn test_username_without_password_is_missing_config() {
    clear_env();
    env::set_var("EQA_USERNAME", "lab");

    let error = PortalConfig::from_env().unwrap_err();

    assert_eq!(error.code, ErrorCode::ConfigMissing);
    assert!(error.message.contains("EQA_PASSWORD"));
    clear_env();
}

#[test]
#[serial]
fn test_password_without_username_is_missing_config() {
    clear_env();
    env::set_var("EQA_PASSWORD", "secret");

    let error = PortalConfig::from_env().unwrap_err();

    assert_eq!(error.code, ErrorCode::ConfigMissing);
    assert!(error.message.contains("EQA_USERNAME"));
    clear_env();
}

#[test]
#[serial]
fn test_blank_credentials_count_as_unset() {
    clear_env();
    env::set_var("EQA_USERNAME", "  ");
    env::set_var("EQA_PASSWORD", "");

    let config = PortalConfig::from_env().unwrap();

    assert!(config.credentials.is_none());
    clear_env();
}

#[test]
#[serial]
fn test_zero_timeout_is_invalid() {
    clear_env();
    env::set_var("EQA_HTTP_CONNECT_TIMEOUT_SECS", "0");

    let error = PortalConfig::from_env().unwrap_err();

    assert_eq!(error.code, ErrorCode::ConfigInvalid);
    assert!(error.message.contains("EQA_HTTP_CONNECT_TIMEOUT_SECS"));
    clear_env();
}

#[test]
#[serial]
fn test_unparseable_timeout_names_variable() {
    clear_env();
    env::set_var("EQA_HTTP_TIMEOUT_SECS", "soon");

    let error = PortalConfig::from_env().unwrap_err();

    assert_eq!(error.code, ErrorCode::ConfigInvalid);
    assert!(error.message.contains("EQA_HTTP_TIMEOUT_SECS"));
    assert!(error.message.contains("soon"));
    clear_env();
}

#[test]
#[serial]
fn test_non_http_base_url_is_rejected() {
    clear_env();
    env::set_var("EQA_BASE_URL", "ws://eqa.example.org");

    let error = PortalConfig::from_env().unwrap_err();

    assert_eq!(error.code, ErrorCode::ConfigInvalid);
    clear_env();
}

#[test]
fn test_with_subdirectory_normalizes() {
    let config = PortalConfig::new("http://localhost:8000")
        .unwrap()
        .with_subdirectory("eqa/");

    assert_eq!(config.subdirectory, "/eqa");
    assert_eq!(
        config.endpoints().login().unwrap().as_str(),
        "http://localhost:8000/eqa/api/login"
    );
}
