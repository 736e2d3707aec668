// ABOUTME: Application constants for the notification client organized by concern
// ABOUTME: Backend endpoint paths, push channel event names, and service identifiers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// REST endpoint paths, relative to the deployment sub-path
pub mod endpoints {
    /// Snapshot of both notification partitions
    pub const NOTIFICATIONS: &str = "api/notifications";
    /// Form-encoded dismissal of a single notification
    pub const DISMISS_NOTIFICATION: &str = "api/notifications/dismiss";
    /// Credential login returning role and email
    pub const LOGIN: &str = "api/login";
    /// Current session's user
    pub const CURRENT_USER: &str = "api/user";
    /// Session logout
    pub const LOGOUT: &str = "api/logout";
}

/// Push channel path and event names
pub mod channel {
    /// Socket path appended to the deployment sub-path
    pub const SOCKET_PATH: &str = "socket.io/";
    /// Engine.IO protocol revision spoken by the backend
    pub const ENGINE_IO_VERSION: &str = "4";
    /// Event carrying pushed notification records
    pub const NOTIFICATION_EVENT: &str = "my response";
    /// Event the server emits on connect with undismissed records
    pub const CONNECT_SUMMARY_EVENT: &str = "notifications";
    /// Event asking the backend to start streaming this identity's notifications
    pub const START_LISTENING_EVENT: &str = "start_redis_listener";
}

/// Session cookie handling
pub mod session {
    /// Cookie name issued by the backend's session layer
    pub const COOKIE_NAME: &str = "session";
}

/// Service names used in structured logs
pub mod service_names {
    /// Library and CLI service name
    pub const EQA_NOTIFY: &str = "eqa-notify";
}
