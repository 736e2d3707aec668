// ABOUTME: Shared test utilities and fixtures for notification client integration tests
// ABOUTME: Provides logging setup, record fixtures, a scripted backend, and a fake Socket.IO server
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
//! Shared test utilities for `eqa_notify`

use async_trait::async_trait;
use axum::extract::{Form, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response as HttpResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use eqa_notify::config::PortalEndpoints;
use eqa_notify::context::SessionContext;
use eqa_notify::errors::{AppError, AppResult};
use eqa_notify::models::{Identity, NotificationId, NotificationRecord, NotificationSnapshot};
use eqa_notify::notifications::NotificationBackend;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, Notify};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_hdr_async, WebSocketStream};
use url::Url;

static INIT_LOGGER: Once = Once::new();

/// Generous upper bound for anything a test waits on
pub const WAIT: Duration = Duration::from_secs(5);

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Parse an RFC 3339 timestamp
pub fn ts(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
}

/// Record with an integer id
pub fn record(id: i64, message: &str, created_at: &str) -> NotificationRecord {
    NotificationRecord::new(id, message, ts(created_at))
}

/// Messages of a partition, in order
pub fn messages(records: &[NotificationRecord]) -> Vec<String> {
    records.iter().map(|r| r.message.clone()).collect()
}

/// Endpoints rooted at `base`
pub fn endpoints(base: &str) -> PortalEndpoints {
    PortalEndpoints::new(&Url::parse(base).unwrap(), "")
}

/// Session for `email` against `base`
pub fn session_at(base: &str, role: &str, email: &str) -> SessionContext {
    SessionContext::new(
        Identity::new(role, email),
        Some("session=test-cookie".to_owned()),
        endpoints(base),
        reqwest::Client::new(),
    )
}

/// Session against an address nothing listens on, for backends that never touch the network
pub fn test_session(email: &str) -> SessionContext {
    session_at("http://127.0.0.1:9", "user", email)
}

/// Scripted in-memory backend
#[derive(Default)]
pub struct MockBackend {
    snapshot: Mutex<NotificationSnapshot>,
    fail_fetch: AtomicBool,
    fail_dismiss: AtomicBool,
    fetch_gate: Mutex<Option<Arc<Notify>>>,
    dismiss_gate: Mutex<Option<Arc<Notify>>>,
    pub fetch_calls: AtomicUsize,
    pub fetched_for: Mutex<Vec<String>>,
    pub dismissed: Mutex<Vec<NotificationId>>,
}

impl MockBackend {
    pub fn with_snapshot(active: Vec<NotificationRecord>, dismissed: Vec<NotificationRecord>) -> Self {
        let backend = Self::default();
        backend.set_snapshot(active, dismissed);
        backend
    }

    pub fn set_snapshot(&self, active: Vec<NotificationRecord>, dismissed: Vec<NotificationRecord>) {
        *self.snapshot.lock().unwrap() = NotificationSnapshot {
            undismissed: active,
            dismissed,
        };
    }

    pub fn fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn fail_dismiss(&self, fail: bool) {
        self.fail_dismiss.store(fail, Ordering::SeqCst);
    }

    /// Hold every fetch until the returned gate is notified
    pub fn gate_fetch(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.fetch_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Hold every dismissal until the returned gate is notified
    pub fn gate_dismiss(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.dismiss_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationBackend for MockBackend {
    async fn fetch_snapshot(&self, context: &SessionContext) -> AppResult<NotificationSnapshot> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.fetched_for
            .lock()
            .unwrap()
            .push(context.identity().email.clone());
        let gate = self.fetch_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(AppError::unavailable("connection refused"));
        }
        Ok(self.snapshot.lock().unwrap().clone())
    }

    async fn dismiss(&self, _context: &SessionContext, id: &NotificationId) -> AppResult<()> {
        let gate = self.dismiss_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_dismiss.load(Ordering::SeqCst) {
            return Err(AppError::external_service("dismiss", "HTTP 500: boom"));
        }
        self.dismissed.lock().unwrap().push(id.clone());
        Ok(())
    }
}

/// Engine.IO open packet with the given heartbeat timings
pub fn open_frame(ping_interval_ms: u64, ping_timeout_ms: u64) -> String {
    format!(
        "0{}",
        json!({
            "sid": "test-sid",
            "upgrades": [],
            "pingInterval": ping_interval_ms,
            "pingTimeout": ping_timeout_ms,
            "maxPayload": 1_000_000
        })
    )
}

/// Minimal Socket.IO server speaking just enough protocol for the client
pub struct FakeSocketServer {
    pub addr: SocketAddr,
    connections: mpsc::UnboundedReceiver<FakeConnection>,
}

impl FakeSocketServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, connections) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let (info_tx, info_rx) = oneshot::channel();
                    let callback = move |request: &Request,
                                         response: Response|
                          -> Result<Response, ErrorResponse> {
                        let cookie = request
                            .headers()
                            .get("cookie")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_owned);
                        let _ = info_tx.send((request.uri().to_string(), cookie));
                        Ok(response)
                    };
                    let Ok(ws) = accept_hdr_async(stream, callback).await else {
                        return;
                    };
                    let (uri, cookie) = info_rx.await.unwrap();
                    let _ = tx.send(FakeConnection { uri, cookie, ws });
                });
            }
        });

        Self { addr, connections }
    }

    /// Base URL for a `SessionContext` pointed at this server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn next_connection(&mut self) -> FakeConnection {
        tokio::time::timeout(WAIT, self.connections.recv())
            .await
            .expect("client did not connect in time")
            .expect("server stopped")
    }

    /// Assert the client does not open another connection within `window`
    pub async fn expect_no_connection(&mut self, window: Duration) {
        if let Ok(Some(connection)) = tokio::time::timeout(window, self.connections.recv()).await {
            panic!("unexpected reconnect to {}", connection.uri);
        }
    }
}

/// One accepted client connection
pub struct FakeConnection {
    pub uri: String,
    pub cookie: Option<String>,
    ws: WebSocketStream<TcpStream>,
}

impl FakeConnection {
    /// Run the open and namespace handshakes, returning the first emitted event frame
    pub async fn handshake(&mut self) -> String {
        self.handshake_with(25_000, 20_000).await
    }

    pub async fn handshake_with(&mut self, ping_interval_ms: u64, ping_timeout_ms: u64) -> String {
        self.send_text(&open_frame(ping_interval_ms, ping_timeout_ms))
            .await;
        assert_eq!(self.expect_text().await, "40");
        self.send_text(r#"40{"sid":"ns-sid"}"#).await;
        self.expect_text().await
    }

    pub async fn send_text(&mut self, frame: &str) {
        self.ws.send(Message::Text(frame.to_owned())).await.unwrap();
    }

    /// Emit a Socket.IO event with one argument
    pub async fn emit(&mut self, event: &str, payload: Value) {
        let frame = format!("42{}", Value::Array(vec![Value::String(event.to_owned()), payload]));
        self.send_text(&frame).await;
    }

    /// Next text frame from the client
    pub async fn expect_text(&mut self) -> String {
        loop {
            let message = tokio::time::timeout(WAIT, self.ws.next())
                .await
                .expect("no frame from client in time")
                .expect("client closed the connection")
                .unwrap();
            if let Message::Text(text) = message {
                return text;
            }
        }
    }

    /// Wait until the client closes, collecting any text frames sent first
    pub async fn drain_until_closed(&mut self) -> Vec<String> {
        let mut frames = Vec::new();
        loop {
            match tokio::time::timeout(WAIT, self.ws.next()).await {
                Ok(Some(Ok(Message::Text(text)))) => frames.push(text),
                Ok(Some(Ok(Message::Close(_)) | Err(_)) | None) => return frames,
                Ok(Some(Ok(_))) => {}
                Err(_) => panic!("client did not close in time"),
            }
        }
    }

    /// Drop the TCP connection without a close handshake
    pub fn abort(self) {
        drop(self);
    }
}

/// Cookie the fake portal issues and accepts
pub const PORTAL_COOKIE: &str = "session=test-cookie";

/// Shared, inspectable state of the fake REST portal
#[derive(Clone)]
pub struct PortalState {
    pub snapshot_status: Arc<Mutex<u16>>,
    pub snapshot_body: Arc<Mutex<String>>,
    pub dismiss_status: Arc<Mutex<u16>>,
    pub dismissed_ids: Arc<Mutex<Vec<String>>>,
    pub cookies_seen: Arc<Mutex<Vec<Option<String>>>>,
    pub snapshot_hits: Arc<AtomicUsize>,
}

impl Default for PortalState {
    fn default() -> Self {
        Self {
            snapshot_status: Arc::new(Mutex::new(200)),
            snapshot_body: Arc::new(Mutex::new(
                json!({"undismissed": [], "dismissed": []}).to_string(),
            )),
            dismiss_status: Arc::new(Mutex::new(200)),
            dismissed_ids: Arc::new(Mutex::new(Vec::new())),
            cookies_seen: Arc::new(Mutex::new(Vec::new())),
            snapshot_hits: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl PortalState {
    pub fn set_snapshot(&self, status: u16, body: &str) {
        *self.snapshot_status.lock().unwrap() = status;
        body.clone_into(&mut self.snapshot_body.lock().unwrap());
    }

    pub fn set_dismiss_status(&self, status: u16) {
        *self.dismiss_status.lock().unwrap() = status;
    }
}

fn cookie_of(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

fn authorized(headers: &HeaderMap) -> bool {
    cookie_of(headers).as_deref() == Some(PORTAL_COOKIE)
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap()
}

async fn notifications(State(state): State<PortalState>, headers: HeaderMap) -> HttpResponse {
    state.snapshot_hits.fetch_add(1, Ordering::SeqCst);
    state.cookies_seen.lock().unwrap().push(cookie_of(&headers));
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let code = *state.snapshot_status.lock().unwrap();
    let body = state.snapshot_body.lock().unwrap().clone();
    (status(code), [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn dismiss(
    State(state): State<PortalState>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> HttpResponse {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let code = *state.dismiss_status.lock().unwrap();
    if code == 200 {
        if let Some(id) = form.get("id") {
            state.dismissed_ids.lock().unwrap().push(id.clone());
        }
        return Json(json!({"success": true})).into_response();
    }
    (status(code), Json(json!({"error": "Notification not found"}))).into_response()
}

async fn login(Form(form): Form<HashMap<String, String>>) -> HttpResponse {
    let valid = form.get("username").map(String::as_str) == Some("lab")
        && form.get("password").map(String::as_str) == Some("secret");
    if !valid {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid username or password"})),
        )
            .into_response();
    }
    (
        [(header::SET_COOKIE, format!("{PORTAL_COOKIE}; HttpOnly; Path=/"))],
        Json(json!({"message": "Login successful", "role": "user", "email": "lab@example.org"})),
    )
        .into_response()
}

async fn current_user(headers: HeaderMap) -> HttpResponse {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({
        "username": "lab@example.org",
        "organization": "RSV Reference Lab",
        "email": "lab@example.org",
        "role": "superuser"
    }))
    .into_response()
}

async fn logout(headers: HeaderMap) -> HttpResponse {
    if !authorized(&headers) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "No user is logged in"})),
        )
            .into_response();
    }
    Json(json!({"message": "Logged out successfully"})).into_response()
}

/// Fake REST portal serving the auth and notification endpoints
pub struct FakePortal {
    pub addr: SocketAddr,
    pub state: PortalState,
}

impl FakePortal {
    pub async fn start() -> Self {
        let state = PortalState::default();
        let app = Router::new()
            .route("/api/notifications", get(notifications))
            .route("/api/notifications/dismiss", post(dismiss))
            .route("/api/login", post(login))
            .route("/api/user", get(current_user))
            .route("/api/logout", post(logout))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Session carrying the cookie this portal accepts
    pub fn session(&self, email: &str) -> SessionContext {
        session_at(&self.base_url(), "user", email)
    }
}
