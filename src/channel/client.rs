// ABOUTME: Push Channel Client maintaining one auto-reconnecting Socket.IO connection per session
// ABOUTME: Announces the listener after every connect and forwards notification events to the owner
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Push Channel Client
//!
//! A background task owns the WebSocket. It walks
//! `Disconnected -> Connecting -> Connected` and falls back to `Disconnected`
//! whenever the transport is lost, retrying after a jittered backoff. Every
//! time the namespace handshake completes the client emits the
//! "start listening" event again, since the backend treats each connection as
//! a fresh subscription.
//!
//! Notification events are forwarded as [`PushEvent`] messages on an `mpsc`
//! channel; the receiver decides what to do with them. Once
//! [`ChannelHandle::close`] has been called no further events are forwarded.

use super::protocol::{EnginePacket, PushPayload, SocketPacket};
use super::transport::{Backoff, TransportOptions};
use crate::constants::channel;
use crate::context::SessionContext;
use crate::errors::{AppError, AppResult};
use crate::models::{Identity, NotificationRecord};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::{header::COOKIE, HeaderValue};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connection state of the push channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelState {
    /// No connection, either before the first attempt or between retries
    Disconnected,
    /// WebSocket or namespace handshake in progress
    Connecting,
    /// Namespace joined and listener announced
    Connected,
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        };
        f.write_str(label)
    }
}

/// The single inbound message the channel produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushEvent {
    /// Notification delivered by the backend
    pub record: NotificationRecord,
}

/// How one connection ended
#[derive(Debug)]
enum SessionEnd {
    /// Local teardown
    Shutdown,
    /// The server left the namespace; it will not accept us back unprompted
    ServerDisconnect,
    /// The server refused the namespace handshake
    Refused(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    AwaitingOpen,
    AwaitingConnectAck,
    Connected,
}

/// What handling one frame asks the connection loop to do
enum Step {
    Continue,
    Joined,
    End(SessionEnd),
}

/// Configured, not yet running push channel
#[derive(Debug, Clone)]
pub struct PushChannelClient {
    url: Url,
    cookie: Option<String>,
    identity: Identity,
    session_id: Uuid,
    options: TransportOptions,
}

impl PushChannelClient {
    /// Channel for a session using the transport defaults
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the socket URL cannot be built
    pub fn new(context: &SessionContext) -> AppResult<Self> {
        Self::with_options(context, TransportOptions::default())
    }

    /// Channel with explicit transport options
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the socket URL cannot be built
    pub fn with_options(context: &SessionContext, options: TransportOptions) -> AppResult<Self> {
        Ok(Self {
            url: context.endpoints().socket(context.identity())?,
            cookie: context.cookie().map(ToOwned::to_owned),
            identity: context.identity().clone(),
            session_id: context.session_id(),
            options,
        })
    }

    /// WebSocket URL including the identity query parameters
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Start the background connection task, forwarding events to `sink`
    #[must_use]
    pub fn spawn(self, sink: mpsc::Sender<PushEvent>) -> ChannelHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(ChannelState::Disconnected);

        let task = tokio::spawn(async move {
            self.run(sink, state_tx, shutdown_rx).await;
        });

        ChannelHandle {
            shutdown_tx: Arc::new(shutdown_tx),
            state_rx,
            task: Arc::new(Mutex::new(Some(task))),
        }
    }

    async fn run(
        self,
        sink: mpsc::Sender<PushEvent>,
        state_tx: watch::Sender<ChannelState>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        let mut backoff = Backoff::new(&self.options);

        loop {
            if *shutdown_rx.borrow() {
                break;
            }
            state_tx.send_replace(ChannelState::Connecting);
            debug!(identity = %self.identity, url = %self.url, "Connecting push channel");

            let outcome = self
                .connect_once(&sink, &state_tx, &mut shutdown_rx, &mut backoff)
                .await;
            state_tx.send_replace(ChannelState::Disconnected);

            match outcome {
                Ok(SessionEnd::Shutdown) => break,
                Ok(SessionEnd::ServerDisconnect) => {
                    warn!(identity = %self.identity, "Server closed the push channel namespace");
                    break;
                }
                Ok(SessionEnd::Refused(reason)) => {
                    warn!(identity = %self.identity, reason = %reason, "Push channel connection refused");
                    break;
                }
                Err(error) => {
                    if !self.options.allows_attempt(backoff.attempts()) {
                        warn!(
                            identity = %self.identity,
                            error = %error,
                            attempts = backoff.attempts(),
                            "Push channel lost, giving up"
                        );
                        break;
                    }
                    let delay = backoff.next_delay();
                    warn!(
                        identity = %self.identity,
                        error = %error,
                        attempt = backoff.attempts(),
                        delay_ms = delay.as_millis() as u64,
                        "Push channel lost, reconnecting"
                    );
                    tokio::select! {
                        () = tokio::time::sleep(delay) => {}
                        _ = shutdown_rx.changed() => break,
                    }
                }
            }
        }

        state_tx.send_replace(ChannelState::Disconnected);
        debug!(session_id = %self.session_id, "Push channel task finished");
    }

    fn handshake_request(&self) -> AppResult<Request> {
        let mut request = self.url.as_str().into_client_request()?;
        if let Some(cookie) = &self.cookie {
            let value = HeaderValue::from_str(cookie).map_err(|e| {
                AppError::invalid_input("Session cookie is not a valid header value").with_source(e)
            })?;
            request.headers_mut().insert(COOKIE, value);
        }
        Ok(request)
    }

    async fn connect_once(
        &self,
        sink: &mpsc::Sender<PushEvent>,
        state_tx: &watch::Sender<ChannelState>,
        shutdown_rx: &mut watch::Receiver<bool>,
        backoff: &mut Backoff,
    ) -> AppResult<SessionEnd> {
        let request = self.handshake_request()?;
        let connect = tokio::time::timeout(self.options.connect_timeout, connect_async(request));
        let (socket, _) = tokio::select! {
            result = connect => result
                .map_err(|_| AppError::unavailable("Push channel connect timed out"))??,
            _ = shutdown_rx.changed() => return Ok(SessionEnd::Shutdown),
        };

        let mut connection = Connection::new(socket, self.options.connect_timeout);
        loop {
            let frame = tokio::select! {
                _ = shutdown_rx.changed() => {
                    connection.leave().await;
                    return Ok(SessionEnd::Shutdown);
                }
                () = tokio::time::sleep_until(connection.deadline) => {
                    return Err(connection.timeout_error());
                }
                frame = connection.socket.next() => frame,
            };

            let text = match frame {
                None => return Err(AppError::unavailable("Push channel stream ended")),
                Some(Err(e)) => return Err(e.into()),
                Some(Ok(Message::Text(text))) => text,
                Some(Ok(Message::Close(_))) => {
                    return Err(AppError::unavailable("Push channel closed by server"));
                }
                Some(Ok(_)) => continue,
            };

            match connection.on_frame(&text, sink, shutdown_rx).await? {
                Step::Continue => {}
                Step::Joined => {
                    backoff.reset();
                    state_tx.send_replace(ChannelState::Connected);
                    info!(identity = %self.identity, "Push channel connected");
                }
                Step::End(end) => return Ok(end),
            }
        }
    }
}

/// One live WebSocket plus its Engine.IO bookkeeping
struct Connection {
    socket: Socket,
    phase: Phase,
    liveness: Duration,
    deadline: Instant,
}

impl Connection {
    fn new(socket: Socket, handshake_timeout: Duration) -> Self {
        Self {
            socket,
            phase: Phase::AwaitingOpen,
            liveness: handshake_timeout,
            deadline: Instant::now() + handshake_timeout,
        }
    }

    fn timeout_error(&self) -> AppError {
        if self.phase == Phase::Connected {
            AppError::unavailable("Push channel missed the server heartbeat")
        } else {
            AppError::unavailable("Push channel handshake timed out")
        }
    }

    async fn send(&mut self, frame: String) -> AppResult<()> {
        self.socket.send(Message::Text(frame)).await?;
        Ok(())
    }

    /// Best-effort namespace disconnect and close during teardown
    async fn leave(&mut self) {
        if self.phase == Phase::Connected {
            if let Err(e) = self.send(SocketPacket::Disconnect.to_frame()).await {
                debug!(error = %e, "Failed to send namespace disconnect");
            }
        }
        if let Err(e) = self.socket.close(None).await {
            debug!(error = %e, "Push channel close handshake failed");
        }
    }

    async fn on_frame(
        &mut self,
        text: &str,
        sink: &mpsc::Sender<PushEvent>,
        shutdown_rx: &mut watch::Receiver<bool>,
    ) -> AppResult<Step> {
        let packet = match EnginePacket::decode(text) {
            Ok(packet) => packet,
            Err(e) => {
                warn!(error = %e, "Dropping malformed push channel frame");
                return Ok(Step::Continue);
            }
        };

        match packet {
            EnginePacket::Open(handshake) => {
                debug!(sid = %handshake.sid, ping_interval = handshake.ping_interval, "Engine.IO session opened");
                self.liveness = handshake.liveness_window();
                self.phase = Phase::AwaitingConnectAck;
                self.send(SocketPacket::Connect(None).to_frame()).await?;
                Ok(Step::Continue)
            }
            EnginePacket::Ping(probe) => {
                self.send(EnginePacket::Pong(probe).encode()).await?;
                if self.phase == Phase::Connected {
                    self.deadline = Instant::now() + self.liveness;
                }
                Ok(Step::Continue)
            }
            EnginePacket::Close => Err(AppError::unavailable("Engine.IO session closed by server")),
            EnginePacket::Message(payload) => self.on_socket_packet(&payload, sink, shutdown_rx).await,
            EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => Ok(Step::Continue),
        }
    }

    async fn on_socket_packet(
        &mut self,
        payload: &str,
        sink: &mpsc::Sender<PushEvent>,
        shutdown_rx: &mut watch::Receiver<bool>,
    ) -> AppResult<Step> {
        let packet = match SocketPacket::decode(payload) {
            Ok(packet) => packet,
            Err(e) => {
                warn!(error = %e, "Dropping malformed Socket.IO packet");
                return Ok(Step::Continue);
            }
        };

        match packet {
            SocketPacket::Connect(_) if self.phase == Phase::AwaitingConnectAck => {
                self.phase = Phase::Connected;
                self.deadline = Instant::now() + self.liveness;
                let announce = SocketPacket::event(channel::START_LISTENING_EVENT, Vec::new());
                self.send(announce.to_frame()).await?;
                Ok(Step::Joined)
            }
            SocketPacket::Disconnect => Ok(Step::End(SessionEnd::ServerDisconnect)),
            SocketPacket::ConnectError(data) => Ok(Step::End(SessionEnd::Refused(data.to_string()))),
            SocketPacket::Event { name, args } if name == channel::NOTIFICATION_EVENT => {
                forward_notification(args, sink, shutdown_rx).await
            }
            SocketPacket::Event { name, .. } => {
                debug!(event = %name, "Ignoring push channel event");
                Ok(Step::Continue)
            }
            SocketPacket::Connect(_) | SocketPacket::Ack { .. } => Ok(Step::Continue),
        }
    }
}

/// Hand one notification event to the owner, unless teardown has begun
async fn forward_notification(
    args: Vec<Value>,
    sink: &mpsc::Sender<PushEvent>,
    shutdown_rx: &mut watch::Receiver<bool>,
) -> AppResult<Step> {
    let Some(argument) = args.into_iter().next() else {
        debug!("Notification event without payload");
        return Ok(Step::Continue);
    };

    let record = match PushPayload::from_value(argument).and_then(PushPayload::into_record) {
        Ok(Some(record)) => record,
        Ok(None) => {
            debug!("Informational push event without a message");
            return Ok(Step::Continue);
        }
        Err(e) => {
            warn!(error = %e, "Dropping malformed notification event");
            return Ok(Step::Continue);
        }
    };

    if *shutdown_rx.borrow() {
        debug!(notification_id = %record.id, "Discarding push event received during teardown");
        return Ok(Step::End(SessionEnd::Shutdown));
    }

    debug!(notification_id = %record.id, "Push event received");
    tokio::select! {
        sent = sink.send(PushEvent { record }) => {
            if sent.is_err() {
                debug!("Push event receiver dropped, stopping channel");
                return Ok(Step::End(SessionEnd::Shutdown));
            }
            Ok(Step::Continue)
        }
        _ = shutdown_rx.changed() => {
            debug!("Discarding push event received during teardown");
            Ok(Step::End(SessionEnd::Shutdown))
        }
    }
}

/// Control handle for a running push channel
///
/// Cloning is cheap. Dropping every handle stops the channel as well.
#[derive(Clone)]
pub struct ChannelHandle {
    shutdown_tx: Arc<watch::Sender<bool>>,
    state_rx: watch::Receiver<ChannelState>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl ChannelHandle {
    /// Current connection state
    #[must_use]
    pub fn state(&self) -> ChannelState {
        *self.state_rx.borrow()
    }

    /// Receiver notified on every state transition
    #[must_use]
    pub fn subscribe_state(&self) -> watch::Receiver<ChannelState> {
        self.state_rx.clone()
    }

    /// Whether teardown has been initiated
    #[must_use]
    pub fn is_closed(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Close the channel and wait for the background task to finish
    ///
    /// Only the first call initiates teardown and returns `true`; later calls
    /// are no-ops returning `false`.
    ///
    /// # Errors
    ///
    /// Returns `InternalError` if the background task panicked
    pub async fn close(&self) -> AppResult<bool> {
        let initiated = self.shutdown_tx.send_if_modified(|closed| {
            if *closed {
                false
            } else {
                *closed = true;
                true
            }
        });

        let task = self.task.lock().await.take();
        if let Some(join_handle) = task {
            join_handle
                .await
                .map_err(|e| AppError::internal(format!("push channel task failed: {e}")))?;
        }
        if initiated {
            info!("Push channel closed");
        }
        Ok(initiated)
    }
}

impl fmt::Debug for ChannelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelHandle")
            .field("state", &self.state())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PortalEndpoints;

    fn context() -> SessionContext {
        let base = Url::parse("https://eqa.example.org").unwrap();
        SessionContext::new(
            Identity::new("superuser", "admin@example.org"),
            Some("session=abc".to_owned()),
            PortalEndpoints::new(&base, "/eqa"),
            reqwest::Client::new(),
        )
    }

    #[test]
    fn test_socket_url_carries_identity() {
        let client = PushChannelClient::new(&context()).unwrap();
        let url = client.url().as_str();
        assert!(url.starts_with("wss://eqa.example.org/eqa/socket.io/"));
        assert!(url.contains("role=superuser"));
        assert!(url.contains("email=admin%40example.org"));
    }

    #[test]
    fn test_handshake_request_sends_cookie() {
        let client = PushChannelClient::new(&context()).unwrap();
        let request = client.handshake_request().unwrap();
        assert_eq!(request.headers().get(COOKIE).unwrap(), "session=abc");
    }

    #[test]
    fn test_state_labels() {
        assert_eq!(ChannelState::Connected.to_string(), "connected");
        assert_eq!(
            serde_json::to_string(&ChannelState::Connecting).unwrap(),
            "\"connecting\""
        );
    }
}
