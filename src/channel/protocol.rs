// ABOUTME: Engine.IO v4 and Socket.IO v5 text packet codec for the push channel
// ABOUTME: Decodes handshake, ping, and event frames and encodes connect/emit/disconnect frames
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Push channel wire format
//!
//! Every WebSocket text frame is one Engine.IO packet: a single type digit
//! followed by an optional payload. Engine.IO `message` packets (`4`) wrap a
//! Socket.IO packet, whose layout is
//! `<type>[<namespace>,][<ack id>][<json>]`. Only the default namespace and
//! text packets are used by the notification backend; binary packets are
//! rejected.

use crate::errors::{AppError, AppResult};
use crate::models::{NotificationId, NotificationRecord};
use crate::timestamp::parse_backend_timestamp;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Engine.IO open handshake payload
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    /// Engine.IO session id
    pub sid: String,
    /// Transports the server could upgrade to
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Interval between server pings, in milliseconds
    pub ping_interval: u64,
    /// Grace period after a missed ping, in milliseconds
    pub ping_timeout: u64,
    /// Largest accepted payload, in bytes
    #[serde(default)]
    pub max_payload: Option<u64>,
}

impl Handshake {
    /// Silence longer than this means the connection is dead
    #[must_use]
    pub const fn liveness_window(&self) -> Duration {
        Duration::from_millis(self.ping_interval.saturating_add(self.ping_timeout))
    }
}

/// Engine.IO packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnginePacket {
    /// `0` open, carrying the handshake
    Open(Handshake),
    /// `1` close
    Close,
    /// `2` ping with optional probe payload
    Ping(String),
    /// `3` pong with optional probe payload
    Pong(String),
    /// `4` message, carrying a Socket.IO packet
    Message(String),
    /// `5` upgrade
    Upgrade,
    /// `6` noop
    Noop,
}

impl EnginePacket {
    /// Decode a single text frame
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` for empty frames or unknown packet types, and
    /// `SerializationError` for a malformed open handshake
    pub fn decode(frame: &str) -> AppResult<Self> {
        let mut chars = frame.chars();
        let kind = chars
            .next()
            .ok_or_else(|| AppError::invalid_format("Empty Engine.IO frame"))?;
        let payload = chars.as_str();

        match kind {
            '0' => Ok(Self::Open(serde_json::from_str(payload)?)),
            '1' => Ok(Self::Close),
            '2' => Ok(Self::Ping(payload.to_owned())),
            '3' => Ok(Self::Pong(payload.to_owned())),
            '4' => Ok(Self::Message(payload.to_owned())),
            '5' => Ok(Self::Upgrade),
            '6' => Ok(Self::Noop),
            other => Err(AppError::invalid_format(format!(
                "Unknown Engine.IO packet type '{other}'"
            ))),
        }
    }

    /// Encode as a text frame
    ///
    /// Open packets are only ever sent by servers; the client encodes them as
    /// an empty open marker.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Open(_) => "0".to_owned(),
            Self::Close => "1".to_owned(),
            Self::Ping(payload) => format!("2{payload}"),
            Self::Pong(payload) => format!("3{payload}"),
            Self::Message(payload) => format!("4{payload}"),
            Self::Upgrade => "5".to_owned(),
            Self::Noop => "6".to_owned(),
        }
    }
}

/// Socket.IO packet for the default namespace
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    /// `0` connect request (client) or acknowledgement (server)
    Connect(Option<Value>),
    /// `1` namespace disconnect
    Disconnect,
    /// `2` event: name plus arguments
    Event {
        /// Event name
        name: String,
        /// Event arguments
        args: Vec<Value>,
    },
    /// `3` acknowledgement of an emitted event
    Ack {
        /// Acknowledged emit id
        id: u64,
        /// Acknowledgement arguments
        args: Vec<Value>,
    },
    /// `4` namespace connect refused
    ConnectError(Value),
}

impl SocketPacket {
    /// Decode the payload of an Engine.IO message packet
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` for unknown or binary packet types, non-default
    /// namespaces, or events without a name; `SerializationError` for invalid JSON
    pub fn decode(payload: &str) -> AppResult<Self> {
        let mut chars = payload.chars();
        let kind = chars
            .next()
            .ok_or_else(|| AppError::invalid_format("Empty Socket.IO packet"))?;
        let rest = strip_default_namespace(chars.as_str())?;

        match kind {
            '0' => Ok(Self::Connect(parse_optional_json(rest)?)),
            '1' => Ok(Self::Disconnect),
            '2' => {
                let (_, body) = split_ack_id(rest);
                decode_event(body)
            }
            '3' => {
                let (id, body) = split_ack_id(rest);
                let id = id.ok_or_else(|| AppError::invalid_format("Ack packet without id"))?;
                let args = match parse_optional_json(body)? {
                    Some(Value::Array(args)) => args,
                    Some(other) => vec![other],
                    None => Vec::new(),
                };
                Ok(Self::Ack { id, args })
            }
            '4' => Ok(Self::ConnectError(
                parse_optional_json(rest)?.unwrap_or(Value::Null),
            )),
            '5' | '6' => Err(AppError::invalid_format(
                "Binary Socket.IO packets are not supported",
            )),
            other => Err(AppError::invalid_format(format!(
                "Unknown Socket.IO packet type '{other}'"
            ))),
        }
    }

    /// Encode as the payload of an Engine.IO message packet
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Connect(None) => "0".to_owned(),
            Self::Connect(Some(auth)) => format!("0{auth}"),
            Self::Disconnect => "1".to_owned(),
            Self::Event { name, args } => {
                let mut items = Vec::with_capacity(args.len() + 1);
                items.push(Value::String(name.clone()));
                items.extend(args.iter().cloned());
                format!("2{}", Value::Array(items))
            }
            Self::Ack { id, args } => format!("3{id}{}", Value::Array(args.clone())),
            Self::ConnectError(data) => format!("4{data}"),
        }
    }

    /// Encode wrapped in an Engine.IO message packet, ready to send as a text frame
    #[must_use]
    pub fn to_frame(&self) -> String {
        EnginePacket::Message(self.encode()).encode()
    }

    /// Build an event packet
    pub fn event(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self::Event {
            name: name.into(),
            args,
        }
    }
}

/// Drop a leading `/,` namespace marker; reject any other namespace
fn strip_default_namespace(rest: &str) -> AppResult<&str> {
    if !rest.starts_with('/') {
        return Ok(rest);
    }
    let (namespace, body) = rest.split_once(',').unwrap_or((rest, ""));
    if namespace == "/" {
        Ok(body)
    } else {
        Err(AppError::invalid_format(format!(
            "Unexpected Socket.IO namespace '{namespace}'"
        )))
    }
}

/// Split a leading decimal ack id from the JSON body
fn split_ack_id(rest: &str) -> (Option<u64>, &str) {
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return (None, rest);
    }
    let (id, body) = rest.split_at(digits);
    (id.parse().ok(), body)
}

fn parse_optional_json(body: &str) -> AppResult<Option<Value>> {
    if body.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(serde_json::from_str(body)?))
    }
}

fn decode_event(body: &str) -> AppResult<SocketPacket> {
    let Some(Value::Array(mut items)) = parse_optional_json(body)? else {
        return Err(AppError::invalid_format("Event packet without argument array"));
    };
    if items.is_empty() {
        return Err(AppError::invalid_format("Event packet without a name"));
    }
    let Value::String(name) = items.remove(0) else {
        return Err(AppError::invalid_format("Event name is not a string"));
    };
    Ok(SocketPacket::Event { name, args: items })
}

/// Payload of a pushed notification event
///
/// Every field is optional on the wire: the backend also emits informational
/// payloads such as `{"data": "Connected as user"}` on the same event name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushPayload {
    /// Notification id
    #[serde(default)]
    pub id: Option<NotificationId>,
    /// Notification text
    #[serde(default)]
    pub message: Option<String>,
    /// Creation time as emitted by the backend
    #[serde(default)]
    pub created_at: Option<String>,
    /// Backend pub/sub channel the event originated on
    #[serde(default)]
    pub channel: Option<String>,
}

impl PushPayload {
    /// Parse an event argument
    ///
    /// # Errors
    ///
    /// Returns `SerializationError` if the argument is not an object of the expected shape
    pub fn from_value(value: Value) -> AppResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Convert into a record
    ///
    /// Returns `Ok(None)` for payloads without a message, which carry no
    /// notification.
    ///
    /// # Errors
    ///
    /// Returns `MissingRequiredField` when a message is present without an id or
    /// timestamp, and `InvalidFormat` when the timestamp cannot be parsed
    pub fn into_record(self) -> AppResult<Option<NotificationRecord>> {
        let Some(message) = self.message.filter(|m| !m.is_empty()) else {
            return Ok(None);
        };
        let id = self.id.ok_or_else(|| AppError::missing_field("id"))?;
        let raw_created_at = self
            .created_at
            .ok_or_else(|| AppError::missing_field("created_at"))?;
        let created_at = parse_backend_timestamp(&raw_created_at).ok_or_else(|| {
            AppError::invalid_format(format!("Unparseable created_at '{raw_created_at}'"))
                .with_resource_id(id.to_string())
        })?;
        Ok(Some(NotificationRecord {
            id,
            message,
            created_at,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_open_handshake() {
        let frame = r#"0{"sid":"lv_VI97HAXpY6yYWAAAC","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;
        let EnginePacket::Open(handshake) = EnginePacket::decode(frame).unwrap() else {
            panic!("expected open packet");
        };
        assert_eq!(handshake.sid, "lv_VI97HAXpY6yYWAAAC");
        assert_eq!(handshake.liveness_window(), Duration::from_millis(45_000));
    }

    #[test]
    fn test_ping_pong_and_close() {
        assert_eq!(EnginePacket::decode("2").unwrap(), EnginePacket::Ping(String::new()));
        assert_eq!(EnginePacket::Pong(String::new()).encode(), "3");
        assert_eq!(EnginePacket::decode("1").unwrap(), EnginePacket::Close);
        assert!(EnginePacket::decode("").is_err());
        assert!(EnginePacket::decode("9").is_err());
    }

    #[test]
    fn test_decode_connect_ack_with_and_without_namespace() {
        assert_eq!(
            SocketPacket::decode(r#"0{"sid":"abc"}"#).unwrap(),
            SocketPacket::Connect(Some(json!({"sid": "abc"})))
        );
        assert_eq!(
            SocketPacket::decode(r#"0/,{"sid":"abc"}"#).unwrap(),
            SocketPacket::Connect(Some(json!({"sid": "abc"})))
        );
        assert!(SocketPacket::decode("0/admin,{}").is_err());
    }

    #[test]
    fn test_decode_notification_event() {
        let payload = r#"2["my response",{"channel":"chat","message":"A new upload of sample RSV-3","id":12,"created_at":"2024-01-01 11:00:00.000001"}]"#;
        let SocketPacket::Event { name, mut args } = SocketPacket::decode(payload).unwrap() else {
            panic!("expected event");
        };
        assert_eq!(name, "my response");
        let record = PushPayload::from_value(args.remove(0))
            .unwrap()
            .into_record()
            .unwrap()
            .unwrap();
        assert_eq!(record.id, NotificationId::Integer(12));
        assert_eq!(record.message, "A new upload of sample RSV-3");
    }

    #[test]
    fn test_event_with_ack_id_is_decoded() {
        let packet = SocketPacket::decode(r#"27["start_redis_listener"]"#).unwrap();
        assert_eq!(packet, SocketPacket::event("start_redis_listener", vec![]));
    }

    #[test]
    fn test_encode_emit_frame() {
        assert_eq!(
            SocketPacket::event("start_redis_listener", vec![]).to_frame(),
            r#"42["start_redis_listener"]"#
        );
        assert_eq!(SocketPacket::Connect(None).to_frame(), "40");
        assert_eq!(SocketPacket::Disconnect.to_frame(), "41");
    }

    #[test]
    fn test_binary_packets_rejected() {
        assert!(SocketPacket::decode(r#"51-["upload",{"_placeholder":true,"num":0}]"#).is_err());
    }

    #[test]
    fn test_informational_payload_carries_no_record() {
        let payload = PushPayload::from_value(json!({"data": "Connected as user"})).unwrap();
        assert!(payload.into_record().unwrap().is_none());
    }

    #[test]
    fn test_payload_missing_id_is_malformed() {
        let payload = PushPayload::from_value(json!({
            "message": "orphan",
            "created_at": "2024-01-01T10:00:00Z"
        }))
        .unwrap();
        assert!(payload.into_record().is_err());
    }

    #[test]
    fn test_payload_with_bad_timestamp_is_malformed() {
        let payload = PushPayload::from_value(json!({
            "id": 4,
            "message": "late",
            "created_at": "not a time"
        }))
        .unwrap();
        let error = payload.into_record().unwrap_err();
        assert_eq!(error.resource_id.as_deref(), Some("4"));
    }
}
