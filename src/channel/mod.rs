// ABOUTME: Real-time push channel to the portal backend over Socket.IO
// ABOUTME: Wire codec, reconnection policy, and the connection-owning client task
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Connection task and its control handle
pub mod client;
/// Engine.IO and Socket.IO packet codec
pub mod protocol;
/// Reconnection defaults and backoff
pub mod transport;

pub use client::{ChannelHandle, ChannelState, PushChannelClient, PushEvent};
pub use protocol::{EnginePacket, Handshake, PushPayload, SocketPacket};
pub use transport::{Backoff, TransportOptions};
