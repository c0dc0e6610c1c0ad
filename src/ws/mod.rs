//! Reconnecting WebSocket transport
//!
//! Generic client used by the Polymarket feed: exponential-backoff
//! reconnection, keepalive pings, and an outbound channel for
//! subscription messages.

mod client;

pub use client::WsClient;

use std::time::Duration;

/// WebSocket connection tuning
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// URL to connect to
    pub url: String,
    /// Reconnection attempts before giving up (0 = retry forever)
    pub max_reconnect_attempts: u32,
    /// Delay before the first reconnection attempt
    pub initial_reconnect_delay: Duration,
    /// Backoff ceiling
    pub max_reconnect_delay: Duration,
    /// Keepalive ping cadence
    pub ping_interval: Duration,
}

impl WsConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_reconnect_attempts: 0,
            initial_reconnect_delay: Duration::from_secs(1),
            max_reconnect_delay: Duration::from_secs(30),
            ping_interval: Duration::from_secs(30),
        }
    }
}

/// Connection lifecycle and payload notifications
#[derive(Debug, Clone)]
pub enum WsMessage {
    /// A text frame arrived
    Text(String),
    /// Connection (re)established; resend subscriptions now
    Connected,
    /// Connection lost, retrying
    Reconnecting { attempt: u32 },
    /// Connection closed for good
    Disconnected,
}

/// Transport-level failures
#[derive(Debug, Clone, thiserror::Error)]
pub enum WsError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("maximum reconnection attempts exceeded")]
    MaxReconnectsExceeded,
    #[error("stream ended: {0}")]
    StreamEnded(String),
}
