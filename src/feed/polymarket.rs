//! Polymarket CLOB WebSocket feed
//!
//! Connects to the market channel, subscribes by token id, and delivers
//! every parsed event to the registered callback. Delivery happens on a
//! dedicated thread, one event at a time, so the callback is never
//! invoked concurrently with itself.

use super::{parser, EventCallback, MarketDataFeed};
use crate::domain::BookEvent;
use crate::error::Result;
use crate::ws::{WsClient, WsConfig, WsMessage};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, watch};

/// Polymarket CLOB WebSocket URL for market data
pub const POLYMARKET_WS_URL: &str = "wss://ws-subscriptions-clob.polymarket.com/ws/market";

/// Feed configuration
#[derive(Debug, Clone)]
pub struct PolymarketFeedConfig {
    pub ws_url: String,
    /// 0 = reconnect forever
    pub max_reconnects: u32,
    pub initial_reconnect_delay: Duration,
    pub max_reconnect_delay: Duration,
    pub ping_interval: Duration,
    /// Capacity of the parsed-event delivery channel
    pub channel_capacity: usize,
}

impl Default for PolymarketFeedConfig {
    fn default() -> Self {
        Self {
            ws_url: POLYMARKET_WS_URL.to_string(),
            max_reconnects: 0,
            initial_reconnect_delay: Duration::from_secs(1),
            max_reconnect_delay: Duration::from_secs(30),
            ping_interval: Duration::from_secs(30),
            channel_capacity: 1024,
        }
    }
}

/// Subscription message for the market channel
#[derive(Debug, Serialize)]
struct SubscriptionMessage {
    assets_ids: Vec<String>,
    #[serde(rename = "type")]
    msg_type: String,
}

impl SubscriptionMessage {
    fn market(token_ids: Vec<String>) -> Self {
        Self {
            assets_ids: token_ids,
            msg_type: "market".to_string(),
        }
    }
}

struct Control {
    outbound: Option<mpsc::Sender<String>>,
    shutdown: Option<watch::Sender<bool>>,
    started: bool,
}

/// Live feed over the Polymarket CLOB WebSocket.
///
/// Owns its own tokio runtime so the rest of the engine can stay
/// synchronous.
pub struct PolymarketFeed {
    config: PolymarketFeedConfig,
    runtime: Runtime,
    callback: Arc<Mutex<Option<EventCallback>>>,
    token_ids: Arc<Mutex<Vec<String>>>,
    control: Mutex<Control>,
}

impl PolymarketFeed {
    pub fn new(config: PolymarketFeedConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        Ok(Self {
            config,
            runtime,
            callback: Arc::new(Mutex::new(None)),
            token_ids: Arc::new(Mutex::new(Vec::new())),
            control: Mutex::new(Control {
                outbound: None,
                shutdown: None,
                started: false,
            }),
        })
    }

    fn subscription_json(token_ids: &[String]) -> Option<String> {
        if token_ids.is_empty() {
            return None;
        }
        serde_json::to_string(&SubscriptionMessage::market(token_ids.to_vec())).ok()
    }
}

impl MarketDataFeed for PolymarketFeed {
    fn set_on_event(&self, callback: EventCallback) {
        *self
            .callback
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(callback);
    }

    fn subscribe(&self, token_id: &str) {
        self.token_ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(token_id.to_string());

        // Already connected: push an updated subscription with the full list
        let control = self.control.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(outbound) = &control.outbound {
            let tokens = self
                .token_ids
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            if let Some(json) = Self::subscription_json(&tokens) {
                if outbound.try_send(json).is_err() {
                    tracing::warn!(token_id, "Could not queue live resubscription");
                }
            }
        }
    }

    fn start(&self) {
        let mut control = self.control.lock().unwrap_or_else(PoisonError::into_inner);
        if control.started {
            return;
        }
        control.started = true;

        let ws_config = WsConfig {
            url: self.config.ws_url.clone(),
            max_reconnect_attempts: self.config.max_reconnects,
            initial_reconnect_delay: self.config.initial_reconnect_delay,
            max_reconnect_delay: self.config.max_reconnect_delay,
            ping_interval: self.config.ping_interval,
        };

        let (mut ws_rx, ws_tx) = {
            let _guard = self.runtime.enter();
            WsClient::new(ws_config).connect()
        };

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let (event_tx, mut event_rx) = mpsc::channel::<BookEvent>(self.config.channel_capacity);

        control.outbound = Some(ws_tx.clone());
        control.shutdown = Some(shutdown_tx);
        drop(control);

        // Delivery thread: single-threaded, in-order callback invocation
        let callback = self.callback.clone();
        std::thread::spawn(move || {
            while let Some(event) = event_rx.blocking_recv() {
                let current = callback
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone();
                if let Some(callback) = current {
                    callback(event);
                }
            }
        });

        let token_ids = self.token_ids.clone();
        self.runtime.spawn(async move {
            loop {
                tokio::select! {
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            tracing::info!("Feed shutting down");
                            break;
                        }
                    }
                    message = ws_rx.recv() => {
                        match message {
                            Some(WsMessage::Connected) => {
                                let tokens = token_ids
                                    .lock()
                                    .unwrap_or_else(PoisonError::into_inner)
                                    .clone();
                                match Self::subscription_json(&tokens) {
                                    Some(json) => {
                                        if ws_tx.send(json).await.is_err() {
                                            tracing::error!("Subscription send failed");
                                            break;
                                        }
                                        tracing::info!(tokens = tokens.len(), "Subscribed to market channel");
                                    }
                                    None => tracing::warn!("Connected with no subscriptions"),
                                }
                            }
                            Some(WsMessage::Text(text)) => {
                                match parser::parse_message(&text) {
                                    Ok(events) => {
                                        for event in events {
                                            if event_tx.send(event).await.is_err() {
                                                return;
                                            }
                                        }
                                    }
                                    Err(e) => {
                                        // The venue retransmits snapshots; a lost
                                        // message is recoverable
                                        tracing::warn!(
                                            error = %e,
                                            preview = %text.chars().take(120).collect::<String>(),
                                            "Dropping unparseable message"
                                        );
                                    }
                                }
                            }
                            Some(WsMessage::Reconnecting { attempt }) => {
                                tracing::info!(attempt, "Feed reconnecting");
                            }
                            Some(WsMessage::Disconnected) | None => {
                                tracing::info!("Feed disconnected");
                                break;
                            }
                        }
                    }
                }
            }
        });

        tracing::info!(url = %self.config.ws_url, "Feed started");
    }

    fn stop(&self) {
        let mut control = self.control.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(shutdown) = control.shutdown.take() {
            let _ = shutdown.send(true);
        }
        control.outbound = None;
        control.started = false;
    }
}
