//! WebSocket client with automatic reconnection

use super::{WsConfig, WsError, WsMessage};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Reconnecting WebSocket client.
///
/// `connect` spawns a background task and hands back a receiver for
/// inbound frames plus a sender for outbound text messages. Outbound
/// messages survive reconnects; the `Connected` notification tells the
/// caller when to resend its subscriptions.
pub struct WsClient {
    config: WsConfig,
}

impl WsClient {
    pub fn new(config: WsConfig) -> Self {
        Self { config }
    }

    /// Connect in the background. Must be called within a tokio runtime.
    pub fn connect(&self) -> (mpsc::Receiver<WsMessage>, mpsc::Sender<String>) {
        let (msg_tx, msg_rx) = mpsc::channel(1024);
        let (send_tx, send_rx) = mpsc::channel(256);
        let config = self.config.clone();

        tokio::spawn(async move {
            if let Err(e) = run_connection_loop(config, msg_tx, send_rx).await {
                tracing::error!(error = %e, "WebSocket connection loop ended");
            }
        });

        (msg_rx, send_tx)
    }
}

async fn run_connection_loop(
    config: WsConfig,
    tx: mpsc::Sender<WsMessage>,
    mut send_rx: mpsc::Receiver<String>,
) -> Result<(), WsError> {
    let mut attempts = 0u32;
    let mut delay = config.initial_reconnect_delay;

    loop {
        match connect_and_stream(&config, &tx, &mut send_rx).await {
            Ok(()) => {
                tracing::info!("WebSocket closed cleanly");
                let _ = tx.send(WsMessage::Disconnected).await;
                return Ok(());
            }
            Err(e) => {
                attempts += 1;
                tracing::warn!(error = %e, attempt = attempts, "WebSocket error, reconnecting");

                if config.max_reconnect_attempts > 0 && attempts >= config.max_reconnect_attempts {
                    let _ = tx.send(WsMessage::Disconnected).await;
                    return Err(WsError::MaxReconnectsExceeded);
                }
                if tx.is_closed() {
                    return Ok(());
                }

                let _ = tx.send(WsMessage::Reconnecting { attempt: attempts }).await;
                sleep(delay).await;
                delay = (delay * 2).min(config.max_reconnect_delay);
            }
        }
    }
}

async fn connect_and_stream(
    config: &WsConfig,
    tx: &mpsc::Sender<WsMessage>,
    send_rx: &mut mpsc::Receiver<String>,
) -> Result<(), WsError> {
    let (stream, _) = connect_async(config.url.as_str())
        .await
        .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;
    let (mut sink, mut reader) = stream.split();

    if tx.send(WsMessage::Connected).await.is_err() {
        return Ok(());
    }

    let mut ping_timer = tokio::time::interval(config.ping_interval);
    ping_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    ping_timer.tick().await; // first tick fires immediately

    loop {
        tokio::select! {
            outbound = send_rx.recv() => {
                match outbound {
                    Some(text) => sink
                        .send(Message::Text(text))
                        .await
                        .map_err(|e| WsError::StreamEnded(e.to_string()))?,
                    None => return Ok(()),
                }
            }
            frame = reader.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        if tx.send(WsMessage::Text(text)).await.is_err() {
                            return Ok(());
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        sink.send(Message::Pong(payload))
                            .await
                            .map_err(|e| WsError::StreamEnded(e.to_string()))?;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        return Err(WsError::StreamEnded("connection closed".to_string()));
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        return Err(WsError::StreamEnded(e.to_string()));
                    }
                }
            }
            _ = ping_timer.tick() => {
                sink.send(Message::Ping(Vec::new()))
                    .await
                    .map_err(|e| WsError::StreamEnded(e.to_string()))?;
            }
        }
    }
}
