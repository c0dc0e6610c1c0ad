//! Hand-driven feed for tests and offline replays

use super::{EventCallback, MarketDataFeed};
use crate::domain::BookEvent;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// A feed whose events come from `emit` calls instead of a transport.
///
/// Delivery is synchronous on the calling thread, which makes service
/// behavior fully deterministic.
#[derive(Default)]
pub struct ManualFeed {
    callback: Mutex<Option<EventCallback>>,
    subscriptions: Mutex<Vec<String>>,
    running: AtomicBool,
}

impl ManualFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one event to the registered callback.
    ///
    /// Events are delivered even when the feed is stopped; the service
    /// treats post-stop delivery as a protocol quirk, not an error.
    pub fn emit(&self, event: BookEvent) {
        let callback = self
            .callback
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(callback) = callback {
            callback(event);
        }
    }

    /// Token ids subscribed so far
    pub fn subscriptions(&self) -> Vec<String> {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl MarketDataFeed for ManualFeed {
    fn set_on_event(&self, callback: EventCallback) {
        *self
            .callback
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(callback);
    }

    fn subscribe(&self, token_id: &str) {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(token_id.to_string());
    }

    fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}
