//! Realtime feed: the `{ tag, payload }` envelope, event handlers and the
//! dispatcher that routes `runtime-data` events to them.

pub mod client;
pub mod log;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use client::{ConnectionState, FeedClient};
pub use log::{LogEntry, LogKind, MessageLog};

pub const RUNTIME_DATA_TAG: &str = "runtime-data";

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("malformed feed message: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedMessage {
    pub tag: String,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

/// Consumes one feed event. Returns `true` when the event was handled.
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &str, data: &Value) -> bool;
}

impl<F> EventHandler for F
where
    F: Fn(&str, &Value) -> bool + Send + Sync,
{
    fn handle(&self, event: &str, data: &Value) -> bool {
        self(event, data)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DispatchOptions {
    pub ignore_other_tags: bool,
    pub ignore_unhandled_events: bool,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            ignore_other_tags: true,
            ignore_unhandled_events: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub handled: Vec<String>,
    pub unhandled: Vec<String>,
}

pub struct Dispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
    options: DispatchOptions,
    log: Arc<MessageLog>,
}

impl Dispatcher {
    pub fn new(options: DispatchOptions, log: Arc<MessageLog>) -> Self {
        Self {
            handlers: Vec::new(),
            options,
            log,
        }
    }

    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn log(&self) -> &Arc<MessageLog> {
        &self.log
    }

    /// Every handler sees every event; an event counts as handled if any of
    /// them accepted it.
    pub fn dispatch(&self, message: &FeedMessage) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        self.log.record(
            LogKind::Tag,
            &message.tag,
            &Value::Object(message.payload.clone()),
        );

        if message.tag != RUNTIME_DATA_TAG {
            if !self.options.ignore_other_tags {
                info!(tag = %message.tag, payload = ?message.payload, "received message with tag");
            }
            return outcome;
        }

        for (event, data) in &message.payload {
            self.log.record(LogKind::Event, event, data);
            let handled = self
                .handlers
                .iter()
                .fold(false, |handled, handler| handler.handle(event, data) || handled);
            if handled {
                outcome.handled.push(event.clone());
            } else {
                if !self.options.ignore_unhandled_events {
                    warn!(tag = %message.tag, event = %event, data = %data, "unhandled event");
                }
                outcome.unhandled.push(event.clone());
            }
        }
        debug!(
            handled = outcome.handled.len(),
            unhandled = outcome.unhandled.len(),
            "dispatched runtime data"
        );
        outcome
    }

    pub fn dispatch_text(&self, raw: &str) -> Result<DispatchOutcome, FeedError> {
        let message: FeedMessage = serde_json::from_str(raw)?;
        Ok(self.dispatch(&message))
    }
}
