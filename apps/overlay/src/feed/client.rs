//! WebSocket feed client.
//!
//! Holds one connection at a time to the URL currently published on the
//! watch channel. Text frames go to the dispatcher. A lost connection is
//! retried after `reconnect_delay`; publishing a new URL drops the current
//! connection and connects to the new one right away. The client stops when
//! every URL sender is gone.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::feed::Dispatcher;

pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

enum SessionEnd {
    Lost,
    UrlChanged,
    Shutdown,
}

impl SessionEnd {
    fn from_watch(changed: Result<(), watch::error::RecvError>) -> Self {
        match changed {
            Ok(()) => SessionEnd::UrlChanged,
            Err(_) => SessionEnd::Shutdown,
        }
    }
}

pub struct FeedClient {
    url: watch::Receiver<String>,
    dispatcher: Arc<Dispatcher>,
    reconnect_delay: Duration,
    state: Arc<RwLock<ConnectionState>>,
}

impl FeedClient {
    pub fn new(
        url: watch::Receiver<String>,
        dispatcher: Arc<Dispatcher>,
        reconnect_delay: Duration,
    ) -> Self {
        Self {
            url,
            dispatcher,
            reconnect_delay,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
        }
    }

    /// Shared view of the connection state.
    pub fn state(&self) -> Arc<RwLock<ConnectionState>> {
        Arc::clone(&self.state)
    }

    fn set_state(&self, next: ConnectionState) {
        *self.state.write() = next;
    }

    pub async fn run(mut self) {
        loop {
            let url = self.url.borrow_and_update().clone();
            match self.session(&url).await {
                SessionEnd::UrlChanged => {
                    let next = self.url.borrow().clone();
                    info!(from = %url, to = %next, "feed url changed, reconnecting");
                }
                SessionEnd::Shutdown => break,
                SessionEnd::Lost => {
                    self.set_state(ConnectionState::Reconnecting);
                    debug!(delay_ms = self.reconnect_delay.as_millis() as u64, "waiting to reconnect");
                    tokio::select! {
                        _ = tokio::time::sleep(self.reconnect_delay) => {}
                        changed = self.url.changed() => {
                            if changed.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        }
        self.set_state(ConnectionState::Disconnected);
        info!("feed client stopped");
    }

    async fn session(&mut self, url: &str) -> SessionEnd {
        self.set_state(ConnectionState::Connecting);
        let connected = tokio::select! {
            result = tokio_tungstenite::connect_async(url) => result,
            changed = self.url.changed() => return SessionEnd::from_watch(changed),
        };
        let mut stream = match connected {
            Ok((stream, _response)) => stream,
            Err(e) => {
                warn!(url, error = %e, "feed connection failed");
                return SessionEnd::Lost;
            }
        };
        self.set_state(ConnectionState::Connected);
        info!(url, "feed connected");

        loop {
            tokio::select! {
                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(e) = self.dispatcher.dispatch_text(&text) {
                            warn!(error = %e, "dropping feed frame");
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        info!(url, ?frame, "feed closed by server");
                        return SessionEnd::Lost;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(url, error = %e, "feed connection error");
                        return SessionEnd::Lost;
                    }
                    None => {
                        info!(url, "feed stream ended");
                        return SessionEnd::Lost;
                    }
                },
                changed = self.url.changed() => {
                    if let Err(e) = stream.close(None).await {
                        debug!(error = %e, "closing feed connection");
                    }
                    return SessionEnd::from_watch(changed);
                }
            }
        }
    }
}
