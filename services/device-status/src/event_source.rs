//! Persistent event stream subscription
//!
//! Mirrors the browser `EventSource`: the connection is opened as soon as the
//! source is created, dropped streams are re-established after the retry
//! delay, and endpoints that are not event streams close the source for good.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::io::StreamConnector;
use crate::sse::{SseEvent, SseLine, SseParser};
use crate::DeviceStatusError;

/// Connection state of an event source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Connecting,
    Open,
    Closed,
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadyState::Connecting => write!(f, "Connecting"),
            ReadyState::Open => write!(f, "Open"),
            ReadyState::Closed => write!(f, "Closed"),
        }
    }
}

/// Notification delivered to the subscriber
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    Open,
    /// Connection lost or refused; carries the state right after the failure
    Error { ready_state: ReadyState },
    Message(SseEvent),
}

#[derive(Debug, Clone)]
pub struct EventSourceOptions {
    /// Delay before reconnecting until the server sends `retry:`
    pub retry: Duration,
    pub channel_capacity: usize,
}

impl Default for EventSourceOptions {
    fn default() -> Self {
        Self {
            retry: Duration::from_millis(3000),
            channel_capacity: 100,
        }
    }
}

impl From<&crate::Config> for EventSourceOptions {
    fn from(config: &crate::Config) -> Self {
        Self {
            retry: Duration::from_millis(config.retry_ms),
            channel_capacity: config.channel_capacity,
        }
    }
}

/// An open subscription to a server-sent event endpoint
pub struct EventSource {
    url: String,
    ready_state: Arc<RwLock<ReadyState>>,
    events: mpsc::Receiver<SourceEvent>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl fmt::Debug for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSource").field("url", &self.url).finish()
    }
}

impl EventSource {
    /// Start connecting to `url` right away
    ///
    /// The subscription ends when `cancel` fires or the endpoint is rejected.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn open(
        url: &str,
        connector: Arc<dyn StreamConnector>,
        options: EventSourceOptions,
        cancel: CancellationToken,
    ) -> Self {
        let (sender, events) = mpsc::channel(options.channel_capacity.max(1));
        let ready_state = Arc::new(RwLock::new(ReadyState::Connecting));

        let task = tokio::spawn(run_source(
            url.to_string(),
            connector,
            options.retry,
            Arc::clone(&ready_state),
            sender,
            cancel.clone(),
        ));

        tracing::debug!("Opened event source for {}", url);
        Self {
            url: url.to_string(),
            ready_state,
            events,
            cancel,
            task,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn ready_state(&self) -> ReadyState {
        *self.ready_state.read().await
    }

    /// Next event in arrival order, `None` once the source is closed and drained
    pub async fn next_event(&mut self) -> Option<SourceEvent> {
        self.events.recv().await
    }

    /// Stop the subscription and wait for the connection task to finish
    pub async fn close(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            tracing::warn!("Event source task for {} failed: {}", self.url, e);
        }
    }
}

fn is_retryable(error: &DeviceStatusError) -> bool {
    matches!(error, DeviceStatusError::Http(_) | DeviceStatusError::Io(_))
}

async fn set_state(ready_state: &RwLock<ReadyState>, state: ReadyState) {
    *ready_state.write().await = state;
}

async fn run_source(
    url: String,
    connector: Arc<dyn StreamConnector>,
    mut retry: Duration,
    ready_state: Arc<RwLock<ReadyState>>,
    sender: mpsc::Sender<SourceEvent>,
    cancel: CancellationToken,
) {
    let mut parser = SseParser::new();

    'connection: loop {
        set_state(&ready_state, ReadyState::Connecting).await;

        let result = tokio::select! {
            r = connector.connect(&url, parser.last_event_id()) => r,
            _ = cancel.cancelled() => break 'connection,
        };

        match result {
            Ok(mut reader) => {
                set_state(&ready_state, ReadyState::Open).await;
                tracing::debug!("Event stream {} open", url);
                if sender.send(SourceEvent::Open).await.is_err() {
                    break 'connection;
                }

                loop {
                    let line = tokio::select! {
                        l = reader.read_line() => l,
                        _ = cancel.cancelled() => break 'connection,
                    };
                    match line {
                        Ok(Some(line)) => match parser.feed_line(&line) {
                            SseLine::Pending => {}
                            SseLine::Retry(ms) => {
                                tracing::debug!("Server set reconnection delay to {} ms", ms);
                                retry = Duration::from_millis(ms);
                            }
                            SseLine::Event(event) => {
                                if sender.send(SourceEvent::Message(event)).await.is_err() {
                                    break 'connection;
                                }
                            }
                        },
                        Ok(None) => {
                            tracing::debug!("Event stream {} ended by server", url);
                            break;
                        }
                        Err(e) => {
                            tracing::warn!("Event stream {} failed: {}", url, e);
                            break;
                        }
                    }
                }

                parser.reset();
                set_state(&ready_state, ReadyState::Connecting).await;
                let error = SourceEvent::Error {
                    ready_state: ReadyState::Connecting,
                };
                if sender.send(error).await.is_err() {
                    break 'connection;
                }
            }
            Err(e) if is_retryable(&e) => {
                tracing::warn!("Connecting to {} failed: {}", url, e);
                let error = SourceEvent::Error {
                    ready_state: ReadyState::Connecting,
                };
                if sender.send(error).await.is_err() {
                    break 'connection;
                }
            }
            Err(e) => {
                tracing::error!("Giving up on {}: {}", url, e);
                set_state(&ready_state, ReadyState::Closed).await;
                let _ = sender
                    .send(SourceEvent::Error {
                        ready_state: ReadyState::Closed,
                    })
                    .await;
                return;
            }
        }

        tracing::debug!("Reconnecting to {} in {:?}", url, retry);
        tokio::select! {
            _ = tokio::time::sleep(retry) => {}
            _ = cancel.cancelled() => break 'connection,
        }
    }

    set_state(&ready_state, ReadyState::Closed).await;
    tracing::debug!("Event source for {} closed", url);
}
