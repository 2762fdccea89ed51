//! Status display binder: event stream in, display writes out

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::display::{Element, StatusDisplay};
use crate::event_source::{EventSource, EventSourceOptions, ReadyState, SourceEvent};
use crate::format::{SignalRange, StatusView};
use crate::io::StreamConnector;
use crate::message::DeviceStatusMessage;
use crate::sse::DEFAULT_EVENT_TYPE;

/// The handlers reacting to subscription events
///
/// Kept apart from the subscription so a single event can be driven
/// without a connection.
#[derive(Debug)]
pub struct StatusHandlers<D: StatusDisplay> {
    display: D,
    event_name: String,
    signal_range: SignalRange,
}

impl<D: StatusDisplay> StatusHandlers<D> {
    pub fn new(display: D, event_name: &str, signal_range: SignalRange) -> Self {
        Self {
            display,
            event_name: event_name.to_string(),
            signal_range,
        }
    }

    pub fn from_config(display: D, config: &Config) -> Self {
        Self::new(display, &config.event_name, config.signal_range)
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn into_display(self) -> D {
        self.display
    }

    /// Dispatch one event to its handler
    pub fn handle_event(&mut self, event: &SourceEvent) -> crate::Result<()> {
        match event {
            SourceEvent::Open => {
                self.on_open();
                Ok(())
            }
            SourceEvent::Error { ready_state } => {
                self.on_error(*ready_state);
                Ok(())
            }
            SourceEvent::Message(message) => {
                if message.event_type == DEFAULT_EVENT_TYPE {
                    self.on_message(&message.data);
                }
                if message.event_type == self.event_name {
                    return self.on_device_status(&message.data);
                }
                if message.event_type != DEFAULT_EVENT_TYPE {
                    tracing::trace!("No handler for '{}' event", message.event_type);
                }
                Ok(())
            }
        }
    }

    fn on_open(&self) {
        tracing::info!("Device status: Opened");
    }

    fn on_error(&self, ready_state: ReadyState) {
        if ready_state != ReadyState::Open {
            tracing::info!("Device status: Closed");
        }
    }

    fn on_message(&self, data: &str) {
        tracing::info!("Device status: {}", data);
    }

    fn on_device_status(&mut self, data: &str) -> crate::Result<()> {
        if data.is_empty() {
            return Ok(());
        }

        let message = DeviceStatusMessage::decode(data)?;
        let view = StatusView::from_message(&message, &self.signal_range)?;
        tracing::debug!("Rendering {:?}", view);

        self.display.set_text(Element::Clock, &view.clock)?;
        self.display.set_text(Element::Ssid, &view.ssid)?;
        self.display.set_text(Element::Rssi, &view.rssi)?;
        self.display.set_text(Element::Voltage, &view.voltage)?;
        // TODO: write view.mqtt to Element::Mqtt once the firmware flag layout is final
        Ok(())
    }
}

/// Binds a device's status event stream to a display
#[derive(Debug)]
pub struct StatusBinder<D: StatusDisplay> {
    source: EventSource,
    handlers: StatusHandlers<D>,
}

impl<D: StatusDisplay + 'static> StatusBinder<D> {
    /// Subscribe to `config.url`; the connection is opened immediately
    ///
    /// The subscription lives until `cancel` fires.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime, since the connection task
    /// is spawned here.
    pub fn new(
        config: &Config,
        connector: Arc<dyn StreamConnector>,
        display: D,
        cancel: CancellationToken,
    ) -> Self {
        let source = EventSource::open(
            &config.url,
            connector,
            EventSourceOptions::from(config),
            cancel,
        );
        Self {
            source,
            handlers: StatusHandlers::from_config(display, config),
        }
    }

    pub fn url(&self) -> &str {
        self.source.url()
    }

    pub async fn ready_state(&self) -> ReadyState {
        self.source.ready_state().await
    }

    /// Start handling events in the background
    ///
    /// The task hands the display back once the subscription has ended.
    pub fn init(self) -> JoinHandle<D> {
        tokio::spawn(self.run())
    }

    /// Handle events one at a time until the subscription ends
    ///
    /// A failing handler is reported and the next event is processed.
    pub async fn run(mut self) -> D {
        while let Some(event) = self.source.next_event().await {
            if let Err(e) = self.handlers.handle_event(&event) {
                tracing::error!("Device status handler failed: {}", e);
            }
        }
        tracing::debug!("Subscription to {} ended", self.source.url());
        self.handlers.into_display()
    }
}
