//! Server-sent event stream interpretation
//!
//! Lines are fed one at a time, without their terminator. A blank line
//! dispatches the event collected so far, following the event stream
//! processing rules of the HTML Living Standard.

/// Event type used when the stream does not name one
pub const DEFAULT_EVENT_TYPE: &str = "message";

/// A dispatched server-sent event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event_type: String,
    pub data: String,
    pub last_event_id: String,
}

impl SseEvent {
    pub fn new(event_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            data: data.into(),
            last_event_id: String::new(),
        }
    }
}

/// Outcome of feeding one line to the parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseLine {
    /// Nothing to act on yet
    Pending,
    /// A complete event
    Event(SseEvent),
    /// The server changed the reconnection delay (milliseconds)
    Retry(u64),
}

/// Incremental event stream parser
#[derive(Debug, Default)]
pub struct SseParser {
    event_type: String,
    data: String,
    last_event_id: String,
    started: bool,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id carried over to the next connection as `Last-Event-ID`
    pub fn last_event_id(&self) -> &str {
        &self.last_event_id
    }

    /// Drop a half-collected event, e.g. when the connection is lost
    pub fn reset(&mut self) {
        self.event_type.clear();
        self.data.clear();
        self.started = false;
    }

    pub fn feed_line(&mut self, line: &str) -> SseLine {
        let line = if self.started {
            line
        } else {
            self.started = true;
            line.strip_prefix('\u{feff}').unwrap_or(line)
        };

        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return SseLine::Pending;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => {
                self.event_type.clear();
                self.event_type.push_str(value);
            }
            "data" => {
                self.data.push_str(value);
                self.data.push('\n');
            }
            "id" => {
                if !value.contains('\0') {
                    self.last_event_id.clear();
                    self.last_event_id.push_str(value);
                }
            }
            "retry" => {
                if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
                    if let Ok(ms) = value.parse::<u64>() {
                        return SseLine::Retry(ms);
                    }
                }
            }
            other => {
                tracing::trace!("Ignoring unknown SSE field '{}'", other);
            }
        }
        SseLine::Pending
    }

    fn dispatch(&mut self) -> SseLine {
        if self.data.is_empty() {
            self.event_type.clear();
            return SseLine::Pending;
        }

        let mut data = std::mem::take(&mut self.data);
        if data.ends_with('\n') {
            data.pop();
        }
        let event_type = if self.event_type.is_empty() {
            DEFAULT_EVENT_TYPE.to_string()
        } else {
            std::mem::take(&mut self.event_type)
        };

        SseLine::Event(SseEvent {
            event_type,
            data,
            last_event_id: self.last_event_id.clone(),
        })
    }
}
