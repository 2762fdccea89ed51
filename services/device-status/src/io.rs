//! Event stream connection abstraction for testability

use std::collections::VecDeque;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};

const EVENT_STREAM_MIME: &str = "text/event-stream";

/// Longest line accepted from a stream before the connection is dropped
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Trait for reading lines from an open event stream
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait LineReader: Send {
    /// Read the next line, without its terminator
    ///
    /// Returns `Ok(None)` once the server closed the stream.
    async fn read_line(&mut self) -> crate::Result<Option<String>>;
}

/// Abstraction over opening an event stream, for dependency injection
///
/// Failures reported as `DeviceStatusError::Http` are network level and worth
/// retrying; any other error means the endpoint is not an event stream.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait StreamConnector: Send + Sync {
    /// Open `url`, sending `Last-Event-ID` when `last_event_id` is not empty
    async fn connect(&self, url: &str, last_event_id: &str) -> crate::Result<Box<dyn LineReader>>;
}

/// Splits a byte stream on `\r\n`, `\n` and `\r`
///
/// A `\r\n` pair split across two chunks counts as one terminator.
#[derive(Debug)]
pub struct LineSplitter {
    buffer: Vec<u8>,
    lines: VecDeque<String>,
    skip_lf: bool,
    max_line_len: usize,
}

impl Default for LineSplitter {
    fn default() -> Self {
        Self::with_max_line_len(MAX_LINE_LEN)
    }
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line_len(max_line_len: usize) -> Self {
        Self {
            buffer: Vec::new(),
            lines: VecDeque::new(),
            skip_lf: false,
            max_line_len,
        }
    }

    /// Append a chunk; fails once an unterminated line exceeds the limit
    pub fn push(&mut self, bytes: &[u8]) -> crate::Result<()> {
        for &b in bytes {
            if self.skip_lf {
                self.skip_lf = false;
                if b == b'\n' {
                    continue;
                }
            }
            match b {
                b'\n' => self.emit(),
                b'\r' => {
                    self.emit();
                    self.skip_lf = true;
                }
                _ => {
                    if self.buffer.len() >= self.max_line_len {
                        self.buffer.clear();
                        return Err(crate::DeviceStatusError::Stream(format!(
                            "Line exceeds {} bytes",
                            self.max_line_len
                        )));
                    }
                    self.buffer.push(b);
                }
            }
        }
        Ok(())
    }

    pub fn next_line(&mut self) -> Option<String> {
        self.lines.pop_front()
    }

    fn emit(&mut self) {
        let line = String::from_utf8_lossy(&self.buffer).into_owned();
        self.buffer.clear();
        self.lines.push_back(line);
    }
}

/// Production connector using reqwest
#[derive(Default)]
pub struct ReqwestConnector {
    client: reqwest::Client,
}

impl ReqwestConnector {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StreamConnector for ReqwestConnector {
    async fn connect(&self, url: &str, last_event_id: &str) -> crate::Result<Box<dyn LineReader>> {
        tracing::debug!("GET {} (Last-Event-ID: {:?})", url, last_event_id);
        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, EVENT_STREAM_MIME)
            .header(CACHE_CONTROL, "no-cache");
        if !last_event_id.is_empty() {
            request = request.header("Last-Event-ID", last_event_id);
        }

        let response = request
            .send()
            .await
            .map_err(|e| crate::DeviceStatusError::Http(format!("GET {} failed: {}", url, e)))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(crate::DeviceStatusError::Stream(format!(
                "GET {} returned status {}",
                url, status
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !is_event_stream(&content_type) {
            return Err(crate::DeviceStatusError::Stream(format!(
                "GET {} returned content type '{}'",
                url, content_type
            )));
        }

        tracing::debug!("GET {} -> {} ({})", url, status, content_type);
        Ok(Box::new(ReqwestLineReader {
            response,
            splitter: LineSplitter::new(),
        }))
    }
}

fn is_event_stream(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|mime| mime.trim().eq_ignore_ascii_case(EVENT_STREAM_MIME))
        .unwrap_or(false)
}

/// Reads lines from a chunked reqwest response body
pub struct ReqwestLineReader {
    response: reqwest::Response,
    splitter: LineSplitter,
}

#[async_trait]
impl LineReader for ReqwestLineReader {
    async fn read_line(&mut self) -> crate::Result<Option<String>> {
        loop {
            if let Some(line) = self.splitter.next_line() {
                return Ok(Some(line));
            }
            match self.response.chunk().await {
                Ok(Some(bytes)) => self.splitter.push(&bytes)?,
                // An unterminated trailing line never completes an event
                Ok(None) => return Ok(None),
                Err(e) => {
                    return Err(crate::DeviceStatusError::Stream(format!(
                        "Reading event stream: {}",
                        e
                    )))
                }
            }
        }
    }
}
