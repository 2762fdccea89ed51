//! BDD test world for device status service

use cucumber::World;
use device_status::format::SignalRange;
use device_status::sse::{SseEvent, SseParser};
use device_status::{MemoryDisplay, StatusHandlers};

#[derive(Debug, Default, World)]
pub struct DeviceStatusWorld {
    // Rendering
    pub handlers: Option<StatusHandlers<MemoryDisplay>>,
    pub signal_range: SignalRange,
    pub last_result: Option<device_status::Result<()>>,

    // Stream parsing
    pub parser: SseParser,
    pub parsed_events: Vec<SseEvent>,
    pub retry_ms: Option<u64>,
}
