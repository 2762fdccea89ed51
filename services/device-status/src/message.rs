//! Status payload published by the device

use serde::{Deserialize, Serialize};

/// Bit in `flags` set while the device holds an MQTT connection
pub const FLAG_MQTT_CONNECTED: u32 = 1 << 0;

/// One `deviceStatus` reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatusMessage {
    /// Unix epoch seconds
    pub ts: i64,
    pub ssid: String,
    /// Signal strength in dBm
    pub rssi: f64,
    pub voltage: f64,
    /// Firmware status bits, absent on older devices
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<u32>,
}

impl DeviceStatusMessage {
    /// Decode a JSON event payload
    pub fn decode(payload: &str) -> crate::Result<Self> {
        let message = serde_json::from_str(payload)?;
        Ok(message)
    }

    /// `None` when the device did not report flags
    pub fn is_mqtt_connected(&self) -> Option<bool> {
        self.flags.map(|f| f & FLAG_MQTT_CONNECTED != 0)
    }
}
