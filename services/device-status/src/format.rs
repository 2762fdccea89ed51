//! Formatting of status readings into display strings

use chrono::{DateTime, Local, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

use crate::message::DeviceStatusMessage;

/// Reference range for converting dBm into a quality percentage
///
/// `max_dbm` maps to 100 % and `min_dbm` to 0 %. Readings outside the range
/// produce percentages outside [0, 100]; they are not clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalRange {
    pub max_dbm: f64,
    pub min_dbm: f64,
}

impl Default for SignalRange {
    fn default() -> Self {
        Self {
            max_dbm: 0.0,
            min_dbm: -100.0,
        }
    }
}

impl SignalRange {
    /// `100 * (1 - (max - rssi) / (max - min))`
    pub fn to_percentage(&self, rssi: f64) -> f64 {
        100.0 * (1.0 - (self.max_dbm - rssi) / (self.max_dbm - self.min_dbm))
    }
}

/// `HH:MM` (24h) for a Unix timestamp in the local time zone
pub fn format_clock(ts: i64) -> crate::Result<String> {
    format_clock_in(ts, &Local)
}

/// `HH:MM` (24h) for a Unix timestamp in the given time zone
pub fn format_clock_in<Tz: TimeZone>(ts: i64, tz: &Tz) -> crate::Result<String> {
    let utc =
        DateTime::from_timestamp(ts, 0).ok_or(crate::DeviceStatusError::InvalidTimestamp(ts))?;
    let local = utc.with_timezone(tz);
    Ok(format!("{:02}:{:02}", local.hour(), local.minute()))
}

pub fn format_percentage(percentage: f64) -> String {
    to_fixed_2(percentage)
}

pub fn format_voltage(voltage: f64) -> String {
    format!("{}V", to_fixed_2(voltage))
}

/// Two decimals, rounding half away from zero on the exact binary value
///
/// `format!("{:.2}")` rounds exact ties such as 3.125 to even, which would
/// render "3.12" where the monitor page shows "3.13".
fn to_fixed_2(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
        return text.to_string();
    }

    // A finite f64 never has more than 1074 fractional digits
    let exact = format!("{:.1074}", value.abs());
    let (whole, fraction) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let fraction = fraction.as_bytes();

    let mut digits: Vec<u8> = whole
        .bytes()
        .chain(fraction.iter().copied().chain(std::iter::repeat(b'0')).take(2))
        .collect();

    if fraction.get(2).is_some_and(|&d| d >= b'5') {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
    }

    let split = digits.len() - 2;
    let sign = if value < 0.0 { "-" } else { "" };
    format!(
        "{}{}.{}",
        sign,
        String::from_utf8_lossy(&digits[..split]),
        String::from_utf8_lossy(&digits[split..])
    )
}

pub fn format_mqtt(connected: Option<bool>) -> String {
    match connected {
        Some(true) => "Connected".to_string(),
        Some(false) => "Disconnected".to_string(),
        None => String::new(),
    }
}

/// Display strings derived from one status message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub clock: String,
    pub ssid: String,
    pub rssi: String,
    pub voltage: String,
    pub mqtt: String,
}

impl StatusView {
    /// Format a message using the local time zone
    pub fn from_message(message: &DeviceStatusMessage, range: &SignalRange) -> crate::Result<Self> {
        Self::from_message_in(message, range, &Local)
    }

    pub fn from_message_in<Tz: TimeZone>(
        message: &DeviceStatusMessage,
        range: &SignalRange,
        tz: &Tz,
    ) -> crate::Result<Self> {
        Ok(Self {
            clock: format_clock_in(message.ts, tz)?,
            ssid: message.ssid.clone(),
            rssi: format_percentage(range.to_percentage(message.rssi)),
            voltage: format_voltage(message.voltage),
            mqtt: format_mqtt(message.is_mqtt_connected()),
        })
    }
}
