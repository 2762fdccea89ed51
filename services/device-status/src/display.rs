//! Display sinks the status values are written to

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

/// A named slot on the status display
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Element {
    Clock,
    Ssid,
    Rssi,
    Voltage,
    Mqtt,
}

impl Element {
    /// Slots written for every status message
    pub const STATUS: [Element; 4] = [
        Element::Clock,
        Element::Ssid,
        Element::Rssi,
        Element::Voltage,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Element::Clock => "h-clock",
            Element::Ssid => "h-ssid",
            Element::Rssi => "h-rssi",
            Element::Voltage => "h-voltage",
            Element::Mqtt => "h-mqtt",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "h-clock" => Some(Element::Clock),
            "h-ssid" => Some(Element::Ssid),
            "h-rssi" => Some(Element::Rssi),
            "h-voltage" => Some(Element::Voltage),
            "h-mqtt" => Some(Element::Mqtt),
            _ => None,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Target for rendered status text
///
/// Each write replaces the slot's whole content.
#[cfg_attr(test, mockall::automock)]
pub trait StatusDisplay: Send {
    fn set_text(&mut self, element: Element, text: &str) -> crate::Result<()>;
}

/// In-memory display with a fixed set of slots
///
/// Writing to a slot that was not declared fails with `MissingElement`.
#[derive(Debug, Clone, Default)]
pub struct MemoryDisplay {
    slots: BTreeMap<Element, String>,
    writes: usize,
}

impl MemoryDisplay {
    pub fn new(elements: &[Element]) -> Self {
        Self {
            slots: elements.iter().map(|e| (*e, String::new())).collect(),
            writes: 0,
        }
    }

    /// Display with `h-clock`, `h-ssid`, `h-rssi` and `h-voltage`
    pub fn with_status_elements() -> Self {
        Self::new(&Element::STATUS)
    }

    pub fn text(&self, element: Element) -> Option<&str> {
        self.slots.get(&element).map(String::as_str)
    }

    /// Number of successful writes so far
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl StatusDisplay for MemoryDisplay {
    fn set_text(&mut self, element: Element, text: &str) -> crate::Result<()> {
        let slot = self
            .slots
            .get_mut(&element)
            .ok_or_else(|| crate::DeviceStatusError::MissingElement(element.id().to_string()))?;
        slot.clear();
        slot.push_str(text);
        self.writes += 1;
        Ok(())
    }
}

/// Writes `<id>: <text>` lines to a terminal or any other writer
pub struct ConsoleDisplay<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> ConsoleDisplay<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> StatusDisplay for ConsoleDisplay<W> {
    fn set_text(&mut self, element: Element, text: &str) -> crate::Result<()> {
        writeln!(self.writer, "{}: {}", element.id(), text)?;
        self.writer.flush()?;
        Ok(())
    }
}
