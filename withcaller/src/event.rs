use std::fmt;

use jiff::Timestamp;
use serde::Serialize;

use crate::value::{Property, Structure, Value};

/// The level of a log event.
///
/// The levels are mapped as per the [Bunyan level suggestions].
///
/// | Value | Level |
/// |-------|-------|
/// | 10    | trace |
/// | 20    | debug |
/// | 30    | info  |
/// | 40    | warn  |
/// | 50    | error |
///
/// [Bunyan level suggestions]: https://github.com/trentm/node-bunyan?tab=readme-ov-file#levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Level(pub u8);

impl Level {
    pub const TRACE: Self = Self(10);
    pub const DEBUG: Self = Self(20);
    pub const INFO: Self = Self(30);
    pub const WARN: Self = Self(40);
    pub const ERROR: Self = Self(50);

    /// Three letter upper case label.
    pub fn short_label(&self) -> &'static str {
        match self.0 {
            0..=10 => "TRC",
            11..=20 => "DBG",
            21..=30 => "INF",
            31..=40 => "WRN",
            _ => "ERR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_label())
    }
}

/// A log event as seen by enrichers and sinks.
#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub timestamp: Timestamp,
    pub level: Level,
    pub target: String,
    pub message: String,
    properties: Structure,
}

impl LogEvent {
    /// Create an event with the current time and no properties.
    pub fn new(level: Level, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Timestamp::now(),
            level,
            target: target.into(),
            message: message.into(),
            properties: Structure::new(),
        }
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains(name)
    }

    /// Add `property` unless the event already carries a property with that name.
    ///
    /// Existing properties are never overwritten. Returns whether the property was added.
    pub fn add_property_if_absent(&mut self, property: Property) -> bool {
        self.properties.add_if_absent(property)
    }

    pub fn properties(&self) -> &Structure {
        &self.properties
    }
}
