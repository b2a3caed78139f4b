use std::fmt;

use tracing::{
    Event,
    field::{Field, Visit},
};
use withcaller::{Level, LogEvent, Property, Scalar, Value};

/// Map a `tracing` level onto the Bunyan level values.
pub(crate) fn to_level(level: &tracing::Level) -> Level {
    match *level {
        tracing::Level::TRACE => Level::TRACE,
        tracing::Level::DEBUG => Level::DEBUG,
        tracing::Level::INFO => Level::INFO,
        tracing::Level::WARN => Level::WARN,
        _ => Level::ERROR,
    }
}

/// Build a [`LogEvent`] from a `tracing` event.
///
/// The `message` field becomes the message, every other field becomes a property.
pub(crate) fn to_log_event(event: &Event<'_>) -> LogEvent {
    let metadata = event.metadata();
    let mut fields = EventFields::default();
    event.record(&mut fields);

    let mut log_event = LogEvent::new(
        to_level(metadata.level()),
        metadata.target(),
        fields.message.unwrap_or_default(),
    );
    for property in fields.properties {
        log_event.add_property_if_absent(property);
    }

    log_event
}

#[derive(Debug, Default)]
pub(crate) struct EventFields {
    message: Option<String>,
    properties: Vec<Property>,
}

impl EventFields {
    const MESSAGE: &'static str = "message";

    fn record_scalar(&mut self, field: &Field, value: Scalar) {
        self.properties
            .push(Property::new(field.name(), Value::Scalar(value)));
    }
}

impl Visit for EventFields {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            Self::MESSAGE => self.message = Some(format!("{value:?}")),
            _ => self.record_scalar(field, Scalar::Str(format!("{value:?}"))),
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            Self::MESSAGE => self.message = Some(value.to_owned()),
            _ => self.record_scalar(field, Scalar::Str(value.to_owned())),
        }
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record_scalar(field, Scalar::F64(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_scalar(field, Scalar::I64(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_scalar(field, Scalar::U64(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record_scalar(field, Scalar::Bool(value));
    }
}
