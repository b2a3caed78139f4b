//! Destinations for enriched log events.

use std::{
    fmt::Write as _,
    fs,
    io::{self, Write as _},
    path::Path,
    sync::{Arc, Mutex},
};

use jiff::tz::TimeZone;
use withcaller::{CALLER_PROPERTY, LogEvent};

/// Receives enriched log events.
pub trait Sink: Send + Sync + 'static {
    fn emit(&self, event: LogEvent) -> io::Result<()>;
}

/// Keeps every event in memory.
///
/// Clones share the same storage, keep one clone to inspect the events after handing the other
/// to a layer.
#[derive(Debug, Clone, Default)]
pub struct InMemorySink {
    events: Arc<Mutex<Vec<LogEvent>>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the events emitted so far.
    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().expect("poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().expect("poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.events.lock().expect("poisoned").clear();
    }
}

impl Sink for InMemorySink {
    fn emit(&self, event: LogEvent) -> io::Result<()> {
        self.events.lock().expect("poisoned").push(event);
        Ok(())
    }
}

/// Flushes the writer of a [`TextSink`] or [`JsonSink`] after it has been moved into a layer.
pub struct Flusher<W>
where
    W: io::Write,
{
    writer: Arc<Mutex<io::BufWriter<W>>>,
}

impl<W> Flusher<W>
where
    W: io::Write,
{
    pub fn flush(&self) -> io::Result<()> {
        let mut guard = self.writer.lock().expect("poisoned");
        guard.flush()
    }
}

/// Writes one human readable line per event.
///
/// Lines have the form `[HH:MM:SS LVL] message (at Caller) Name=value ...`, with the time in UTC.
/// The caller part is omitted when the event has no `Caller` property.
pub struct TextSink<W>
where
    W: io::Write,
{
    writer: Arc<Mutex<io::BufWriter<W>>>,
}

impl TextSink<fs::File> {
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = fs::File::create(path)?;
        Ok(Self::new(file))
    }
}

impl<W> TextSink<W>
where
    W: io::Write,
{
    pub fn new(inner: W) -> Self {
        Self {
            writer: Arc::new(Mutex::new(io::BufWriter::new(inner))),
        }
    }

    pub fn flusher(&self) -> Flusher<W> {
        Flusher {
            writer: Arc::clone(&self.writer),
        }
    }
}

/// Render `event` the way [`TextSink`] writes it, without the trailing newline.
pub fn format_text(event: &LogEvent) -> String {
    let time = event.timestamp.to_zoned(TimeZone::UTC);
    let mut line = format!(
        "[{time} {level}] {message}",
        time = time.strftime("%H:%M:%S"),
        level = event.level,
        message = event.message,
    );

    // Writing to a String is infallible.
    if let Some(caller) = event.property(CALLER_PROPERTY) {
        let _ = match caller.as_str() {
            // Flat strings are written unquoted, other values in their display form.
            Some(flat) => write!(line, " (at {flat})"),
            None => write!(line, " (at {caller})"),
        };
    }
    for prop in event.properties().iter() {
        if prop.name == CALLER_PROPERTY {
            continue;
        }
        let _ = write!(line, " {}={}", prop.name, prop.value);
    }

    line
}

impl<W> Sink for TextSink<W>
where
    W: io::Write + Send + 'static,
{
    fn emit(&self, event: LogEvent) -> io::Result<()> {
        let line = format_text(&event);
        let mut guard = self.writer.lock().expect("poisoned");
        writeln!(guard, "{line}")
    }
}

/// Writes one JSON object per event, separated by newlines.
pub struct JsonSink<W>
where
    W: io::Write,
{
    writer: Arc<Mutex<io::BufWriter<W>>>,
}

impl<W> JsonSink<W>
where
    W: io::Write,
{
    pub fn new(inner: W) -> Self {
        Self {
            writer: Arc::new(Mutex::new(io::BufWriter::new(inner))),
        }
    }

    pub fn flusher(&self) -> Flusher<W> {
        Flusher {
            writer: Arc::clone(&self.writer),
        }
    }
}

impl<W> Sink for JsonSink<W>
where
    W: io::Write + Send + 'static,
{
    fn emit(&self, event: LogEvent) -> io::Result<()> {
        let mut guard = self.writer.lock().expect("poisoned");
        serde_json::to_writer(&mut *guard, &event)?;
        guard.write_all(b"\n")
    }
}
