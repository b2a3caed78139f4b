//! A `tracing-subscriber` layer that records the caller of every event.
//!
//! ```no_run
//! use tracing_subscriber::prelude::*;
//! use withcaller_subscriber::{CallerLayer, TextSink};
//!
//! let layer = CallerLayer::new(TextSink::new(std::io::stdout())).include_file_info(true);
//! tracing_subscriber::registry().with(layer).init();
//!
//! tracing::info!("Hello, who is calling me?");
//! ```

mod layer;
mod sink;
mod visit;

pub use layer::CallerLayer;
pub use sink::{Flusher, InMemorySink, JsonSink, Sink, TextSink, format_text};
