use std::io;

use clap::{Parser, ValueEnum};
use tracing_subscriber::prelude::*;
use withcaller::{CallerEnricher, CallerProperties};
use withcaller_subscriber::{CallerLayer, JsonSink, TextSink};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// One human readable line per event
    Text,
    /// One JSON object per event
    Json,
}

#[derive(Parser)]
#[command(about = "Log a few events with the caller attached", long_about = None)]
struct Args {
    /// Include source file, line and column
    #[arg(long)]
    file_info: bool,

    /// Number of callers to include in the flat `Caller` property
    #[arg(long, default_value_t = 1)]
    max_depth: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Only add the flat `Caller` property
    #[arg(long, conflicts_with = "structure_only")]
    string_only: bool,

    /// Only add the structured `CallerInfo` property
    #[arg(long)]
    structure_only: bool,
}

impl Args {
    fn properties(&self) -> CallerProperties {
        match (self.string_only, self.structure_only) {
            (true, _) => CallerProperties::Flat,
            (false, true) => CallerProperties::Structured,
            (false, false) => CallerProperties::Both,
        }
    }
}

struct Greeter {
    greeting: String,
}

impl Greeter {
    fn greet(&self, name: &str, excited: bool) {
        if excited {
            tracing::warn!(name, "{}!", self.greeting);
        } else {
            tracing::info!(name, "{}", self.greeting);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = withcaller::CallerConfig::builder()
        .include_file_info(args.file_info)
        .max_depth(args.max_depth)
        .properties(args.properties())
        .build()?;
    let enricher = CallerEnricher::with_config(config);

    match args.format {
        Format::Text => {
            let sink = TextSink::new(io::stdout());
            let flusher = sink.flusher();
            let layer = CallerLayer::with_enricher(sink, enricher);
            tracing_subscriber::registry().with(layer).init();

            run();
            flusher.flush()?;
        }
        Format::Json => {
            let sink = JsonSink::new(io::stdout());
            let flusher = sink.flusher();
            let layer = CallerLayer::with_enricher(sink, enricher);
            tracing_subscriber::registry().with(layer).init();

            run();
            flusher.flush()?;
        }
    }

    Ok(())
}

fn run() {
    tracing::info!("Hello, who is calling me?");

    let greeter = Greeter {
        greeting: "Hello".to_owned(),
    };
    greeter.greet("world", false);
    greeter.greet("caller", true);
}
