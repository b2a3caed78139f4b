use tracing::{Event, Subscriber};
use tracing_subscriber::{Layer, layer::Context};

use withcaller::{
    CallerEnricher, CallerProperties, Enrich, FrameFilter, StackInspector, ThreadStackInspector,
};

use crate::{sink::Sink, visit::to_log_event};

/// A layer that adds the caller of each event before handing it to a [`Sink`].
///
/// The layer must not be combined with anything that emits `tracing` events from within a sink,
/// those events would be enriched and emitted again.
pub struct CallerLayer<K, I = ThreadStackInspector> {
    enricher: CallerEnricher<I>,
    sink: K,
}

impl<K> CallerLayer<K>
where
    K: Sink,
{
    pub fn new(sink: K) -> Self {
        Self {
            enricher: CallerEnricher::new(),
            sink,
        }
    }
}

impl<K, I> CallerLayer<K, I>
where
    K: Sink,
    I: StackInspector,
{
    pub fn with_enricher(sink: K, enricher: CallerEnricher<I>) -> Self {
        Self { enricher, sink }
    }

    fn map_enricher<J>(self, f: impl FnOnce(CallerEnricher<I>) -> CallerEnricher<J>) -> CallerLayer<K, J> {
        CallerLayer {
            enricher: f(self.enricher),
            sink: self.sink,
        }
    }

    pub fn include_file_info(self, include_file_info: bool) -> Self {
        self.map_enricher(|e| e.include_file_info(include_file_info))
    }

    pub fn max_depth(self, max_depth: usize) -> Self {
        self.map_enricher(|e| e.max_depth(max_depth))
    }

    pub fn filter(self, filter: impl FrameFilter + 'static) -> Self {
        self.map_enricher(|e| e.filter(filter))
    }

    pub fn properties(self, properties: CallerProperties) -> Self {
        self.map_enricher(|e| e.properties(properties))
    }

    pub fn skip_frames(self, skip_frames: usize) -> Self {
        self.map_enricher(|e| e.skip_frames(skip_frames))
    }

    pub fn max_frame_search(self, max_frame_search: usize) -> Self {
        self.map_enricher(|e| e.max_frame_search(max_frame_search))
    }

    pub fn inspector<J>(self, inspector: J) -> CallerLayer<K, J>
    where
        J: StackInspector,
    {
        self.map_enricher(|e| e.inspector(inspector))
    }

    pub fn enricher(&self) -> &CallerEnricher<I> {
        &self.enricher
    }
}

impl<S, K, I> Layer<S> for CallerLayer<K, I>
where
    S: Subscriber,
    K: Sink,
    I: StackInspector + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut log_event = to_log_event(event);
        self.enricher.enrich(&mut log_event);

        // A failing sink must not fail the log statement.
        let _ = self.sink.emit(log_event);
    }
}
