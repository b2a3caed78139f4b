//! Attaching caller information to log events.
//!
//! [`CallerEnricher`] resolves the caller of the current log statement and adds it to the event
//! as two properties:
//!
//! - `Caller`: the flat rendering of up to `max_depth` qualifying frames.
//! - `CallerInfo`: the structured rendering of the innermost qualifying frame.
//!
//! [`CallerProperties`] selects which of the two are added.
//!
//! A property that is already present on the event is left untouched, so a caller can always
//! set either property explicitly.

use std::num::NonZeroUsize;

use crate::{
    event::LogEvent,
    filter::{CratePrefixFilter, FrameFilter},
    render::{render_flat, render_structured},
    stack::{StackInspector, ThreadStackInspector},
    value::{Property, Value},
    walker::{CallerConfig, CallerProperties, Walk, walk},
};

/// Name of the flat caller property.
pub const CALLER_PROPERTY: &str = "Caller";
/// Name of the structured caller property.
pub const CALLER_INFO_PROPERTY: &str = "CallerInfo";

/// An enrichment step in a logging pipeline.
pub trait Enrich {
    fn enrich(&self, event: &mut LogEvent);
}

/// Both renderings of a resolved caller.
#[derive(Debug, Clone, PartialEq)]
pub struct CallerResult {
    pub walk: Walk,
    pub flat: String,
    pub structured: Value,
}

/// Adds the code location of the log statement to each event.
pub struct CallerEnricher<I = ThreadStackInspector> {
    config: CallerConfig,
    filter: Box<dyn FrameFilter>,
    inspector: I,
}

impl CallerEnricher {
    /// Enricher with the default configuration and filter.
    pub fn new() -> Self {
        Self::with_config(CallerConfig::default())
    }

    pub fn with_config(config: CallerConfig) -> Self {
        Self {
            config,
            filter: Box::new(CratePrefixFilter::default()),
            inspector: ThreadStackInspector,
        }
    }

    pub fn with_file_info(include_file_info: bool) -> Self {
        Self::new().include_file_info(include_file_info)
    }

    pub fn with_depth(include_file_info: bool, max_depth: usize) -> Self {
        Self::new()
            .include_file_info(include_file_info)
            .max_depth(max_depth)
    }
}

impl Default for CallerEnricher {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> CallerEnricher<I>
where
    I: StackInspector,
{
    pub fn include_file_info(mut self, include_file_info: bool) -> Self {
        self.config.include_file_info = include_file_info;
        self
    }

    /// Aggregate up to `max_depth` qualifying frames in the flat rendering.
    ///
    /// Values below 1 are raised to 1, use [`CallerConfig::builder`] to have them rejected.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = NonZeroUsize::new(max_depth).unwrap_or(NonZeroUsize::MIN);
        self
    }

    pub fn skip_frames(mut self, skip_frames: usize) -> Self {
        self.config.skip_frames = skip_frames;
        self
    }

    pub fn max_frame_search(mut self, max_frame_search: usize) -> Self {
        self.config.max_frame_search = max_frame_search;
        self
    }

    /// Which of the `Caller` and `CallerInfo` properties to add.
    pub fn properties(mut self, properties: CallerProperties) -> Self {
        self.config.properties = properties;
        self
    }

    /// Replace the filter that decides which frames are infrastructure.
    pub fn filter(mut self, filter: impl FrameFilter + 'static) -> Self {
        self.filter = Box::new(filter);
        self
    }

    /// Replace the stack inspector.
    pub fn inspector<J>(self, inspector: J) -> CallerEnricher<J>
    where
        J: StackInspector,
    {
        CallerEnricher {
            config: self.config,
            filter: self.filter,
            inspector,
        }
    }

    pub fn config(&self) -> &CallerConfig {
        &self.config
    }

    /// Resolve the caller of the current call stack.
    pub fn resolve(&self) -> CallerResult {
        let source = self.inspector.inspect(self.config.include_file_info);
        let walk = walk(&self.config, &*self.filter, source);

        let include_file_info = self.config.include_file_info;
        let flat = render_flat(&walk.frames, include_file_info);
        let structured = render_structured(walk.first(), include_file_info);

        CallerResult {
            walk,
            flat,
            structured,
        }
    }
}

impl<I> Enrich for CallerEnricher<I>
where
    I: StackInspector,
{
    fn enrich(&self, event: &mut LogEvent) {
        let properties = self.config.properties;
        let need_flat = properties.flat() && !event.has_property(CALLER_PROPERTY);
        let need_structured =
            properties.structured() && !event.has_property(CALLER_INFO_PROPERTY);
        if !need_flat && !need_structured {
            return;
        }

        let result = self.resolve();
        if need_flat {
            event.add_property_if_absent(Property::new(CALLER_PROPERTY, Value::str(result.flat)));
        }
        if need_structured {
            event.add_property_if_absent(Property::new(CALLER_INFO_PROPERTY, result.structured));
        }
    }
}
