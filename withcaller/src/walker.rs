//! Walking a stack to find the callers of a log statement.
//!
//! The walk starts at a configured skip depth and moves outward one frame at a time. Frames the
//! filter classifies as infrastructure are passed over; the rest are collected until enough have
//! been found, the search bound is hit, or the stack runs out.

use std::{
    error, fmt,
    num::NonZeroUsize,
    sync::atomic::{AtomicUsize, Ordering},
};

use crate::{filter::FrameFilter, frame::StackFrameInfo, stack::FrameSource};

static SKIP_FRAMES_COUNT: AtomicUsize = AtomicUsize::new(0);
static MAX_FRAME_SEARCH_COUNT: AtomicUsize = AtomicUsize::new(128);

/// Default depth at which new walks start.
///
/// This is read when a [`CallerConfig`] is built, changing it affects configurations built
/// afterwards and never a walk that is already running.
pub fn skip_frames_count() -> usize {
    SKIP_FRAMES_COUNT.load(Ordering::Relaxed)
}

/// Set the default depth at which walks start.
///
/// Hosts whose pipeline adds frames that the filter cannot classify can raise this. It is meant
/// to be set once during start up, before any enricher is configured.
pub fn set_skip_frames_count(count: usize) {
    SKIP_FRAMES_COUNT.store(count, Ordering::Relaxed);
}

/// Default bound on the number of raw stack depths that are probed.
pub fn max_frame_search_count() -> usize {
    MAX_FRAME_SEARCH_COUNT.load(Ordering::Relaxed)
}

/// Set the default bound on the number of raw stack depths that are probed.
pub fn set_max_frame_search_count(count: usize) {
    MAX_FRAME_SEARCH_COUNT.store(count, Ordering::Relaxed);
}

/// Configuration for resolving and rendering callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerConfig {
    /// Capture and render file, line and column.
    pub include_file_info: bool,
    /// Maximum number of qualifying frames in the flat rendering.
    pub max_depth: NonZeroUsize,
    /// Depth at which the walk starts.
    pub skip_frames: usize,
    /// The walk gives up once this depth is reached.
    pub max_frame_search: usize,
    /// Which caller properties are added to events.
    pub properties: CallerProperties,
}

impl CallerConfig {
    pub fn builder() -> CallerConfigBuilder {
        CallerConfigBuilder::default()
    }
}

impl Default for CallerConfig {
    fn default() -> Self {
        Self {
            include_file_info: false,
            max_depth: NonZeroUsize::MIN,
            skip_frames: skip_frames_count(),
            max_frame_search: max_frame_search_count(),
            properties: CallerProperties::Both,
        }
    }
}

/// The caller properties an enricher adds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CallerProperties {
    /// Only the flat `Caller` string.
    Flat,
    /// Only the structured `CallerInfo` value.
    Structured,
    /// Both properties.
    #[default]
    Both,
}

impl CallerProperties {
    pub fn flat(self) -> bool {
        matches!(self, Self::Flat | Self::Both)
    }

    pub fn structured(self) -> bool {
        matches!(self, Self::Structured | Self::Both)
    }
}

/// Validating builder for [`CallerConfig`].
///
/// Unset values fall back to the defaults, including the process-wide tunables.
#[derive(Debug, Clone, Default)]
pub struct CallerConfigBuilder {
    include_file_info: Option<bool>,
    max_depth: Option<usize>,
    skip_frames: Option<usize>,
    max_frame_search: Option<usize>,
    properties: Option<CallerProperties>,
}

impl CallerConfigBuilder {
    pub fn include_file_info(mut self, include_file_info: bool) -> Self {
        self.include_file_info = Some(include_file_info);
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn skip_frames(mut self, skip_frames: usize) -> Self {
        self.skip_frames = Some(skip_frames);
        self
    }

    pub fn max_frame_search(mut self, max_frame_search: usize) -> Self {
        self.max_frame_search = Some(max_frame_search);
        self
    }

    pub fn properties(mut self, properties: CallerProperties) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn build(self) -> Result<CallerConfig, ConfigError> {
        let defaults = CallerConfig::default();

        let max_depth = match self.max_depth {
            Some(max_depth) => NonZeroUsize::new(max_depth).ok_or(ConfigError {
                desc: "max depth must be at least 1",
            })?,
            None => defaults.max_depth,
        };
        let skip_frames = self.skip_frames.unwrap_or(defaults.skip_frames);
        let max_frame_search = self.max_frame_search.unwrap_or(defaults.max_frame_search);
        if max_frame_search <= skip_frames {
            return Err(ConfigError {
                desc: "max frame search must be greater than skip frames",
            });
        }

        Ok(CallerConfig {
            include_file_info: self.include_file_info.unwrap_or(defaults.include_file_info),
            max_depth,
            skip_frames,
            max_frame_search,
            properties: self.properties.unwrap_or(defaults.properties),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigError {
    desc: &'static str,
}
impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "invalid caller configuration: {}", self.desc)
    }
}
impl error::Error for ConfigError {}

/// Why a walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `max_depth` qualifying frames were found.
    DepthReached,
    /// There were no more frames on the stack.
    StackExhausted,
    /// `max_frame_search` depths were probed.
    SearchLimit,
}

/// The result of walking a stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Walk {
    /// Qualifying frames, innermost first.
    pub frames: Vec<StackFrameInfo>,
    pub stop: StopReason,
}

impl Walk {
    /// The innermost qualifying frame.
    pub fn first(&self) -> Option<&StackFrameInfo> {
        self.frames.first()
    }

    /// No qualifying frame was found.
    pub fn is_unknown(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Collect the qualifying frames of `source`.
pub fn walk<F, S>(config: &CallerConfig, filter: &F, mut source: S) -> Walk
where
    F: FrameFilter + ?Sized,
    S: FrameSource,
{
    let max_depth = config.max_depth.get();
    let mut frames = Vec::with_capacity(max_depth);
    let mut depth = config.skip_frames;

    loop {
        if frames.len() >= max_depth {
            return Walk {
                frames,
                stop: StopReason::DepthReached,
            };
        }
        if depth >= config.max_frame_search {
            return Walk {
                frames,
                stop: StopReason::SearchLimit,
            };
        }

        let Some(frame) = source.frame(depth) else {
            return Walk {
                frames,
                stop: StopReason::StackExhausted,
            };
        };
        depth += 1;

        if !filter.should_skip(&frame) {
            frames.push(frame);
        }
    }
}
