//! Classification of infrastructure frames.
//!
//! The walker asks a [`FrameFilter`] whether each frame should be skipped. Skipped frames are
//! treated as part of the logging machinery and are never reported as the caller.

use crate::frame::StackFrameInfo;

/// Decides which frames belong to infrastructure and should be skipped.
pub trait FrameFilter: Send + Sync {
    fn should_skip(&self, frame: &StackFrameInfo) -> bool;
}

impl<F> FrameFilter for F
where
    F: Fn(&StackFrameInfo) -> bool + Send + Sync,
{
    fn should_skip(&self, frame: &StackFrameInfo) -> bool {
        self(frame)
    }
}

/// Skips nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFilter;

impl FrameFilter for NoFilter {
    fn should_skip(&self, _frame: &StackFrameInfo) -> bool {
        false
    }
}

/// Crates that make up the logging pipeline between a log call and the enricher.
pub const INFRASTRUCTURE_CRATES: &[&str] = &[
    "withcaller",
    "withcaller_subscriber",
    "tracing",
    "tracing_core",
    "tracing_subscriber",
    "backtrace",
    "std",
    "core",
    "alloc",
];

/// Skips frames declared in any of a set of crates.
///
/// The default set is [`INFRASTRUCTURE_CRATES`]. Frames that can't be attributed to a crate at
/// all (foreign symbols such as the unwinder or the C `main` shim) are always skipped.
#[derive(Debug, Clone)]
pub struct CratePrefixFilter {
    crates: Vec<String>,
}

impl CratePrefixFilter {
    /// A filter that skips only the given crates.
    pub fn new<I, S>(crates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            crates: crates.into_iter().map(Into::into).collect(),
        }
    }

    /// Also skip frames declared in `crate_name`.
    ///
    /// Hosts that wrap the logging macros in their own crate add it here so that the wrapper is
    /// not reported as the caller.
    pub fn with_crate(mut self, crate_name: impl Into<String>) -> Self {
        self.crates.push(crate_name.into());
        self
    }

    pub fn crates(&self) -> &[String] {
        &self.crates
    }
}

impl Default for CratePrefixFilter {
    fn default() -> Self {
        Self::new(INFRASTRUCTURE_CRATES.iter().copied())
    }
}

impl FrameFilter for CratePrefixFilter {
    fn should_skip(&self, frame: &StackFrameInfo) -> bool {
        let crate_name = frame.crate_name();
        crate_name.is_empty() || self.crates.iter().any(|c| c == crate_name)
    }
}
