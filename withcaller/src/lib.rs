//! Resolve the code location that issued a log statement.
//!
//! The call stack is walked outward from the log call, skipping frames that belong to the
//! logging machinery, and the qualifying frames are rendered both as a flat string and as a
//! structured value. See [`CallerEnricher`] for the entry point.

pub mod enricher;
pub mod event;
pub mod filter;
pub mod frame;
pub mod render;
pub mod stack;
pub mod value;
pub mod walker;

pub use enricher::{CALLER_INFO_PROPERTY, CALLER_PROPERTY, CallerEnricher, CallerResult, Enrich};
pub use event::{Level, LogEvent};
pub use filter::{CratePrefixFilter, FrameFilter, NoFilter};
pub use frame::{FileInfo, Parameter, StackFrameInfo};
pub use render::UNKNOWN_METHOD;
pub use stack::{FixedStack, FrameSource, StackInspector, ThreadStackInspector};
pub use value::{Property, Scalar, Structure, Value};
pub use walker::{CallerConfig, CallerProperties, ConfigError, StopReason, Walk};
