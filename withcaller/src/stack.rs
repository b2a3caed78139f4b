//! Access to the frames of a call stack.
//!
//! A [`StackInspector`] captures a [`FrameSource`] once per resolution. The frame source is then
//! queried depth by depth, with depth 0 being the innermost frame.

use crate::frame::StackFrameInfo;

/// Frames of a single captured stack, indexed by depth.
pub trait FrameSource {
    /// The frame at `depth`, or `None` if the stack has fewer frames.
    fn frame(&mut self, depth: usize) -> Option<StackFrameInfo>;
}

impl FrameSource for Vec<StackFrameInfo> {
    fn frame(&mut self, depth: usize) -> Option<StackFrameInfo> {
        self.get(depth).cloned()
    }
}

impl<T> FrameSource for &mut T
where
    T: FrameSource + ?Sized,
{
    fn frame(&mut self, depth: usize) -> Option<StackFrameInfo> {
        (**self).frame(depth)
    }
}

/// Produces a frame source for the current call stack.
pub trait StackInspector: Send + Sync {
    type Source: FrameSource;

    /// Capture the stack of the calling thread.
    ///
    /// When `file_info` is false, the frames returned by the source carry no file information.
    fn inspect(&self, file_info: bool) -> Self::Source;
}

/// Inspects the calling thread's stack using [`backtrace`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadStackInspector;

impl StackInspector for ThreadStackInspector {
    type Source = ThreadStack;

    fn inspect(&self, file_info: bool) -> Self::Source {
        ThreadStack::capture(file_info)
    }
}

/// The captured stack of one thread.
///
/// Instruction pointers are collected eagerly when the stack is captured, symbols are only
/// resolved as deeper frames are requested. A single instruction pointer may resolve to several
/// frames when functions have been inlined; each of them gets its own depth. Instruction pointers
/// without a symbol name are not counted.
///
/// A closure frame is reported under the name of the function that defines it, and that function
/// is reported once. When file info is captured, the folded frame carries the location of the
/// line that invoked the closure (for the `tracing` macros, the log statement).
pub struct ThreadStack {
    raw: Vec<backtrace::Frame>,
    next_raw: usize,
    frames: FoldedFrames,
    file_info: bool,
}

impl ThreadStack {
    pub fn capture(file_info: bool) -> Self {
        let mut raw = Vec::new();
        backtrace::trace(|frame| {
            raw.push(frame.clone());
            true
        });

        Self {
            raw,
            next_raw: 0,
            frames: FoldedFrames::default(),
            file_info,
        }
    }

    fn resolve_next(&mut self) -> bool {
        let Some(frame) = self.raw.get(self.next_raw) else {
            return false;
        };
        self.next_raw += 1;

        let file_info = self.file_info;
        let frames = &mut self.frames;
        backtrace::resolve_frame(frame, |symbol| {
            let Some(name) = symbol.name() else {
                return;
            };
            let (mut info, closure) = StackFrameInfo::parse_symbol(&format!("{name:#}"));
            if file_info {
                if let Some(path) = symbol.filename() {
                    info = info.with_file(
                        path.display().to_string(),
                        symbol.lineno(),
                        symbol.colno(),
                    );
                }
            }
            frames.push(info, closure);
        });

        true
    }
}

impl FrameSource for ThreadStack {
    fn frame(&mut self, depth: usize) -> Option<StackFrameInfo> {
        while self.frames.len() <= depth {
            if !self.resolve_next() {
                return None;
            }
        }

        self.frames.get(depth).cloned()
    }
}

/// Resolved frames, innermost first, with closures folded into their defining function.
///
/// A closure frame is reported under the name of the function that defines it. Frames of that
/// function further out are dropped until the function itself has been passed, so it is reported
/// once however the closure was called (directly, as with the closure the `tracing` macros expand
/// to, or through iterator adapters and other intermediaries).
///
/// A closure frame directly followed by a frame of the same function takes over that frame's file
/// information. The outer frame's location is the line that invoked the closure; the closure's own
/// location may point into the macro that generated it.
#[derive(Debug, Default)]
pub(crate) struct FoldedFrames {
    frames: Vec<StackFrameInfo>,
    /// Index of the last kept closure whose defining function has not been passed yet.
    open_closure: Option<usize>,
}

impl FoldedFrames {
    pub(crate) fn push(&mut self, info: StackFrameInfo, closure: bool) {
        if let Some(idx) = self.open_closure {
            let adjacent = idx + 1 == self.frames.len();
            let kept = &mut self.frames[idx];
            if kept.same_function(&info) {
                if adjacent && info.file.is_some() {
                    kept.file = info.file;
                }
                if !closure {
                    self.open_closure = None;
                }
                return;
            }
        }

        self.frames.push(info);
        if closure {
            self.open_closure = Some(self.frames.len() - 1);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.frames.len()
    }

    pub(crate) fn get(&self, depth: usize) -> Option<&StackFrameInfo> {
        self.frames.get(depth)
    }
}

/// A prepared stack that is replayed for every inspection.
#[derive(Debug, Clone, Default)]
pub struct FixedStack {
    frames: Vec<StackFrameInfo>,
}

impl FixedStack {
    pub fn new(frames: Vec<StackFrameInfo>) -> Self {
        Self { frames }
    }
}

impl StackInspector for FixedStack {
    type Source = Vec<StackFrameInfo>;

    fn inspect(&self, file_info: bool) -> Self::Source {
        let mut frames = self.frames.clone();
        if !file_info {
            for frame in &mut frames {
                frame.file = None;
            }
        }
        frames
    }
}
