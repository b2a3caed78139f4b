//! Flat and structured renderings of resolved callers.

use std::fmt::Write;

use crate::{
    frame::StackFrameInfo,
    value::{Property, Structure, Value},
};

/// Rendered when no qualifying frame could be found.
pub const UNKNOWN_METHOD: &str = "<unknown method>";

/// Separator between frames in the flat rendering.
pub const FRAME_SEPARATOR: &str = " at ";

/// Render `frames` as a single string, innermost first.
///
/// Each frame is rendered as `path::Type::method(ParamType, ...)`, followed by ` path:line` when
/// file info is included and known for that frame.
pub fn render_flat(frames: &[StackFrameInfo], include_file_info: bool) -> String {
    if frames.is_empty() {
        return UNKNOWN_METHOD.to_owned();
    }

    let mut out = String::new();
    for (idx, frame) in frames.iter().enumerate() {
        if idx > 0 {
            out.push_str(FRAME_SEPARATOR);
        }
        // Writing to a String is infallible.
        let _ = write!(out, "{frame}");

        if !include_file_info {
            continue;
        }
        if let Some(file) = &frame.file {
            let _ = write!(out, " {}", file.path);
            if let Some(line) = file.line {
                let _ = write!(out, ":{line}");
            }
        }
    }

    out
}

/// Render the innermost qualifying frame as a structure.
///
/// The `File` property is only present when file info is included and the frame has a path.
/// `None` renders as an empty structure.
pub fn render_structured(frame: Option<&StackFrameInfo>, include_file_info: bool) -> Value {
    let Some(frame) = frame else {
        return Structure::new().into();
    };

    let mut caller = Structure::new();
    caller.add_if_absent(Property::new("Class", Value::str(&frame.type_name)));
    if let Some(namespace) = &frame.namespace {
        caller.add_if_absent(Property::new("Namespace", Value::str(namespace)));
    }

    let parameters: Vec<Value> = frame
        .parameters
        .iter()
        .map(|param| {
            Value::from(Structure::from_iter([
                Property::new("Type", Value::str(&param.type_name)),
                Property::new("Name", Value::str(&param.name)),
            ]))
        })
        .collect();
    let method = Structure::from_iter([
        Property::new("Name", Value::str(&frame.method)),
        Property::new("Parameters", Value::Sequence(parameters)),
    ]);
    caller.add_if_absent(Property::new("Method", method));

    if include_file_info {
        if let Some(file_info) = &frame.file {
            let mut file = Structure::new();
            file.add_if_absent(Property::new("Path", Value::str(&file_info.path)));
            if let Some(line) = file_info.line {
                file.add_if_absent(Property::new("Line", Value::u64(line.into())));
            }
            if let Some(column) = file_info.column {
                file.add_if_absent(Property::new("Column", Value::u64(column.into())));
            }
            caller.add_if_absent(Property::new("File", file));
        }
    }

    caller.into()
}
