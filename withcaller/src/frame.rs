//! A snapshot of a single stack frame.
//!
//! Frames are produced by a [`FrameSource`](crate::stack::FrameSource), one per stack depth. The
//! frame describes the function that was executing at that depth: where it is declared, its name
//! and parameters, and optionally the location in the source file.

use std::fmt;

/// A single parameter of the function executing in a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Fully qualified name of the parameter's type.
    pub type_name: String,
    /// Name of the parameter as declared.
    pub name: String,
}

impl Parameter {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
        }
    }
}

/// Source location of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub path: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

/// Read-only snapshot of one stack frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrameInfo {
    /// The module path containing the declaring type, if there is one.
    pub namespace: Option<String>,
    /// The declaring type.
    ///
    /// For free functions this is the innermost module. Root level symbols (such as `main` in a
    /// binary built without debug info) have an empty type name.
    pub type_name: String,
    /// Name of the function.
    pub method: String,
    /// Parameters in declaration order.
    pub parameters: Vec<Parameter>,
    /// Source location, only present when requested and available.
    pub file: Option<FileInfo>,
}

impl StackFrameInfo {
    pub fn new(
        namespace: Option<&str>,
        type_name: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.map(ToOwned::to_owned),
            type_name: type_name.into(),
            method: method.into(),
            parameters: Vec::new(),
            file: None,
        }
    }

    /// Build a frame from a demangled symbol name.
    ///
    /// The symbol is expected in the alternate demangled form (without the trailing hash), for
    /// example `my_app::service::Service::handle` or
    /// `<my_app::Service as my_app::Handler>::handle::{{closure}}`. Closure and shim segments are
    /// folded into the enclosing function.
    pub fn from_symbol(symbol: &str) -> Self {
        Self::parse_symbol(symbol).0
    }

    /// Like [`from_symbol`](Self::from_symbol), also returning whether the symbol is a closure.
    pub(crate) fn parse_symbol(symbol: &str) -> (Self, bool) {
        let path = SymbolPath::parse(symbol);
        let frame = Self {
            namespace: path.namespace,
            type_name: path.type_name,
            method: path.method,
            parameters: Vec::new(),
            file: None,
        };

        (frame, path.closure)
    }

    pub fn with_parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_file(
        mut self,
        path: impl Into<String>,
        line: Option<u32>,
        column: Option<u32>,
    ) -> Self {
        self.file = Some(FileInfo {
            path: path.into(),
            line,
            column,
        });
        self
    }

    /// The qualified path of the declaring type.
    pub fn declaring_class(&self) -> String {
        match (&self.namespace, self.type_name.is_empty()) {
            (Some(namespace), false) => format!("{namespace}::{ty}", ty = self.type_name),
            (Some(namespace), true) => namespace.clone(),
            (None, _) => self.type_name.clone(),
        }
    }

    /// Whether both frames are in the same function.
    pub fn same_function(&self, other: &Self) -> bool {
        self.method == other.method
            && self.type_name == other.type_name
            && self.namespace == other.namespace
    }

    /// The name of the crate the frame's declaring type belongs to.
    pub fn crate_name(&self) -> &str {
        let root = match &self.namespace {
            Some(namespace) => namespace.as_str(),
            None => self.type_name.as_str(),
        };
        root.split("::").next().unwrap_or_default()
    }
}

impl fmt::Display for StackFrameInfo {
    /// Formats as `path::to::Type::method(param_types)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = self.declaring_class();
        if !class.is_empty() {
            write!(f, "{class}::")?;
        }
        write!(f, "{}(", self.method)?;
        for (idx, param) in self.parameters.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&param.type_name)?;
        }
        f.write_str(")")
    }
}

/// A demangled symbol split into its parts.
#[derive(Debug, PartialEq)]
struct SymbolPath {
    namespace: Option<String>,
    type_name: String,
    method: String,
    closure: bool,
}

impl SymbolPath {
    fn parse(symbol: &str) -> Self {
        let mut segments = split_path(symbol.trim());
        let closure = segments
            .iter()
            .any(|segment| segment.starts_with('{') && segment.contains("closure"));

        // Closures, shims and turbofish arguments belong to the enclosing function.
        let mut first = true;
        segments.retain(|segment| {
            let keep = !segment.starts_with('{') && (first || !segment.starts_with('<'));
            first = false;
            keep
        });

        let Some(method) = segments.pop() else {
            return Self {
                namespace: None,
                type_name: String::new(),
                method: symbol.to_owned(),
                closure,
            };
        };

        // A qualified self segment (`<Type as Trait>`) is attributed to the self type.
        let qualified_self = match segments.as_slice() {
            [only] if only.starts_with('<') && only.ends_with('>') => Some(*only),
            _ => None,
        };
        let owner = match qualified_self {
            Some(qualified) => split_path(qualified_owner(&qualified[1..qualified.len() - 1])),
            None => segments,
        };

        let Some((type_name, modules)) = owner.split_last() else {
            return Self {
                namespace: None,
                type_name: String::new(),
                method: method.to_owned(),
                closure,
            };
        };

        let namespace = if modules.is_empty() {
            None
        } else {
            Some(modules.join("::"))
        };

        Self {
            namespace,
            type_name: (*type_name).to_owned(),
            method: method.to_owned(),
            closure,
        }
    }
}

/// Split a path on `::`, ignoring separators nested inside generic brackets.
fn split_path(path: &str) -> Vec<&str> {
    let bytes = path.as_bytes();
    let mut segments = Vec::new();
    let mut depth = 0_usize;
    let mut start = 0;
    let mut idx = 0;

    while idx < bytes.len() {
        match bytes[idx] {
            b'<' => depth += 1,
            // `->` in a function pointer type is not a closing bracket.
            b'>' if idx > 0 && bytes[idx - 1] == b'-' => {}
            b'>' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(idx + 1) == Some(&b':') => {
                segments.push(&path[start..idx]);
                idx += 2;
                start = idx;
                continue;
            }
            _ => {}
        }
        idx += 1;
    }
    segments.push(&path[start..]);

    segments.into_iter().filter(|s| !s.is_empty()).collect()
}

/// The path a qualified self segment (`Type as Trait`) is attributed to.
///
/// This is the self type, unless the self type has no path of its own (a reference to a generic
/// parameter, a slice, a tuple), in which case it is the trait.
fn qualified_owner(qualified: &str) -> &str {
    let bytes = qualified.as_bytes();
    let mut depth = 0_usize;
    let mut split = None;

    for (idx, byte) in bytes.iter().enumerate() {
        match byte {
            b'<' => depth += 1,
            b'>' if idx > 0 && bytes[idx - 1] == b'-' => {}
            b'>' => depth = depth.saturating_sub(1),
            b' ' if depth == 0 && qualified[idx..].starts_with(" as ") => {
                split = Some(idx);
                break;
            }
            _ => {}
        }
    }

    let Some(idx) = split else {
        return strip_indirection(qualified);
    };
    let self_ty = strip_indirection(&qualified[..idx]);
    let trait_path = &qualified[idx + " as ".len()..];

    if split_path(self_ty).len() > 1 {
        self_ty
    } else {
        trait_path
    }
}

fn strip_indirection(mut ty: &str) -> &str {
    loop {
        let stripped = ty
            .trim_start_matches('&')
            .trim_start_matches("mut ")
            .trim_start_matches("*const ")
            .trim_start_matches("*mut ")
            .trim_start_matches("dyn ");
        if stripped.len() == ty.len() {
            return ty;
        }
        ty = stripped;
    }
}
