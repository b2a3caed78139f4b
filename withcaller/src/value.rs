//! Property values attached to log events.
//!
//! Values are either scalars, ordered sequences, or structures of named properties. Structures
//! keep their properties in insertion order and serialize as maps.

use std::fmt;

use serde::{Serialize, Serializer, ser::SerializeMap};

/// A scalar value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    /// 64-bit floating point number.
    F64(f64),
    /// 64-bit signed integer.
    I64(i64),
    /// 64-bit unsigned integer.
    U64(u64),
    /// Boolean
    Bool(bool),
    /// String
    Str(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::F64(val) => write!(f, "{val}"),
            Self::I64(val) => write!(f, "{val}"),
            Self::U64(val) => write!(f, "{val}"),
            Self::Bool(val) => write!(f, "{val}"),
            Self::Str(val) => write!(f, "{val:?}"),
        }
    }
}

/// A property value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(Scalar),
    Sequence(Vec<Value>),
    Structure(Structure),
}

impl Value {
    pub fn str(value: impl Into<String>) -> Self {
        Self::Scalar(Scalar::Str(value.into()))
    }

    pub fn u64(value: u64) -> Self {
        Self::Scalar(Scalar::U64(value))
    }

    /// The string contents, if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Scalar::Str(val)) => Some(val),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Scalar(Scalar::U64(val)) => Some(*val),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence(elements) => Some(elements),
            _ => None,
        }
    }

    pub fn as_structure(&self) -> Option<&Structure> {
        match self {
            Self::Structure(structure) => Some(structure),
            _ => None,
        }
    }
}

impl From<Scalar> for Value {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<Structure> for Value {
    fn from(value: Structure) -> Self {
        Self::Structure(value)
    }
}

impl fmt::Display for Value {
    /// Scalars print as themselves (strings quoted), sequences as `[a, b]` and structures as
    /// `{ Name: value }`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(scalar) => fmt::Display::fmt(scalar, f),
            Self::Sequence(elements) => {
                f.write_str("[")?;
                for (idx, element) in elements.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    fmt::Display::fmt(element, f)?;
                }
                f.write_str("]")
            }
            Self::Structure(structure) => fmt::Display::fmt(structure, f),
        }
    }
}

/// A named value.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub value: Value,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An ordered collection of properties with unique names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
    properties: Vec<Property>,
}

impl Structure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|prop| prop.name == name)
            .map(|prop| &prop.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Add `property` unless a property with the same name is already present.
    ///
    /// Returns whether the property was added.
    pub fn add_if_absent(&mut self, property: Property) -> bool {
        if self.contains(&property.name) {
            return false;
        }
        self.properties.push(property);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter()
    }
}

impl FromIterator<Property> for Structure {
    /// Later properties with a name that is already present are dropped.
    fn from_iter<T: IntoIterator<Item = Property>>(iter: T) -> Self {
        let mut structure = Self::new();
        for property in iter {
            structure.add_if_absent(property);
        }
        structure
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.properties.is_empty() {
            return f.write_str("{}");
        }
        f.write_str("{ ")?;
        for (idx, prop) in self.properties.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", prop.name, prop.value)?;
        }
        f.write_str(" }")
    }
}

impl Serialize for Structure {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.properties.len()))?;
        for prop in &self.properties {
            map.serialize_entry(&prop.name, &prop.value)?;
        }
        map.end()
    }
}
