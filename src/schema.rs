//! Typing of `SimpleData` values.
//!
//! A [`Schema`] maps a field name to a [`FieldType`]. Fields without an
//! entry are strings. Conversion follows the loose rules KML producers rely
//! on: numeric text that does not parse becomes NaN (serialized as `null`),
//! and a boolean is true for any non-empty text, `"false"` included.

use crate::properties::number_value;
use crate::tree::XmlElement;
use geojson::JsonValue;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldType {
    #[default]
    String,
    Int,
    UInt,
    Short,
    UShort,
    Float,
    Double,
    Bool,
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(FieldType::String),
            "int" => Ok(FieldType::Int),
            "uint" => Ok(FieldType::UInt),
            "short" => Ok(FieldType::Short),
            "ushort" => Ok(FieldType::UShort),
            "float" => Ok(FieldType::Float),
            "double" => Ok(FieldType::Double),
            "bool" => Ok(FieldType::Bool),
            other => Err(format!("unknown SimpleField type: {other}")),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::UInt => "uint",
            FieldType::Short => "short",
            FieldType::UShort => "ushort",
            FieldType::Float => "float",
            FieldType::Double => "double",
            FieldType::Bool => "bool",
        };
        write!(f, "{name}")
    }
}

impl FieldType {
    pub fn convert(self, text: &str) -> JsonValue {
        match self {
            FieldType::String => JsonValue::from(text),
            FieldType::Bool => JsonValue::Bool(!text.is_empty()),
            FieldType::Int
            | FieldType::UInt
            | FieldType::Short
            | FieldType::UShort
            | FieldType::Float
            | FieldType::Double => number_value(to_number(text)),
        }
    }
}

/// Numeric reading of text with the usual loose rules: surrounding
/// whitespace is ignored, empty text is zero, `0x`/`0o`/`0b` prefixes and
/// `Infinity` are accepted, anything else that is not a plain decimal
/// literal is NaN.
pub fn to_number(text: &str) -> f64 {
    let s = text.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    let radix = match s.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&s[2..], radix)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }
    let decimal = s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !decimal {
        return f64::NAN;
    }
    s.parse().unwrap_or(f64::NAN)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: HashMap<String, FieldType>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, field_type: FieldType) {
        self.fields.insert(name.to_string(), field_type);
    }

    pub fn field_type(&self, name: &str) -> FieldType {
        self.fields.get(name).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields declared by `<SimpleField name=".." type="..">` anywhere in the
    /// document. Unknown types fall back to string.
    pub fn from_document<E: XmlElement>(root: &E) -> Self {
        let mut schema = Schema::new();
        for field in root.descendants_and_self() {
            if field.tag_name() != "SimpleField" {
                continue;
            }
            let Some(name) = field.attribute("name") else {
                continue;
            };
            let field_type: FieldType = field
                .attribute("type")
                .and_then(|t| t.parse().ok())
                .unwrap_or_default();
            schema.insert(name, field_type);
        }
        schema
    }

    /// Entries of `other` replace entries of `self`.
    pub fn extend(&mut self, other: &Schema) {
        for (name, field_type) in &other.fields {
            self.fields.insert(name.clone(), *field_type);
        }
    }
}

impl FromStr for Schema {
    type Err = String;

    /// Comma separated `name=type` pairs, e.g. `population=int,capital=bool`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut schema = Schema::new();
        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (name, field_type) = entry
                .split_once('=')
                .ok_or_else(|| format!("expected name=type, got {entry}"))?;
            schema.insert(name.trim(), field_type.trim().parse()?);
        }
        Ok(schema)
    }
}
