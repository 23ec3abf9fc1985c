//! Field types and their tag encoding
//!
//! Field types travel between the host and the registry as compact tags:
//! a primitive name (`Scalar`, `Integer`, `Boolean`, `String`), with one
//! trailing `[]` per level of array nesting (`Integer[]`, `Scalar[][]`).
//! Tags are parsed once, at registration, into [`FieldType`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::value::FieldValue;

const ARRAY_SUFFIX: &str = "[]";

/// Shape of a single record field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// A single floating-point number
    Scalar,
    /// A single signed integer
    Integer,
    /// A boolean flag
    Boolean,
    /// A UTF-8 string
    String,
    /// A variable-length ordered sequence of another field type
    ArrayOf(Box<FieldType>),
}

/// A field type tag that could not be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid field type tag '{tag}': {reason}")]
pub struct ParseFieldTypeError {
    pub tag: String,
    pub reason: &'static str,
}

impl FieldType {
    /// Wrap an element type into an array type
    pub fn array_of(element: FieldType) -> Self {
        FieldType::ArrayOf(Box::new(element))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, FieldType::ArrayOf(_))
    }

    /// Element type of an array, `None` for primitives
    pub fn element(&self) -> Option<&FieldType> {
        match self {
            FieldType::ArrayOf(inner) => Some(inner),
            _ => None,
        }
    }

    /// Default value for a freshly constructed field
    pub fn default_value(&self) -> FieldValue {
        match self {
            FieldType::Scalar => FieldValue::Scalar(0.0),
            FieldType::Integer => FieldValue::Integer(0),
            FieldType::Boolean => FieldValue::Boolean(false),
            FieldType::String => FieldValue::String(String::new()),
            FieldType::ArrayOf(_) => FieldValue::Array(Vec::new()),
        }
    }

    fn primitive(name: &str) -> Option<Self> {
        match name {
            "Scalar" => Some(FieldType::Scalar),
            "Integer" => Some(FieldType::Integer),
            "Boolean" => Some(FieldType::Boolean),
            "String" => Some(FieldType::String),
            _ => None,
        }
    }

    fn primitive_name(&self) -> &'static str {
        match self {
            FieldType::Scalar => "Scalar",
            FieldType::Integer => "Integer",
            FieldType::Boolean => "Boolean",
            FieldType::String => "String",
            FieldType::ArrayOf(inner) => inner.primitive_name(),
        }
    }

    fn depth(&self) -> usize {
        match self {
            FieldType::ArrayOf(inner) => 1 + inner.depth(),
            _ => 0,
        }
    }
}

impl FromStr for FieldType {
    type Err = ParseFieldTypeError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let error = |reason| ParseFieldTypeError {
            tag: tag.to_string(),
            reason,
        };

        let mut base = tag.trim();
        if base.is_empty() {
            return Err(error("empty tag"));
        }

        let mut depth = 0;
        while let Some(rest) = base.strip_suffix(ARRAY_SUFFIX) {
            base = rest;
            depth += 1;
        }

        if base.contains(['[', ']']) {
            return Err(error("unbalanced array brackets"));
        }
        if base.chars().any(char::is_whitespace) {
            return Err(error("whitespace inside tag"));
        }

        let mut field_type = FieldType::primitive(base).ok_or_else(|| error("unknown type"))?;
        for _ in 0..depth {
            field_type = FieldType::array_of(field_type);
        }
        Ok(field_type)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.primitive_name())?;
        for _ in 0..self.depth() {
            f.write_str(ARRAY_SUFFIX)?;
        }
        Ok(())
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_primitives() {
        assert_eq!("Scalar".parse::<FieldType>().unwrap(), FieldType::Scalar);
        assert_eq!("Integer".parse::<FieldType>().unwrap(), FieldType::Integer);
        assert_eq!(" Boolean ".parse::<FieldType>().unwrap(), FieldType::Boolean);
    }

    #[test]
    fn test_parse_arrays() {
        assert_eq!(
            "Integer[]".parse::<FieldType>().unwrap(),
            FieldType::array_of(FieldType::Integer)
        );
        assert_eq!(
            "Scalar[][]".parse::<FieldType>().unwrap(),
            FieldType::array_of(FieldType::array_of(FieldType::Scalar))
        );
    }

    #[test]
    fn test_parse_rejects_bad_tags() {
        for tag in ["", "Float", "Integer[", "Integer]", "Int eger[]", "[]", "Scalar[3]"] {
            assert!(tag.parse::<FieldType>().is_err(), "accepted {tag:?}");
        }
    }

    #[test]
    fn test_display_is_canonical_tag() {
        let nested = FieldType::array_of(FieldType::array_of(FieldType::String));
        assert_eq!(nested.to_string(), "String[][]");
        assert_eq!(nested.to_string().parse::<FieldType>().unwrap(), nested);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(
            FieldType::array_of(FieldType::Scalar).default_value(),
            FieldValue::Array(Vec::new())
        );
        assert_eq!(FieldType::Integer.default_value(), FieldValue::Integer(0));
    }

    #[test]
    fn test_serde_as_tag() {
        let json = serde_json::to_string(&FieldType::array_of(FieldType::Integer)).unwrap();
        assert_eq!(json, "\"Integer[]\"");
        let back: FieldType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FieldType::array_of(FieldType::Integer));
        assert!(serde_json::from_str::<FieldType>("\"Vector3\"").is_err());
    }
}
