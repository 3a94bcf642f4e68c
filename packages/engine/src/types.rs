//! Core types for the Tagwerk engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar attribute value as supplied by callers.
///
/// Attribute setters accept loosely-typed input (boolean usage flags,
/// numeric sizes, string tokens); validation against the attribute's
/// declared data type happens in the variant model, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Boolean value (void attribute usage flag)
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
}

impl Scalar {
    /// Try to get the value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get the value as an i64
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Scalar::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get the value as a string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// Return a copy with string content lower-cased.
    ///
    /// Case normalization applies to string scalars only; booleans and
    /// numbers have no case to normalize.
    pub fn to_lowercase(&self) -> Scalar {
        match self {
            Scalar::String(s) => Scalar::String(s.to_lowercase()),
            other => other.clone(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

impl From<i32> for Scalar {
    fn from(i: i32) -> Self {
        Scalar::Int(i as i64)
    }
}

impl From<f64> for Scalar {
    fn from(f: f64) -> Self {
        Scalar::Float(f)
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

/// Category of a definition row.
///
/// The category selects the sub-factory used during hydration and
/// drives the identifier disambiguation in [`crate::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionCategory {
    /// Constructible attribute definition
    Attribute,
    /// Pluggable value-tester definition
    AttributeValueTester,
    /// Constructible element definition
    Element,
    /// Constructible event definition
    Event,
    /// Anything else carried in the definition set
    Other,
}

impl fmt::Display for DefinitionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DefinitionCategory::Attribute => "attribute",
            DefinitionCategory::AttributeValueTester => "attribute_value_tester",
            DefinitionCategory::Element => "element",
            DefinitionCategory::Event => "event",
            DefinitionCategory::Other => "other",
        };
        write!(f, "{name}")
    }
}

/// A translatable message carried as element content.
///
/// The engine stores messages verbatim; the formatter renders the
/// fallback text (escaped) until a translation layer substitutes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Translation key (e.g. "checkout.submit_label")
    pub key: String,
    /// Fallback text rendered when no translation is available
    pub fallback: String,
}

impl Message {
    /// Create a new message with a key and fallback text.
    pub fn new(key: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            fallback: fallback.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_display() {
        assert_eq!(Scalar::from("foo").to_string(), "foo");
        assert_eq!(Scalar::from(42).to_string(), "42");
        assert_eq!(Scalar::from(true).to_string(), "true");
    }

    #[test]
    fn test_scalar_lowercase_strings_only() {
        assert_eq!(Scalar::from("TeXt").to_lowercase(), Scalar::from("text"));
        assert_eq!(Scalar::from(7).to_lowercase(), Scalar::from(7));
    }

    #[test]
    fn test_category_display() {
        assert_eq!(DefinitionCategory::Attribute.to_string(), "attribute");
        assert_eq!(
            DefinitionCategory::AttributeValueTester.to_string(),
            "attribute_value_tester"
        );
    }

    #[test]
    fn test_category_serde_snake_case() {
        let cat: DefinitionCategory = serde_json::from_str("\"attribute_value_tester\"")
            .expect("category should deserialize");
        assert_eq!(cat, DefinitionCategory::AttributeValueTester);
    }
}
