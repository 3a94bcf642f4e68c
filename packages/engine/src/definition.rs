//! Definition rows and typed definitions
//!
//! Handles the immutable blueprints from which runtime attributes,
//! events and elements are constructed. A [`DefinitionRow`] is the flat
//! record shape of one row in the definitions JSON; hydration turns it
//! into a typed [`Definition`] via the category-specific sub-factory
//! ([`Definition::from_row`]) and registers it under its canonical
//! identifier.
//!
//! Definitions are created once during hydration and never mutated;
//! the registry owns them exclusively.

use crate::error::{EngineError, Result};
use crate::resolve;
use crate::types::DefinitionCategory;
use serde::{Deserialize, Serialize};

/// Event identifiers must be lower-case alphabetic only.
pub(crate) fn is_valid_event_name(name: &str) -> bool {
    name.chars().all(|c| c.is_ascii_lowercase())
}

/// Custom data names are restricted to `[a-z0-9]*`.
pub(crate) fn is_valid_custom_data_name(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

/// Attribute identifiers: non-empty, no whitespace, none of the
/// characters that would break the serialized attribute syntax.
pub(crate) fn is_valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '\'' | '"' | '<' | '>' | '=' | '&' | '/'))
}

/// One flat row of the definitions JSON payload.
///
/// Rows carry the union of all category-specific fields; fields that do
/// not apply to a row's category are simply absent and default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionRow {
    /// Explicit canonical identifier; computed from `name` when absent
    #[serde(default)]
    pub def_id: Option<String>,
    /// Human-facing display name
    pub name: String,
    /// Definition category
    pub def_type: DefinitionCategory,
    /// Concrete variant name (attribute: void/single_value/multi_value;
    /// element: void/container; tester: always/script/non_empty/one_of)
    #[serde(default)]
    pub variant: Option<String>,
    /// Declared data type of attribute values
    #[serde(default)]
    pub data_type: Option<String>,
    /// Whether the attribute is permitted on every element
    #[serde(default)]
    pub global: bool,
    /// Whether values keep their case (default: lower-cased)
    #[serde(default)]
    pub case_sensitive: bool,
    /// Name of the value tester validating candidate values
    #[serde(default)]
    pub value_tester: Option<String>,
    /// Attribute identifiers permitted on this element
    #[serde(default)]
    pub allowed_attributes: Vec<String>,
    /// Child element identifiers permitted under this element
    #[serde(default)]
    pub allowed_children: Vec<String>,
    /// Accepted values for a one_of value tester
    #[serde(default)]
    pub allowed_values: Vec<String>,
}

impl DefinitionRow {
    /// Canonical registry identifier for this row.
    ///
    /// An explicit `def_id` wins; otherwise the identifier is resolved
    /// from the name and category.
    #[must_use]
    pub fn canonical_id(&self) -> String {
        self.def_id
            .clone()
            .unwrap_or_else(|| resolve::resolve(&self.name, self.def_type))
    }
}

/// Constructible value-holding shape of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeVariant {
    /// Boolean usage flag, renders as the bare name
    Void,
    /// Exactly one scalar value
    SingleValue,
    /// One or more scalar values, space-joined when rendered
    MultiValue,
    /// SingleValue with a synthesized `data-` prefixed identifier
    CustomData,
    /// SingleValue holding a script string
    Event,
}

/// Structural shape of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementVariant {
    /// No children, no closing tag (br, img, input, ...)
    Void,
    /// Ordered children and a closing tag
    Container,
}

/// Declared data type of attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Free-form string value
    String,
    /// Integer value
    Integer,
    /// Integer or floating point value
    Number,
    /// Boolean value
    Boolean,
}

/// Built-in value tester kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TesterKind {
    /// Accepts everything
    Always,
    /// Non-empty string terminated with `;`
    Script,
    /// Non-empty string
    NonEmpty,
    /// Membership in a fixed value set
    OneOf(Vec<String>),
}

/// Blueprint for a constructible attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDefinition {
    /// Canonical registry identifier
    pub id: String,
    /// Display name used when rendering
    pub name: String,
    /// Value-holding shape
    pub variant: AttributeVariant,
    /// Declared data type of values
    pub data_type: DataType,
    /// Permitted on every element when true
    pub global: bool,
    /// Values keep their case when true
    pub case_sensitive: bool,
    /// Identifier of the value tester, if any
    pub value_tester: Option<String>,
}

/// Blueprint for a constructible element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDefinition {
    /// Canonical registry identifier
    pub id: String,
    /// Display name used as the tag name
    pub name: String,
    /// Structural shape
    pub variant: ElementVariant,
    /// Canonical attribute identifiers permitted on this element.
    /// Empty means any attribute is allowed.
    pub allowed_attributes: Vec<String>,
    /// Canonical child identifiers permitted under this element.
    /// Empty means any child is allowed.
    pub allowed_children: Vec<String>,
}

/// Blueprint for a constructible event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDefinition {
    /// Canonical registry identifier (equals the event name)
    pub id: String,
    /// Display name used when rendering
    pub name: String,
    /// Identifier of the value tester; defaults to the script tester
    pub value_tester: Option<String>,
}

/// Blueprint for a pluggable value tester.
#[derive(Debug, Clone, PartialEq)]
pub struct TesterDefinition {
    /// Canonical registry identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Built-in predicate selected by this definition
    pub kind: TesterKind,
}

/// Blueprint for any other definition carried in the set.
#[derive(Debug, Clone, PartialEq)]
pub struct OtherDefinition {
    /// Canonical registry identifier
    pub id: String,
    /// Display name
    pub name: String,
}

/// A typed, immutable definition owned by the registry.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    /// Attribute blueprint
    Attribute(AttributeDefinition),
    /// Element blueprint
    Element(ElementDefinition),
    /// Event blueprint
    Event(EventDefinition),
    /// Value-tester blueprint
    ValueTester(TesterDefinition),
    /// Uncategorized blueprint
    Other(OtherDefinition),
}

impl Definition {
    /// Category of this definition.
    #[must_use]
    pub fn category(&self) -> DefinitionCategory {
        match self {
            Definition::Attribute(_) => DefinitionCategory::Attribute,
            Definition::Element(_) => DefinitionCategory::Element,
            Definition::Event(_) => DefinitionCategory::Event,
            Definition::ValueTester(_) => DefinitionCategory::AttributeValueTester,
            Definition::Other(_) => DefinitionCategory::Other,
        }
    }

    /// Canonical registry identifier of this definition.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Definition::Attribute(d) => &d.id,
            Definition::Element(d) => &d.id,
            Definition::Event(d) => &d.id,
            Definition::ValueTester(d) => &d.id,
            Definition::Other(d) => &d.id,
        }
    }

    /// Display name of this definition.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Definition::Attribute(d) => &d.name,
            Definition::Element(d) => &d.name,
            Definition::Event(d) => &d.name,
            Definition::ValueTester(d) => &d.name,
            Definition::Other(d) => &d.name,
        }
    }

    /// Category-specific sub-factory: build a typed definition from a
    /// flat row.
    ///
    /// Validates the category-specific identifier grammar and variant
    /// names; duplicate detection is the hydration caller's concern.
    pub fn from_row(row: &DefinitionRow) -> Result<Definition> {
        let id = row.canonical_id();
        match row.def_type {
            DefinitionCategory::Attribute => {
                if !is_valid_attribute_name(&row.name) {
                    return Err(EngineError::InvalidAttributeIdName(row.name.clone()));
                }
                Ok(Definition::Attribute(AttributeDefinition {
                    id,
                    name: row.name.clone(),
                    variant: parse_attribute_variant(row.variant.as_deref())?,
                    data_type: parse_data_type(row.data_type.as_deref())?,
                    global: row.global,
                    case_sensitive: row.case_sensitive,
                    value_tester: row.value_tester.clone(),
                }))
            }
            DefinitionCategory::Element => Ok(Definition::Element(ElementDefinition {
                id,
                name: row.name.clone(),
                variant: parse_element_variant(row.variant.as_deref())?,
                allowed_attributes: row
                    .allowed_attributes
                    .iter()
                    .map(|n| resolve::resolve(n, DefinitionCategory::Attribute))
                    .collect(),
                allowed_children: row
                    .allowed_children
                    .iter()
                    .map(|n| resolve::resolve(n, DefinitionCategory::Element))
                    .collect(),
            })),
            DefinitionCategory::Event => {
                if !is_valid_event_name(&row.name) {
                    return Err(EngineError::InvalidEventName(row.name.clone()));
                }
                Ok(Definition::Event(EventDefinition {
                    id,
                    name: row.name.clone(),
                    value_tester: row.value_tester.clone(),
                }))
            }
            DefinitionCategory::AttributeValueTester => {
                Ok(Definition::ValueTester(TesterDefinition {
                    id,
                    name: row.name.clone(),
                    kind: parse_tester_kind(row.variant.as_deref(), &row.allowed_values)?,
                }))
            }
            DefinitionCategory::Other => Ok(Definition::Other(OtherDefinition {
                id,
                name: row.name.clone(),
            })),
        }
    }
}

fn parse_attribute_variant(variant: Option<&str>) -> Result<AttributeVariant> {
    match variant {
        None | Some("single_value") => Ok(AttributeVariant::SingleValue),
        Some("void") => Ok(AttributeVariant::Void),
        Some("multi_value") => Ok(AttributeVariant::MultiValue),
        Some("custom_data") => Ok(AttributeVariant::CustomData),
        Some(other) => Err(EngineError::InvalidDefinitionsFile(format!(
            "unknown attribute variant '{other}'"
        ))),
    }
}

fn parse_element_variant(variant: Option<&str>) -> Result<ElementVariant> {
    match variant {
        None | Some("container") => Ok(ElementVariant::Container),
        Some("void") => Ok(ElementVariant::Void),
        Some(other) => Err(EngineError::InvalidDefinitionsFile(format!(
            "unknown element variant '{other}'"
        ))),
    }
}

fn parse_data_type(data_type: Option<&str>) -> Result<DataType> {
    match data_type {
        None | Some("string") => Ok(DataType::String),
        Some("integer") => Ok(DataType::Integer),
        Some("number") => Ok(DataType::Number),
        Some("boolean") => Ok(DataType::Boolean),
        Some(other) => Err(EngineError::InvalidDefinitionsFile(format!(
            "unknown data type '{other}'"
        ))),
    }
}

fn parse_tester_kind(variant: Option<&str>, allowed_values: &[String]) -> Result<TesterKind> {
    match variant {
        None | Some("always") => Ok(TesterKind::Always),
        Some("script") => Ok(TesterKind::Script),
        Some("non_empty") => Ok(TesterKind::NonEmpty),
        Some("one_of") => Ok(TesterKind::OneOf(allowed_values.to_vec())),
        Some(other) => Err(EngineError::InvalidDefinitionsFile(format!(
            "unknown value tester variant '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, def_type: DefinitionCategory) -> DefinitionRow {
        DefinitionRow {
            def_id: None,
            name: name.to_string(),
            def_type,
            variant: None,
            data_type: None,
            global: false,
            case_sensitive: false,
            value_tester: None,
            allowed_attributes: Vec::new(),
            allowed_children: Vec::new(),
            allowed_values: Vec::new(),
        }
    }

    #[test]
    fn test_canonical_id_resolves_ambiguous_names() {
        assert_eq!(
            row("cite", DefinitionCategory::Attribute).canonical_id(),
            "cite_attr"
        );
        assert_eq!(
            row("cite", DefinitionCategory::Element).canonical_id(),
            "cite_element"
        );
        assert_eq!(row("href", DefinitionCategory::Attribute).canonical_id(), "href");
    }

    #[test]
    fn test_explicit_def_id_wins() {
        let mut r = row("cite", DefinitionCategory::Attribute);
        r.def_id = Some("custom_cite".to_string());
        assert_eq!(r.canonical_id(), "custom_cite");
    }

    #[test]
    fn test_attribute_sub_factory() {
        let mut r = row("class", DefinitionCategory::Attribute);
        r.variant = Some("multi_value".to_string());
        r.global = true;
        let def = Definition::from_row(&r).expect("row should hydrate");
        match def {
            Definition::Attribute(attr) => {
                assert_eq!(attr.variant, AttributeVariant::MultiValue);
                assert!(attr.global);
                assert!(!attr.case_sensitive);
            }
            other => panic!("expected attribute definition, got {other:?}"),
        }
    }

    #[test]
    fn test_element_allow_lists_are_canonicalized() {
        let mut r = row("body", DefinitionCategory::Element);
        r.allowed_attributes = vec!["style".to_string(), "onload".to_string()];
        r.allowed_children = vec!["span".to_string(), "div".to_string()];
        let def = Definition::from_row(&r).expect("row should hydrate");
        match def {
            Definition::Element(el) => {
                assert_eq!(el.allowed_attributes, vec!["style_attr", "onload"]);
                assert_eq!(el.allowed_children, vec!["span_element", "div"]);
            }
            other => panic!("expected element definition, got {other:?}"),
        }
    }

    #[test]
    fn test_event_name_grammar() {
        let r = row("onClick", DefinitionCategory::Event);
        assert!(matches!(
            Definition::from_row(&r),
            Err(EngineError::InvalidEventName(_))
        ));
        let r = row("onclick", DefinitionCategory::Event);
        assert!(Definition::from_row(&r).is_ok());
    }

    #[test]
    fn test_attribute_name_grammar() {
        let r = row("bad name", DefinitionCategory::Attribute);
        assert!(matches!(
            Definition::from_row(&r),
            Err(EngineError::InvalidAttributeIdName(_))
        ));
    }

    #[test]
    fn test_unknown_variant_is_rejected() {
        let mut r = row("div", DefinitionCategory::Element);
        r.variant = Some("inline".to_string());
        assert!(matches!(
            Definition::from_row(&r),
            Err(EngineError::InvalidDefinitionsFile(_))
        ));
    }

    #[test]
    fn test_custom_data_name_grammar() {
        assert!(is_valid_custom_data_name("foo123"));
        assert!(is_valid_custom_data_name(""));
        assert!(!is_valid_custom_data_name("HOB!@"));
        assert!(!is_valid_custom_data_name("foo-bar"));
    }
}
