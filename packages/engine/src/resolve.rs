//! Identifier disambiguation
//!
//! Maps a human-facing name plus its definition category to the
//! canonical identifier used as the registry key. A fixed set of names
//! exists simultaneously as an attribute and an element in HTML
//! ("cite", "span", ...); those get a category-specific suffix so both
//! definitions can coexist in one registry.
//!
//! The mapping is a pure function of `(name, category)` — it performs
//! no registry lookups, so it is computable before any registry exists
//! (the build-time generator relies on this).

use crate::types::DefinitionCategory;

/// Names that exist both as an attribute and as an element in HTML5.
pub const AMBIGUOUS_NAMES: [&str; 8] = [
    "cite", "data", "form", "label", "span", "style", "title", "type",
];

/// Suffix appended to ambiguous names in the Attribute category.
pub const ATTRIBUTE_SUFFIX: &str = "_attr";

/// Suffix appended to ambiguous names in the Element category.
pub const ELEMENT_SUFFIX: &str = "_element";

/// Check whether a name collides across the attribute and element
/// categories.
#[must_use]
pub fn is_ambiguous(name: &str) -> bool {
    AMBIGUOUS_NAMES.contains(&name)
}

/// Resolve a name to its canonical registry identifier.
///
/// Ambiguous names get `_attr` (Attribute) or `_element` (Element)
/// appended; every other name passes through unchanged. Event, Other
/// and ValueTester names never collide (event names are constrained to
/// lower-case letters, which the ambiguity set never contains), so
/// they always pass through.
///
/// Total over all strings; there is no error condition.
#[must_use]
pub fn resolve(name: &str, category: DefinitionCategory) -> String {
    if !is_ambiguous(name) {
        return name.to_string();
    }
    match category {
        DefinitionCategory::Attribute => format!("{name}{ATTRIBUTE_SUFFIX}"),
        DefinitionCategory::Element => format!("{name}{ELEMENT_SUFFIX}"),
        DefinitionCategory::AttributeValueTester
        | DefinitionCategory::Event
        | DefinitionCategory::Other => name.to_string(),
    }
}
