//! Definition registry
//!
//! Maps canonical identifiers to typed definitions. The registry is
//! populated once during hydration and treated as read-only for the
//! rest of the process lifetime; it is a thin container exposing the
//! `has`/`get`/`add` capability. Duplicate detection is the builder's
//! concern during hydration, not the registry's.

use crate::definition::Definition;
use crate::error::{EngineError, Result};
use crate::types::DefinitionCategory;
use indexmap::IndexMap;

/// Identifier-to-definition lookup table.
///
/// Insertion order is preserved so that diagnostics and the `validate`
/// binary report definitions in hydration order.
#[derive(Debug, Default)]
pub struct DefinitionRegistry {
    definitions: IndexMap<String, Definition>,
}

impl DefinitionRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            definitions: IndexMap::new(),
        }
    }

    /// Check whether an identifier is registered.
    #[must_use]
    pub fn has(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    /// Look up a definition by canonical identifier.
    ///
    /// # Returns
    /// * `Ok(&Definition)` - the registered definition
    /// * `Err(EngineError::DefinitionNotFound)` - when absent
    pub fn get(&self, id: &str) -> Result<&Definition> {
        self.definitions
            .get(id)
            .ok_or_else(|| EngineError::DefinitionNotFound(id.to_string()))
    }

    /// Register a definition under an identifier.
    ///
    /// A successful add makes the identifier resolvable for the
    /// remaining lifetime of the registry. Re-adding an identifier
    /// replaces the previous definition; callers that must reject
    /// duplicates pre-check with [`DefinitionRegistry::has`].
    pub fn add(&mut self, id: impl Into<String>, definition: Definition) {
        self.definitions.insert(id.into(), definition);
    }

    /// Category of a registered identifier, if present.
    #[must_use]
    pub fn category_of(&self, id: &str) -> Option<DefinitionCategory> {
        self.definitions.get(id).map(Definition::category)
    }

    /// Number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Iterate over registered definitions in hydration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Definition)> {
        self.definitions.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{OtherDefinition, TesterDefinition, TesterKind};

    fn other(id: &str) -> Definition {
        Definition::Other(OtherDefinition {
            id: id.to_string(),
            name: id.to_string(),
        })
    }

    #[test]
    fn test_add_and_get() {
        let mut registry = DefinitionRegistry::new();
        registry.add("doctype", other("doctype"));

        assert!(registry.has("doctype"));
        assert!(registry.get("doctype").is_ok());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_missing_fails() {
        let registry = DefinitionRegistry::new();
        assert!(matches!(
            registry.get("missing"),
            Err(EngineError::DefinitionNotFound(_))
        ));
    }

    #[test]
    fn test_category_of() {
        let mut registry = DefinitionRegistry::new();
        registry.add(
            "always",
            Definition::ValueTester(TesterDefinition {
                id: "always".to_string(),
                name: "always".to_string(),
                kind: TesterKind::Always,
            }),
        );

        assert_eq!(
            registry.category_of("always"),
            Some(DefinitionCategory::AttributeValueTester)
        );
        assert_eq!(registry.category_of("missing"), None);
    }

    #[test]
    fn test_iteration_preserves_hydration_order() {
        let mut registry = DefinitionRegistry::new();
        registry.add("b", other("b"));
        registry.add("a", other("a"));
        registry.add("c", other("c"));

        let ids: Vec<&str> = registry.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }
}
