//! Builder/factory for definition hydration and object construction
//!
//! The builder is the sole entry point for producing attributes,
//! events and elements once the definition set has been hydrated. It
//! owns the definition registry, the value-tester instances, and the
//! immutable engine configuration.
//!
//! Hydration runs once at startup: every definition row is turned into
//! a typed definition by the category-specific sub-factory and
//! registered under its canonical identifier, with cumulative
//! duplicate detection across the whole pass. The registry is
//! read-only afterwards.

use crate::attribute::{Attribute, CUSTOM_DATA_PREFIX};
use crate::config::{EngineConfig, MAX_DEFINITIONS, MAX_DEFINITIONS_SIZE};
use crate::definition::{Definition, DefinitionRow};
use crate::element::Element;
use crate::error::{EngineError, Result};
use crate::registry::DefinitionRegistry;
use crate::resolve;
use crate::tester::{self, ValueTester};
use crate::types::DefinitionCategory;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Orchestrates the registry and resolver to hydrate definitions and
/// construct runtime objects from them.
///
/// Elements created through [`Builder::make_element`] carry a shared
/// reference back to the builder for lazy attribute creation; the
/// reference is bound as a second step immediately after construction
/// (two-phase construction avoids a circular dependency between the
/// registry and the builder).
#[derive(Debug, Default)]
pub struct Builder {
    config: EngineConfig,
    registry: DefinitionRegistry,
    testers: HashMap<String, Arc<dyn ValueTester>>,
}

impl Builder {
    /// Create a builder with an explicit configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            registry: DefinitionRegistry::new(),
            testers: HashMap::new(),
        }
    }

    /// The immutable engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The definition registry.
    #[must_use]
    pub fn registry(&self) -> &DefinitionRegistry {
        &self.registry
    }

    /// Wrap the hydrated builder for sharing with elements.
    #[must_use]
    pub fn into_shared(self) -> Arc<Builder> {
        Arc::new(self)
    }

    /// Hydrate definition rows into the registry.
    ///
    /// Rows are processed in order; the first duplicate canonical
    /// identifier aborts the pass, leaving every earlier row
    /// registered.
    ///
    /// # Returns
    /// * `Ok(usize)` - number of rows registered by this call
    /// * `Err(EngineError::DuplicateDefinitionId)` - two rows hydrate
    ///   to the same canonical identifier
    pub fn hydrate(&mut self, rows: &[DefinitionRow]) -> Result<usize> {
        if self.registry.len() + rows.len() > MAX_DEFINITIONS {
            return Err(EngineError::InvalidDefinitionsFile(format!(
                "definition count exceeds {MAX_DEFINITIONS}"
            )));
        }
        let mut registered = 0;
        for row in rows {
            let id = row.canonical_id();
            if self.registry.has(&id) {
                tracing::warn!(def_id = %id, "Duplicate definition id in hydration pass");
                return Err(EngineError::DuplicateDefinitionId(id));
            }
            let definition = Definition::from_row(row)?;
            if let Definition::ValueTester(tester_def) = &definition {
                self.testers
                    .insert(tester_def.id.clone(), tester::build_tester(tester_def));
            }
            tracing::debug!(def_id = %id, category = %definition.category(), "Registered definition");
            self.registry.add(id, definition);
            registered += 1;
        }
        tracing::debug!(total = self.registry.len(), "Hydration pass complete");
        Ok(registered)
    }

    /// Hydrate a definitions JSON payload (an array of flat rows).
    ///
    /// # Returns
    /// * `Err(EngineError::InvalidDefinitionsFile)` - payload is too
    ///   large or not well-formed
    pub fn hydrate_str(&mut self, json: &str) -> Result<usize> {
        if json.len() > MAX_DEFINITIONS_SIZE {
            return Err(EngineError::InvalidDefinitionsFile(format!(
                "payload of {} bytes exceeds {MAX_DEFINITIONS_SIZE}",
                json.len()
            )));
        }
        let rows: Vec<DefinitionRow> = serde_json::from_str(json)
            .map_err(|e| EngineError::InvalidDefinitionsFile(e.to_string()))?;
        self.hydrate(&rows)
    }

    /// Hydrate a definitions JSON file.
    pub fn hydrate_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "Loading definitions file");
        let content = fs::read_to_string(path)?;
        self.hydrate_str(&content)
    }

    /// Category of a registered identifier, if present.
    #[must_use]
    pub fn definition_category(&self, id: &str) -> Option<DefinitionCategory> {
        self.registry.category_of(id)
    }

    /// Whether an attribute identifier is permitted on every element,
    /// by configuration or by its registered definition's global flag.
    #[must_use]
    pub fn is_global_attribute(&self, id: &str) -> bool {
        if self.config.is_global_attribute(id) {
            return true;
        }
        matches!(
            self.registry.get(id),
            Ok(Definition::Attribute(def)) if def.global
        )
    }

    fn tester_for(
        &self,
        name: Option<&str>,
        default: Arc<dyn ValueTester>,
    ) -> Arc<dyn ValueTester> {
        match name {
            Some(name) => self.testers.get(name).map(Arc::clone).unwrap_or(default),
            None => default,
        }
    }

    /// Construct an attribute instance from its registered definition.
    ///
    /// # Returns
    /// * `Err(EngineError::DefinitionNotFound)` - identifier unknown
    /// * `Err(EngineError::InvalidDefinitionId)` - identifier is
    ///   registered under a non-Attribute category
    pub fn make_attribute(&self, id: &str) -> Result<Attribute> {
        let key = resolve::resolve(id, DefinitionCategory::Attribute);
        match self.registry.get(&key)? {
            Definition::Attribute(def) => Ok(Attribute::from_definition(
                def,
                self.tester_for(def.value_tester.as_deref(), tester::always_valid()),
            )),
            other => Err(EngineError::InvalidDefinitionId {
                id: key,
                category: other.category().to_string(),
            }),
        }
    }

    /// Construct an event instance from its registered definition.
    ///
    /// Events without an explicit tester get the conventional script
    /// tester.
    pub fn make_event(&self, id: &str) -> Result<Attribute> {
        match self.registry.get(id)? {
            Definition::Event(def) => Ok(Attribute::from_event_definition(
                def,
                self.tester_for(def.value_tester.as_deref(), tester::script_value()),
            )),
            other => Err(EngineError::InvalidDefinitionId {
                id: id.to_string(),
                category: other.category().to_string(),
            }),
        }
    }

    /// Construct a custom data attribute. Never consults the registry.
    pub fn make_custom_data(&self, name: &str) -> Result<Attribute> {
        Attribute::custom_data(name)
    }

    /// Construct the attribute or event an element referenced lazily.
    ///
    /// Permission is validated against the element first; then the
    /// registry decides the category. The returned instance is fresh
    /// and not yet attached; the element stores it.
    ///
    /// # Returns
    /// * `Err(EngineError::AttributeNotAllowed)` - not permitted on
    ///   this element
    /// * `Err(EngineError::DefinitionNotFound)` - identifier unknown
    /// * `Err(EngineError::InvalidDefinitionId)` - category is neither
    ///   Attribute nor Event
    pub fn build_attribute_for(&self, element: &Element, id: &str) -> Result<Attribute> {
        if let Some(name) = id.strip_prefix(CUSTOM_DATA_PREFIX) {
            return Attribute::custom_data(name);
        }
        if !element.is_allowed_attribute(id) {
            return Err(EngineError::AttributeNotAllowed {
                element: element.name().unwrap_or_else(|| element.id()).to_string(),
                attribute: id.to_string(),
            });
        }
        match self.registry.get(id)?.category() {
            DefinitionCategory::Attribute => self.make_attribute(id),
            DefinitionCategory::Event => self.make_event(id),
            category => Err(EngineError::InvalidDefinitionId {
                id: id.to_string(),
                category: category.to_string(),
            }),
        }
    }

    /// Construct an element from its registered definition and bind
    /// this builder onto it.
    ///
    /// # Returns
    /// * `Err(EngineError::InvalidTagName)` - no such element in the
    ///   registry
    /// * `Err(EngineError::InvalidDefinitionId)` - identifier is
    ///   registered under a non-Element category
    pub fn make_element(self: &Arc<Self>, name: &str) -> Result<Element> {
        let key = resolve::resolve(name, DefinitionCategory::Element);
        if !self.registry.has(&key) {
            return Err(EngineError::InvalidTagName(name.to_string()));
        }
        match self.registry.get(&key)? {
            Definition::Element(def) => {
                let mut element = Element::from_definition(def);
                // Second construction phase: the element needs a live
                // reference back to the builder for lazy attribute
                // creation.
                element.bind_builder(Arc::clone(self));
                tracing::debug!(def_id = %key, "Constructed element");
                Ok(element)
            }
            other => Err(EngineError::InvalidDefinitionId {
                id: key,
                category: other.category().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Scalar;
    use pretty_assertions::assert_eq;

    fn rows_json() -> &'static str {
        r#"[
            {"name": "script_value", "def_type": "attribute_value_tester", "variant": "script"},
            {"name": "href", "def_type": "attribute", "case_sensitive": true},
            {"name": "class", "def_type": "attribute", "variant": "multi_value", "global": true},
            {"name": "disabled", "def_type": "attribute", "variant": "void"},
            {"name": "cite", "def_type": "attribute"},
            {"name": "cite", "def_type": "element", "allowed_attributes": ["cite"]},
            {"name": "a", "def_type": "element", "allowed_attributes": ["href"]},
            {"name": "br", "def_type": "element", "variant": "void"},
            {"name": "onclick", "def_type": "event", "value_tester": "script_value"},
            {"name": "doctype", "def_type": "other"}
        ]"#
    }

    fn hydrated() -> Arc<Builder> {
        let mut builder = Builder::new(EngineConfig::default());
        builder.hydrate_str(rows_json()).expect("fixture should hydrate");
        builder.into_shared()
    }

    #[test]
    fn test_hydration_registers_all_rows() {
        let builder = hydrated();
        assert_eq!(builder.registry().len(), 10);
        assert_eq!(
            builder.definition_category("cite_attr"),
            Some(DefinitionCategory::Attribute)
        );
        assert_eq!(
            builder.definition_category("cite_element"),
            Some(DefinitionCategory::Element)
        );
        assert_eq!(
            builder.definition_category("onclick"),
            Some(DefinitionCategory::Event)
        );
    }

    #[test]
    fn test_duplicate_id_aborts_and_keeps_first() {
        let mut builder = Builder::new(EngineConfig::default());
        let json = r#"[
            {"name": "href", "def_type": "attribute", "case_sensitive": true},
            {"name": "href", "def_type": "attribute"}
        ]"#;
        let result = builder.hydrate_str(json);
        assert!(matches!(result, Err(EngineError::DuplicateDefinitionId(id)) if id == "href"));
        assert_eq!(builder.registry().len(), 1);
        // The first row survives.
        assert!(builder.registry().has("href"));
    }

    #[test]
    fn test_duplicate_detection_is_cumulative_across_passes() {
        let mut builder = Builder::new(EngineConfig::default());
        builder
            .hydrate_str(r#"[{"name": "href", "def_type": "attribute"}]"#)
            .expect("first pass should hydrate");
        let result = builder.hydrate_str(r#"[{"name": "href", "def_type": "attribute"}]"#);
        assert!(matches!(result, Err(EngineError::DuplicateDefinitionId(_))));
    }

    #[test]
    fn test_malformed_payload() {
        let mut builder = Builder::new(EngineConfig::default());
        assert!(matches!(
            builder.hydrate_str("not json"),
            Err(EngineError::InvalidDefinitionsFile(_))
        ));
    }

    #[test]
    fn test_make_attribute() {
        let builder = hydrated();
        let mut href = builder.make_attribute("href").expect("registered");
        href.set_value(&[Scalar::from("/Home")]).expect("set should succeed");
        assert_eq!(href.render(), "href='/Home'");
    }

    #[test]
    fn test_make_attribute_wrong_category() {
        let builder = hydrated();
        assert!(matches!(
            builder.make_attribute("doctype"),
            Err(EngineError::InvalidDefinitionId { .. })
        ));
        assert!(matches!(
            builder.make_attribute("missing"),
            Err(EngineError::DefinitionNotFound(_))
        ));
    }

    #[test]
    fn test_make_event_uses_registered_tester() {
        let builder = hydrated();
        let mut onclick = builder.make_event("onclick").expect("registered");
        assert!(onclick.set_value(&[Scalar::from("nope")]).is_err());
        onclick.set_value(&[Scalar::from("go();")]).expect("script should pass");
    }

    #[test]
    fn test_make_element_resolves_and_binds() {
        let builder = hydrated();
        let mut a = builder.make_element("a").expect("registered");
        assert_eq!(a.name(), Some("a"));
        // Lazy creation works, so the builder is bound.
        a.set("href", "/x").expect("href allowed on a");
        assert_eq!(a.generate_opening_tag().expect("named"), "<a href='/x'>");
    }

    #[test]
    fn test_make_element_unknown_tag() {
        let builder = hydrated();
        assert!(matches!(
            builder.make_element("blink"),
            Err(EngineError::InvalidTagName(_))
        ));
    }

    #[test]
    fn test_make_element_rejects_attribute_id() {
        let builder = hydrated();
        assert!(matches!(
            builder.make_element("href"),
            Err(EngineError::InvalidDefinitionId { .. })
        ));
    }

    #[test]
    fn test_ambiguous_element_and_attribute_coexist() {
        let builder = hydrated();
        let mut cite = builder.make_element("cite").expect("cite element registered");
        cite.set("cite", "source").expect("cite attribute allowed");
        assert_eq!(
            cite.generate_opening_tag().expect("named"),
            "<cite cite='source'>"
        );
    }

    #[test]
    fn test_lazy_attribute_not_allowed() {
        let builder = hydrated();
        let mut a = builder.make_element("a").expect("registered");
        // "disabled" is neither global nor in a's allow-list.
        assert!(matches!(
            a.set("disabled", true),
            Err(EngineError::AttributeNotAllowed { .. })
        ));
    }

    #[test]
    fn test_lazy_event_and_global_attribute() {
        let builder = hydrated();
        let mut a = builder.make_element("a").expect("registered");
        // Events are permitted on every element.
        a.set_event("onclick", "go();").expect("event allowed");
        // Globals bypass the allow-list.
        a.set_attribute("class", &[Scalar::from("big"), Scalar::from("Red")])
            .expect("global allowed");
        assert_eq!(
            a.generate_opening_tag().expect("named"),
            "<a onclick='go();' class='big red'>"
        );
    }

    #[test]
    fn test_permission_paths_agree_on_definition_globals() {
        // No configured globals; "class" is global only through its
        // definition row.
        let mut builder = Builder::new(EngineConfig::new(Vec::<String>::new()));
        builder.hydrate_str(rows_json()).expect("fixture should hydrate");
        let builder = builder.into_shared();

        let mut a = builder.make_element("a").expect("registered");
        a.set_attribute("class", &[Scalar::from("x")])
            .expect("definition-level global should pass the lazy path");

        let mut class = builder.make_attribute("class").expect("registered");
        class.set_value(&[Scalar::from("y")]).expect("set should succeed");
        a.insert_attribute(class).expect("instance path should agree");
        assert_eq!(a.attribute_count(), 1);

        // Non-global instances outside the allow-list fail both ways.
        let disabled = builder.make_attribute("disabled").expect("registered");
        assert!(matches!(
            a.insert_attribute(disabled),
            Err(EngineError::AttributeNotAllowed { .. })
        ));
    }
}
