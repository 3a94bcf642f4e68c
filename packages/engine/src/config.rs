//! Engine configuration
//!
//! One explicitly-constructed, immutable configuration object passed
//! into the builder at startup and threaded through every component
//! that needs it. There are no mutable module-level tables: the global
//! attribute set lives here, and the limits below are compile-time
//! constants guarding the hydration path.

use std::collections::HashSet;

/// Maximum number of definition rows accepted in one hydration pass.
///
/// The full HTML5 definition set is a few hundred rows; 10,000 leaves
/// generous headroom while preventing memory exhaustion from a
/// malformed payload.
pub const MAX_DEFINITIONS: usize = 10_000;

/// Maximum definitions payload size in bytes (4 MB).
///
/// Prevents excessive memory usage while parsing; a complete
/// definition set is well under 1 MB.
pub const MAX_DEFINITIONS_SIZE: usize = 4_000_000;

/// Maximum number of values accepted by one multi-value setter call.
///
/// Class lists and token sets are small in practice; 1,000 prevents
/// abuse without constraining legitimate use.
pub const MAX_VALUES_PER_ATTRIBUTE: usize = 1_000;

/// Immutable engine configuration.
///
/// Created once at startup; the builder holds it for the lifetime of
/// the registry.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Canonical identifiers of attributes permitted on every element.
    global_attributes: HashSet<String>,
}

impl EngineConfig {
    /// Create a configuration with an explicit global-attribute set.
    ///
    /// Identifiers must already be canonical (ambiguous names carry
    /// their `_attr` suffix).
    #[must_use]
    pub fn new(global_attributes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            global_attributes: global_attributes.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether an attribute identifier is globally permitted.
    #[must_use]
    pub fn is_global_attribute(&self, id: &str) -> bool {
        self.global_attributes.contains(id)
    }

    /// Number of configured global attributes.
    #[must_use]
    pub fn global_attribute_count(&self) -> usize {
        self.global_attributes.len()
    }
}

impl Default for EngineConfig {
    /// The standard HTML5 global attribute set, canonicalized.
    fn default() -> Self {
        Self::new([
            "accesskey",
            "class",
            "contenteditable",
            "dir",
            "draggable",
            "hidden",
            "id",
            "lang",
            "spellcheck",
            "style_attr",
            "tabindex",
            "title_attr",
            "translate",
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_globals_are_canonical() {
        let config = EngineConfig::default();
        assert!(config.is_global_attribute("class"));
        assert!(config.is_global_attribute("style_attr"));
        assert!(!config.is_global_attribute("style"));
        assert!(!config.is_global_attribute("href"));
    }

    #[test]
    fn test_explicit_global_set() {
        let config = EngineConfig::new(["id"]);
        assert!(config.is_global_attribute("id"));
        assert!(!config.is_global_attribute("class"));
        assert_eq!(config.global_attribute_count(), 1);
    }

    #[test]
    fn test_constants_are_reasonable() {
        assert!(MAX_DEFINITIONS >= 1_000, "Should allow a full HTML5 set");
        assert!(MAX_DEFINITIONS <= 100_000, "Should not allow excessive rows");

        assert!(MAX_DEFINITIONS_SIZE >= 1_000_000, "Should allow at least 1MB");
        assert!(MAX_DEFINITIONS_SIZE <= 10_000_000, "Should not allow 10MB+");

        assert!(MAX_VALUES_PER_ATTRIBUTE >= 100, "Should allow long token lists");
        assert!(MAX_VALUES_PER_ATTRIBUTE <= 10_000, "Should limit huge lists");
    }
}
