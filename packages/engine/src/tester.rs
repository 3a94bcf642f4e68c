//! Pluggable value testers
//!
//! A value tester is a predicate over candidate attribute values,
//! referenced by name from attribute and event definitions. Attributes
//! without a tester accept everything; events default to the script
//! tester.

use crate::definition::{TesterDefinition, TesterKind};
use crate::types::Scalar;
use std::fmt;
use std::sync::Arc;

/// Predicate capability validating a candidate attribute value.
///
/// Testers see the value after case normalization, so a
/// case-insensitive attribute is tested against the lower-cased form.
pub trait ValueTester: Send + Sync {
    /// Check whether the candidate value is acceptable.
    fn test(&self, value: &Scalar) -> bool;

    /// Short name for diagnostics.
    fn name(&self) -> &str;
}

impl fmt::Debug for dyn ValueTester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueTester({})", self.name())
    }
}

/// Accepts every value. The default when an attribute declares no
/// tester.
pub struct AlwaysValid;

impl ValueTester for AlwaysValid {
    fn test(&self, _value: &Scalar) -> bool {
        true
    }

    fn name(&self) -> &str {
        "always"
    }
}

/// "Looks like a script" predicate: a non-empty string terminated with
/// a semicolon. The conventional tester for event values.
pub struct ScriptValue;

impl ValueTester for ScriptValue {
    fn test(&self, value: &Scalar) -> bool {
        match value.as_str() {
            Some(s) => !s.is_empty() && s.trim_end().ends_with(';'),
            None => false,
        }
    }

    fn name(&self) -> &str {
        "script"
    }
}

/// Non-empty string predicate.
pub struct NonEmpty;

impl ValueTester for NonEmpty {
    fn test(&self, value: &Scalar) -> bool {
        match value {
            Scalar::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    fn name(&self) -> &str {
        "non_empty"
    }
}

/// Membership in a fixed value set.
pub struct OneOf {
    values: Vec<String>,
}

impl OneOf {
    /// Create a tester accepting exactly the given values.
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }
}

impl ValueTester for OneOf {
    fn test(&self, value: &Scalar) -> bool {
        self.values.iter().any(|v| v == &value.to_string())
    }

    fn name(&self) -> &str {
        "one_of"
    }
}

/// Build the tester implementation selected by a definition.
#[must_use]
pub fn build_tester(def: &TesterDefinition) -> Arc<dyn ValueTester> {
    match &def.kind {
        TesterKind::Always => Arc::new(AlwaysValid),
        TesterKind::Script => Arc::new(ScriptValue),
        TesterKind::NonEmpty => Arc::new(NonEmpty),
        TesterKind::OneOf(values) => Arc::new(OneOf::new(values.clone())),
    }
}

/// The shared "accept everything" tester instance.
#[must_use]
pub fn always_valid() -> Arc<dyn ValueTester> {
    Arc::new(AlwaysValid)
}

/// The shared script tester instance used for events without an
/// explicit tester.
#[must_use]
pub fn script_value() -> Arc<dyn ValueTester> {
    Arc::new(ScriptValue)
}
