//! Attribute and event variant model
//!
//! The four constructible value-holding shapes (Void, SingleValue,
//! MultiValue, CustomData) plus Event form a closed variant set
//! sharing the `set_value`/`value`/`render` contract. The variant is
//! selected from the definition at construction time; dispatch happens
//! inside [`Attribute::set_value`] and [`Attribute::render`], not
//! through an inheritance chain.
//!
//! Validation is all-or-nothing: a setter that fails leaves the stored
//! value untouched.

use crate::config::MAX_VALUES_PER_ATTRIBUTE;
use crate::definition::{
    is_valid_custom_data_name, AttributeDefinition, AttributeVariant, DataType, EventDefinition,
};
use crate::error::{EngineError, Result};
use crate::tester::{self, ValueTester};
use crate::types::Scalar;
use std::ops::BitOr;
use std::sync::Arc;

/// Identifier prefix for custom data attributes.
pub const CUSTOM_DATA_PREFIX: &str = "data-";

/// Bitmask selecting which stored attributes a query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeMask(u8);

impl AttributeMask {
    /// Plain attributes (every variant except Event).
    pub const ATTRIBUTES: AttributeMask = AttributeMask(0b01);
    /// Event attributes.
    pub const EVENTS: AttributeMask = AttributeMask(0b10);

    /// Whether the mask selects plain attributes.
    #[must_use]
    pub fn includes_attributes(self) -> bool {
        self.0 & Self::ATTRIBUTES.0 != 0
    }

    /// Whether the mask selects events.
    #[must_use]
    pub fn includes_events(self) -> bool {
        self.0 & Self::EVENTS.0 != 0
    }

    /// Whether the given attribute passes this mask.
    #[must_use]
    pub fn matches(self, attribute: &Attribute) -> bool {
        if attribute.is_event() {
            self.includes_events()
        } else {
            self.includes_attributes()
        }
    }
}

impl Default for AttributeMask {
    fn default() -> Self {
        Self::ATTRIBUTES | Self::EVENTS
    }
}

impl BitOr for AttributeMask {
    type Output = AttributeMask;

    fn bitor(self, rhs: AttributeMask) -> AttributeMask {
        AttributeMask(self.0 | rhs.0)
    }
}

/// Variant-dependent value slot of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// No value assigned yet
    Unset,
    /// Boolean usage flag (Void variant)
    Flag(bool),
    /// Single scalar (SingleValue, CustomData, Event variants)
    Scalar(Scalar),
    /// Ordered list of scalars (MultiValue variant)
    List(Vec<Scalar>),
}

impl AttributeValue {
    /// Whether a value has been assigned.
    #[must_use]
    pub fn is_set(&self) -> bool {
        !matches!(self, AttributeValue::Unset)
    }
}

/// Runtime attribute or event instance.
///
/// Constructed by the builder from a definition on first reference
/// from an element; mutated only through [`Attribute::set_value`];
/// destroyed when the owning element is discarded or the attribute is
/// removed.
#[derive(Debug, Clone)]
pub struct Attribute {
    id: String,
    name: String,
    variant: AttributeVariant,
    data_type: DataType,
    value: AttributeValue,
    tester: Arc<dyn ValueTester>,
    case_sensitive: bool,
    global: bool,
    attached: bool,
}

impl Attribute {
    /// Construct an attribute instance from its definition.
    #[must_use]
    pub fn from_definition(def: &AttributeDefinition, tester: Arc<dyn ValueTester>) -> Self {
        Self {
            id: def.id.clone(),
            name: def.name.clone(),
            variant: def.variant,
            data_type: def.data_type,
            value: AttributeValue::Unset,
            tester,
            case_sensitive: def.case_sensitive,
            global: def.global,
            attached: false,
        }
    }

    /// Construct an event instance from its definition.
    ///
    /// Events are single-value attributes holding a script string;
    /// their identifier grammar was checked at hydration.
    #[must_use]
    pub fn from_event_definition(def: &EventDefinition, tester: Arc<dyn ValueTester>) -> Self {
        Self {
            id: def.id.clone(),
            name: def.name.clone(),
            variant: AttributeVariant::Event,
            data_type: DataType::String,
            value: AttributeValue::Unset,
            tester,
            case_sensitive: true,
            global: true,
            attached: false,
        }
    }

    /// Construct a custom data attribute for the given name.
    ///
    /// The identifier is synthesized as `data-` plus the name; the name
    /// itself is restricted to `[a-z0-9]*`.
    ///
    /// # Returns
    /// * `Err(EngineError::InvalidCustomDataName)` - name contains
    ///   other characters
    pub fn custom_data(name: &str) -> Result<Self> {
        if !is_valid_custom_data_name(name) {
            return Err(EngineError::InvalidCustomDataName(name.to_string()));
        }
        Ok(Self {
            id: format!("{CUSTOM_DATA_PREFIX}{name}"),
            name: name.to_string(),
            variant: AttributeVariant::CustomData,
            data_type: DataType::String,
            value: AttributeValue::Unset,
            tester: tester::always_valid(),
            // Custom data carries user data; never case-fold it.
            case_sensitive: true,
            global: true,
            attached: false,
        })
    }

    /// Canonical identifier; the storage key on elements.
    ///
    /// For custom data this is the `data-` prefixed form, so a plain
    /// attribute and its custom counterpart never collide.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name. For custom data the `data-` prefix is stripped.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename a detached custom data attribute, re-synthesizing its
    /// identifier.
    ///
    /// Once the attribute is stored on an element its identifier is
    /// also the storage key, so renaming must go through
    /// [`crate::element::Element::rename_custom_data`] to keep the two
    /// in sync.
    ///
    /// # Returns
    /// * `Err(EngineError::InvalidAttributeOperation)` - this is not a
    ///   custom data attribute, or it is attached to an element
    /// * `Err(EngineError::InvalidCustomDataName)` - name contains
    ///   characters outside `[a-z0-9]`
    pub fn set_name(&mut self, name: &str) -> Result<()> {
        if self.attached {
            return Err(EngineError::InvalidAttributeOperation {
                attribute: self.id.clone(),
                reason: "attached attributes are renamed through the owning element".to_string(),
            });
        }
        self.apply_rename(name)
    }

    pub(crate) fn mark_attached(&mut self) {
        self.attached = true;
    }

    /// Rename path for the owning element, which re-keys its own
    /// storage entry alongside.
    pub(crate) fn rename_attached(&mut self, name: &str) -> Result<()> {
        self.apply_rename(name)
    }

    fn apply_rename(&mut self, name: &str) -> Result<()> {
        if self.variant != AttributeVariant::CustomData {
            return Err(EngineError::InvalidAttributeOperation {
                attribute: self.id.clone(),
                reason: "only custom data attributes can be renamed".to_string(),
            });
        }
        if !is_valid_custom_data_name(name) {
            return Err(EngineError::InvalidCustomDataName(name.to_string()));
        }
        self.name = name.to_string();
        self.id = format!("{CUSTOM_DATA_PREFIX}{name}");
        Ok(())
    }

    /// The value-holding shape of this attribute.
    #[must_use]
    pub fn variant(&self) -> AttributeVariant {
        self.variant
    }

    /// Whether this instance is an event.
    #[must_use]
    pub fn is_event(&self) -> bool {
        self.variant == AttributeVariant::Event
    }

    /// Whether this attribute is permitted on every element.
    #[must_use]
    pub fn is_global(&self) -> bool {
        self.global
    }

    /// Whether values keep their case.
    #[must_use]
    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Current value slot.
    #[must_use]
    pub fn value(&self) -> &AttributeValue {
        &self.value
    }

    /// The usage flag, for Void attributes.
    #[must_use]
    pub fn as_flag(&self) -> Option<bool> {
        match &self.value {
            AttributeValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    /// The stored scalar, for single-value shapes.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match &self.value {
            AttributeValue::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// The stored list, for multi-value attributes.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Scalar]> {
        match &self.value {
            AttributeValue::List(values) => Some(values),
            _ => None,
        }
    }

    /// Assign a value, dispatching on the variant.
    ///
    /// Validation order for value-carrying variants: argument count,
    /// case normalization, data type, value tester. A failure leaves
    /// the previously stored value untouched.
    ///
    /// # Arguments
    /// * `values` - candidate values; arity depends on the variant
    ///   (Void and single-value shapes take exactly one, MultiValue
    ///   takes one or more)
    pub fn set_value(&mut self, values: &[Scalar]) -> Result<()> {
        match self.variant {
            AttributeVariant::Void => self.set_flag_value(values),
            AttributeVariant::SingleValue
            | AttributeVariant::CustomData
            | AttributeVariant::Event => self.set_scalar_value(values),
            AttributeVariant::MultiValue => self.set_list_value(values),
        }
    }

    fn set_flag_value(&mut self, values: &[Scalar]) -> Result<()> {
        if values.len() != 1 {
            return Err(self.parameter_error("1", values.len()));
        }
        match values[0].as_bool() {
            Some(flag) => {
                self.value = AttributeValue::Flag(flag);
                Ok(())
            }
            None => Err(self.value_error(&values[0])),
        }
    }

    fn set_scalar_value(&mut self, values: &[Scalar]) -> Result<()> {
        if values.len() != 1 {
            return Err(self.parameter_error("1", values.len()));
        }
        let candidate = self.normalize(&values[0]);
        self.check_candidate(&candidate)?;
        self.value = AttributeValue::Scalar(candidate);
        Ok(())
    }

    fn set_list_value(&mut self, values: &[Scalar]) -> Result<()> {
        if values.is_empty() {
            return Err(self.parameter_error("at least 1", 0));
        }
        if values.len() > MAX_VALUES_PER_ATTRIBUTE {
            return Err(self.parameter_error(
                &format!("at most {MAX_VALUES_PER_ATTRIBUTE}"),
                values.len(),
            ));
        }
        // Every element is normalized and tested before anything is
        // stored; the whole set is rejected if any element fails.
        let mut candidates = Vec::with_capacity(values.len());
        for value in values {
            let candidate = self.normalize(value);
            self.check_candidate(&candidate)?;
            candidates.push(candidate);
        }
        self.value = AttributeValue::List(candidates);
        Ok(())
    }

    /// Clear the stored value back to unset.
    pub fn unset(&mut self) {
        self.value = AttributeValue::Unset;
    }

    fn normalize(&self, value: &Scalar) -> Scalar {
        if self.case_sensitive {
            value.clone()
        } else {
            value.to_lowercase()
        }
    }

    fn check_candidate(&self, candidate: &Scalar) -> Result<()> {
        if !matches_data_type(self.data_type, candidate) {
            return Err(self.value_error(candidate));
        }
        if !self.tester.test(candidate) {
            return Err(self.value_error(candidate));
        }
        Ok(())
    }

    fn parameter_error(&self, expected: &str, actual: usize) -> EngineError {
        EngineError::InvalidNumberOfParameters {
            attribute: self.id.clone(),
            expected: expected.to_string(),
            actual,
        }
    }

    fn value_error(&self, value: &Scalar) -> EngineError {
        EngineError::InvalidAttributeValue {
            attribute: self.id.clone(),
            value: value.to_string(),
        }
    }

    /// Name as it appears in serialized markup.
    ///
    /// Custom data renders the prefixed identifier; every other
    /// variant renders the display name.
    #[must_use]
    pub fn render_name(&self) -> &str {
        match self.variant {
            AttributeVariant::CustomData => &self.id,
            _ => &self.name,
        }
    }

    /// Serialize this attribute for an opening tag.
    ///
    /// An unset value renders as the empty string; a Void attribute
    /// renders its bare name when true and nothing otherwise.
    #[must_use]
    pub fn render(&self) -> String {
        match &self.value {
            AttributeValue::Unset | AttributeValue::Flag(false) => String::new(),
            AttributeValue::Flag(true) => self.render_name().to_string(),
            AttributeValue::Scalar(value) => {
                format!("{}='{}'", self.render_name(), escape_value(&value.to_string()))
            }
            AttributeValue::List(values) => {
                let joined = values
                    .iter()
                    .map(|v| escape_value(&v.to_string()))
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("{}='{}'", self.render_name(), joined)
            }
        }
    }
}

/// Escape a value for single-quoted attribute syntax.
fn escape_value(value: &str) -> String {
    value.replace('&', "&amp;").replace('\'', "&#39;")
}

fn matches_data_type(data_type: DataType, value: &Scalar) -> bool {
    match data_type {
        DataType::String => !matches!(value, Scalar::Bool(_)),
        DataType::Integer => matches!(value, Scalar::Int(_)),
        DataType::Number => matches!(value, Scalar::Int(_) | Scalar::Float(_)),
        DataType::Boolean => matches!(value, Scalar::Bool(_)),
    }
}
