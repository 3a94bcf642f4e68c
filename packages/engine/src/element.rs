//! Element variant model
//!
//! Elements come in two structural shapes: void elements (no children,
//! no closing tag) and containers (ordered children, inner text, a
//! closing tag). Both share the attribute and event attachment
//! behavior.
//!
//! An element starts nameless and empty. Assigning a display name
//! resets the attribute map, since the set of legal attributes is a
//! function of the name; stale attributes from a previous name must
//! not survive. Attribute instances are created lazily through the
//! bound builder on first reference.

use crate::attribute::{Attribute, AttributeMask, CUSTOM_DATA_PREFIX};
use crate::builder::Builder;
use crate::definition::{ElementDefinition, ElementVariant};
use crate::error::{EngineError, Result};
use crate::resolve;
use crate::types::{DefinitionCategory, Message, Scalar};
use indexmap::IndexMap;
use std::sync::Arc;

/// One entry in a container element's ordered child sequence.
#[derive(Debug, Clone)]
pub enum Child {
    /// Nested element
    Element(Element),
    /// Translatable message, escaped by the formatter
    Message(Message),
    /// Literal text, escaped by the formatter
    Text(String),
}

impl Child {
    /// The nested element, if this child is one.
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Child::Element(el) => Some(el),
            _ => None,
        }
    }
}

/// Runtime element instance.
///
/// Created by the builder from a definition; mutated through the
/// attribute and child setters; destroyed with its owning tree.
#[derive(Debug, Clone)]
pub struct Element {
    id: String,
    name: Option<String>,
    variant: ElementVariant,
    attributes: IndexMap<String, Attribute>,
    allowed_attributes: Vec<String>,
    allowed_children: Vec<String>,
    children: IndexMap<String, Child>,
    inner_text: Option<String>,
    builder: Option<Arc<Builder>>,
}

impl Element {
    /// Create a nameless, empty element of the given shape.
    ///
    /// Useful for hand-built trees in tests; factory-made elements
    /// come pre-named from their definition.
    #[must_use]
    pub fn new(variant: ElementVariant) -> Self {
        Self {
            id: String::new(),
            name: None,
            variant,
            attributes: IndexMap::new(),
            allowed_attributes: Vec::new(),
            allowed_children: Vec::new(),
            children: IndexMap::new(),
            inner_text: None,
            builder: None,
        }
    }

    /// Construct an element from its definition.
    ///
    /// The builder reference is bound as a second step immediately
    /// after construction (see [`Element::bind_builder`]); building
    /// the element first avoids a circular construction dependency
    /// between the registry and the builder.
    #[must_use]
    pub fn from_definition(def: &ElementDefinition) -> Self {
        Self {
            id: def.id.clone(),
            name: Some(def.name.clone()),
            variant: def.variant,
            attributes: IndexMap::new(),
            allowed_attributes: def.allowed_attributes.clone(),
            allowed_children: def.allowed_children.clone(),
            children: IndexMap::new(),
            inner_text: None,
            builder: None,
        }
    }

    /// Bind the builder used for lazy attribute creation.
    pub fn bind_builder(&mut self, builder: Arc<Builder>) {
        self.builder = Some(builder);
    }

    fn builder(&self) -> Result<&Arc<Builder>> {
        self.builder
            .as_ref()
            .ok_or_else(|| EngineError::UnboundElement(self.describe()))
    }

    fn describe(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.id.clone())
    }

    /// Canonical identifier this element was constructed with.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name, if one has been assigned.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Structural shape of this element.
    #[must_use]
    pub fn variant(&self) -> ElementVariant {
        self.variant
    }

    /// Whether this element renders without a closing tag.
    #[must_use]
    pub fn is_void(&self) -> bool {
        self.variant == ElementVariant::Void
    }

    /// Assign the display name and reset the attribute map.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
        self.attributes.clear();
    }

    /// Check whether an attribute identifier is permitted here.
    ///
    /// True when the identifier is a custom data attribute, globally
    /// permitted (by configuration or by its definition's global
    /// flag), in this element's allow-list, or the registry reports
    /// its category as Event (events are permitted on every element).
    /// An empty allow-list is permissive.
    #[must_use]
    pub fn is_allowed_attribute(&self, id: &str) -> bool {
        let key = resolve::resolve(id, DefinitionCategory::Attribute);
        if key.starts_with(CUSTOM_DATA_PREFIX) {
            return true;
        }
        if let Some(builder) = &self.builder {
            if builder.is_global_attribute(&key) {
                return true;
            }
            if builder.registry().category_of(&key) == Some(DefinitionCategory::Event) {
                return true;
            }
        }
        self.allowed_attributes.is_empty() || self.allowed_attributes.iter().any(|a| a == &key)
    }

    /// Permission check for an already-constructed instance.
    ///
    /// Defers to [`Element::is_allowed_attribute`] so the lazy by-id
    /// path and the instance path always agree; the variant itself
    /// only decides for events, which are permitted everywhere.
    #[must_use]
    pub fn is_allowed_attribute_instance(&self, attribute: &Attribute) -> bool {
        attribute.is_event() || self.is_allowed_attribute(attribute.id())
    }

    /// Return the owned attribute for an identifier, creating it via
    /// the bound builder when first referenced.
    ///
    /// # Returns
    /// * `Err(EngineError::AttributeNotAllowed)` - identifier not
    ///   permitted on this element
    /// * `Err(EngineError::InvalidDefinitionId)` - identifier resolves
    ///   to a category that is neither Attribute nor Event
    /// * `Err(EngineError::DefinitionNotFound)` - identifier unknown to
    ///   the registry
    pub fn make_or_get_attribute(&mut self, id: &str) -> Result<&mut Attribute> {
        let key = resolve::resolve(id, DefinitionCategory::Attribute);
        if !self.attributes.contains_key(&key) {
            let builder = Arc::clone(self.builder()?);
            let mut attribute = builder.build_attribute_for(self, &key)?;
            attribute.mark_attached();
            self.attributes.insert(key.clone(), attribute);
        }
        self.attributes
            .get_mut(&key)
            .ok_or_else(|| EngineError::DefinitionNotFound(key))
    }

    /// Set an attribute value by identifier, lazily creating the
    /// attribute on first reference.
    pub fn set_attribute(&mut self, id: &str, values: &[Scalar]) -> Result<()> {
        self.make_or_get_attribute(id)?.set_value(values)
    }

    /// Explicit single-value form of [`Element::set_attribute`].
    pub fn set(&mut self, id: &str, value: impl Into<Scalar>) -> Result<()> {
        self.set_attribute(id, &[value.into()])
    }

    /// Read an attribute by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Attribute> {
        let key = resolve::resolve(id, DefinitionCategory::Attribute);
        self.attributes.get(&key)
    }

    /// Store an already-constructed attribute instance, keyed by its
    /// identifier. Overwrites any prior attribute with the same
    /// identifier.
    ///
    /// # Returns
    /// * `Err(EngineError::AttributeNotAllowed)` - instance not
    ///   permitted on this element
    pub fn insert_attribute(&mut self, mut attribute: Attribute) -> Result<()> {
        if !self.is_allowed_attribute_instance(&attribute) {
            return Err(EngineError::AttributeNotAllowed {
                element: self.describe(),
                attribute: attribute.id().to_string(),
            });
        }
        attribute.mark_attached();
        self.attributes
            .insert(attribute.id().to_string(), attribute);
        Ok(())
    }

    /// Set an event handler by identifier.
    pub fn set_event(&mut self, id: &str, script: &str) -> Result<()> {
        self.set_attribute(id, &[Scalar::from(script)])
    }

    /// Set a custom data attribute (`data-` prefixed).
    ///
    /// Custom data never passes through the registry; it is permitted
    /// on every element.
    pub fn set_custom_data(&mut self, name: &str, value: impl Into<Scalar>) -> Result<()> {
        let mut attribute = Attribute::custom_data(name)?;
        attribute.set_value(&[value.into()])?;
        attribute.mark_attached();
        self.attributes
            .insert(attribute.id().to_string(), attribute);
        Ok(())
    }

    /// Rename a stored custom data attribute, re-keying its storage
    /// entry so the prefixed identifier stays the lookup key.
    ///
    /// `from` accepts the plain name or the `data-` prefixed form; the
    /// renamed attribute moves to the end of the insertion order.
    ///
    /// # Returns
    /// * `Err(EngineError::DefinitionNotFound)` - nothing stored under
    ///   `from`
    /// * `Err(EngineError::InvalidCustomDataName)` - `to` contains
    ///   characters outside `[a-z0-9]`
    pub fn rename_custom_data(&mut self, from: &str, to: &str) -> Result<()> {
        let key = if from.starts_with(CUSTOM_DATA_PREFIX) {
            from.to_string()
        } else {
            format!("{CUSTOM_DATA_PREFIX}{from}")
        };
        let mut attribute = self
            .attributes
            .shift_remove(&key)
            .ok_or_else(|| EngineError::DefinitionNotFound(key.clone()))?;
        let renamed = attribute.rename_attached(to);
        // Reinsert under whatever identifier the attribute now carries,
        // so a rejected rename keeps the original entry.
        self.attributes
            .insert(attribute.id().to_string(), attribute);
        renamed
    }

    /// Remove an attribute by identifier. Removing an absent key is
    /// not an error.
    pub fn remove_attribute(&mut self, id: &str) {
        let key = resolve::resolve(id, DefinitionCategory::Attribute);
        self.attributes.shift_remove(&key);
    }

    /// Stored attributes filtered by category mask, in insertion
    /// order.
    pub fn attributes(&self, mask: AttributeMask) -> impl Iterator<Item = (&str, &Attribute)> {
        self.attributes
            .iter()
            .filter(move |entry| mask.matches(entry.1))
            .map(|(id, attr)| (id.as_str(), attr))
    }

    /// Number of stored attributes and events.
    #[must_use]
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Serialize the opening tag.
    ///
    /// Concatenates `<name`, the space-joined render of every stored
    /// attribute and event in insertion order (skipping empties), then
    /// `>`.
    ///
    /// # Returns
    /// * `Err(EngineError::UnsetTagName)` - no display name assigned
    pub fn generate_opening_tag(&self) -> Result<String> {
        let name = self
            .name
            .as_deref()
            .ok_or_else(|| EngineError::UnsetTagName(self.id.clone()))?;
        let mut tag = String::from("<");
        tag.push_str(name);
        for (_, attribute) in self.attributes(AttributeMask::default()) {
            let rendered = attribute.render();
            if !rendered.is_empty() {
                tag.push(' ');
                tag.push_str(&rendered);
            }
        }
        tag.push('>');
        Ok(tag)
    }

    /// Serialize the closing tag. Void elements have none and return
    /// the empty string.
    ///
    /// # Returns
    /// * `Err(EngineError::UnsetTagName)` - no display name assigned
    pub fn generate_closing_tag(&self) -> Result<String> {
        let name = self
            .name
            .as_deref()
            .ok_or_else(|| EngineError::UnsetTagName(self.id.clone()))?;
        match self.variant {
            ElementVariant::Void => Ok(String::new()),
            ElementVariant::Container => Ok(format!("</{name}>")),
        }
    }

    fn require_container(&self, child: &str) -> Result<()> {
        if self.is_void() {
            return Err(EngineError::ChildNotAllowed {
                element: self.describe(),
                child: child.to_string(),
            });
        }
        Ok(())
    }

    /// Attach a child element, returning the key it was stored under.
    ///
    /// Without an explicit key, a key of the form `{tag}{n}` is
    /// generated, where `n` counts previously-added children sharing
    /// the child's display name. An explicit key overwrites on
    /// collision.
    ///
    /// # Returns
    /// * `Err(EngineError::ChildNotAllowed)` - this element is void,
    ///   or the child's identifier is not in the allow-list
    pub fn set_child(&mut self, child: Element, key: Option<&str>) -> Result<String> {
        let child_name = child.describe();
        self.require_container(&child_name)?;
        if !self.allowed_children.is_empty()
            && !self.allowed_children.iter().any(|c| c == child.id())
        {
            return Err(EngineError::ChildNotAllowed {
                element: self.describe(),
                child: child_name,
            });
        }
        let key = match key {
            Some(k) => k.to_string(),
            None => {
                let same_name = self
                    .children
                    .values()
                    .filter_map(Child::as_element)
                    .filter(|el| el.describe() == child_name)
                    .count();
                format!("{child_name}{same_name}")
            }
        };
        self.children.insert(key.clone(), Child::Element(child));
        Ok(key)
    }

    /// Attach a literal text child.
    pub fn add_text(&mut self, text: impl Into<String>) -> Result<String> {
        self.require_container("#text")?;
        let count = self
            .children
            .values()
            .filter(|c| matches!(c, Child::Text(_)))
            .count();
        let key = format!("text{count}");
        self.children.insert(key.clone(), Child::Text(text.into()));
        Ok(key)
    }

    /// Attach a translatable message child.
    pub fn add_message(&mut self, message: Message) -> Result<String> {
        self.require_container(&message.key)?;
        let count = self
            .children
            .values()
            .filter(|c| matches!(c, Child::Message(_)))
            .count();
        let key = format!("message{count}");
        self.children.insert(key.clone(), Child::Message(message));
        Ok(key)
    }

    /// Read a child by key.
    #[must_use]
    pub fn get_child(&self, key: &str) -> Option<&Child> {
        self.children.get(key)
    }

    /// Ordered child enumeration; the formatter recurses over this.
    pub fn children(&self) -> impl Iterator<Item = (&str, &Child)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Lazy filtered view over the children.
    pub fn children_where<'a, F>(&'a self, filter: F) -> impl Iterator<Item = (&'a str, &'a Child)>
    where
        F: Fn(&Child) -> bool + 'a,
    {
        self.children().filter(move |entry| filter(entry.1))
    }

    /// Number of attached children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Set the inner text slot, overwriting any previous inner text.
    ///
    /// The slot is single and mutually exclusive per nesting level;
    /// mixing text between child elements requires nesting a child
    /// container.
    pub fn set_inner_text(&mut self, text: impl Into<String>) -> Result<()> {
        self.require_container("#text")?;
        self.inner_text = Some(text.into());
        Ok(())
    }

    /// The inner text slot, if set.
    #[must_use]
    pub fn inner_text(&self) -> Option<&str> {
        self.inner_text.as_deref()
    }
}
