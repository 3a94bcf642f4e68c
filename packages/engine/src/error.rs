//! Error types for the Tagwerk engine

use thiserror::Error;

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// The definitions payload could not be read or is not well-formed
    #[error("Invalid definitions file: {0}")]
    InvalidDefinitionsFile(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Two definition rows hydrate to the same canonical identifier
    #[error("Duplicate definition id: {0}")]
    DuplicateDefinitionId(String),

    /// Identifier not present in the definition registry
    #[error("Definition not found: {0}")]
    DefinitionNotFound(String),

    /// Identifier resolves in the registry but to an unusable category
    #[error("Definition '{id}' has category {category}, which cannot be used here")]
    InvalidDefinitionId { id: String, category: String },

    /// Element identifier not found in the registry
    #[error("Invalid tag name: {0}")]
    InvalidTagName(String),

    /// Value failed type or tester validation
    #[error("Invalid value for attribute '{attribute}': {value}")]
    InvalidAttributeValue { attribute: String, value: String },

    /// Wrong argument count for a value setter
    #[error("Attribute '{attribute}' expects {expected} value(s), got {actual}")]
    InvalidNumberOfParameters {
        attribute: String,
        expected: String,
        actual: usize,
    },

    /// Attribute identifier fails the attribute name grammar
    #[error("Invalid attribute identifier: {0}")]
    InvalidAttributeIdName(String),

    /// Event identifier fails the lower-case-alphabetic event grammar
    #[error("Invalid event name: {0}")]
    InvalidEventName(String),

    /// Custom data name contains characters outside [a-z0-9]
    #[error("Invalid custom data name: {0}")]
    InvalidCustomDataName(String),

    /// Operation does not apply to this attribute's variant or state
    #[error("Invalid operation on attribute '{attribute}': {reason}")]
    InvalidAttributeOperation { attribute: String, reason: String },

    /// Attribute identifier is not permitted on this element
    #[error("Attribute '{attribute}' is not allowed on element '{element}'")]
    AttributeNotAllowed { element: String, attribute: String },

    /// Child identifier is not permitted under this element
    #[error("Child '{child}' is not allowed under element '{element}'")]
    ChildNotAllowed { element: String, child: String },

    /// Tag generation requested before a display name was assigned
    #[error("Element '{0}' has no tag name set")]
    UnsetTagName(String),

    /// Lazy attribute creation requested on an element with no bound builder
    #[error("Element '{0}' is not bound to a builder")]
    UnboundElement(String),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
