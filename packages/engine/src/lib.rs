//! Tagwerk Engine
//!
//! A definition-driven HTML element tree builder. This library
//! provides functionality for:
//! - Hydrating a declarative definition set (JSON) into an immutable
//!   registry with identifier disambiguation and duplicate detection
//! - Constructing attributes, events and elements from definitions,
//!   with lazy attribute creation on elements
//! - Validating values through pluggable testers and permission rules
//! - Rendering the finished tree into an HTML5 string
//!
//! # Example
//!
//! ```ignore
//! use tagwerk_engine::{Builder, EngineConfig};
//!
//! let mut builder = Builder::new(EngineConfig::default());
//! builder.hydrate_file("definitions/html5.json")?;
//! let builder = builder.into_shared();
//!
//! let mut a = builder.make_element("a")?;
//! a.set("href", "/docs")?;
//! a.set_event("onclick", "track();")?;
//! a.set_inner_text("Documentation")?;
//!
//! let html = tagwerk_engine::format::render_tree(&a)?;
//! ```

pub mod attribute;
pub mod builder;
pub mod config;
pub mod definition;
pub mod element;
pub mod error;
pub mod format;
pub mod registry;
pub mod resolve;
pub mod tester;
pub mod types;

// Re-export commonly used items
pub use attribute::{Attribute, AttributeMask, AttributeValue, CUSTOM_DATA_PREFIX};
pub use builder::Builder;
pub use config::EngineConfig;
pub use definition::{
    AttributeDefinition, AttributeVariant, DataType, Definition, DefinitionRow,
    ElementDefinition, ElementVariant, EventDefinition, TesterDefinition, TesterKind,
};
pub use element::{Child, Element};
pub use error::{EngineError, Result};
pub use format::{escape_text, render_tree};
pub use registry::DefinitionRegistry;
pub use resolve::{is_ambiguous, resolve, AMBIGUOUS_NAMES};
pub use tester::ValueTester;
pub use types::{DefinitionCategory, Message, Scalar};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
