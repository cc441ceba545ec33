//! Layout Inflater - Build component trees from declarative XML layouts.
//!
//! This crate parses layout markup, resolves each element to a component
//! type, converts attribute strings into typed property values and returns
//! the finished component tree together with an id registry that a binder
//! uses to wire the tree to an application controller.
//!
//! # Example
//!
//! ```
//! use layout_inflater::{LayoutInflater, Value};
//!
//! let layout = LayoutInflater::new()
//!     .with_id_prefix("login-")?
//!     .inflate(r#"<VerticalLayout><Button id="ok" caption="OK"/></VerticalLayout>"#)?;
//!
//! assert!(layout.ids().contains("login-ok"));
//! assert_eq!(
//!     layout.component("ok").and_then(|c| c.property("caption")),
//!     Some(&Value::Text("OK".to_string()))
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Architecture
//!
//! The inflater is organized into several modules:
//!
//! - [`config`]: Namespaces, limits, validation and the config file
//! - [`types`]: Core data types (names, locations, values)
//! - [`error`]: Error types and Result alias
//! - [`xml`]: Markup parsing into an owned element tree
//! - [`filter`]: Attribute filter chain
//! - [`parser`]: Attribute value parser registry
//! - [`registry`]: Component types, factories and the built-in library
//! - [`inflater`]: Tree builder, id registry, listeners and includes
//! - [`binder`]: Binder interface and layout builder
//! - [`cli`]: Command-line interface

pub mod binder;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod inflater;
pub mod parser;
pub mod registry;
pub mod types;
pub mod xml;

// Re-export commonly used items
pub use binder::{Binder, FieldBinder, LayoutBuilder};
pub use config::InflaterConfig;
pub use error::{BindError, InflateError, InflateErrorKind, LayoutError, Result};
pub use filter::{AttributeFilter, FilterChain, MessageFilter};
pub use inflater::{
    FragmentLoader, FsFragmentLoader, IdRegistry, InflatedSubtree, InflaterListener, Layout,
    LayoutInflater, MemoryFragmentLoader,
};
pub use parser::{AttributeParser, ParsedValue};
pub use registry::{ChildPolicy, Component, ComponentType, PropertySpec, Widget};
pub use types::{Location, NodeId, QualifiedName, Value, ValueKind};
