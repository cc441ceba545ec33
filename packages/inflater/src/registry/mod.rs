//! Component factory resolution.
//!
//! This module maps element tags to instantiable component types. Types
//! carry their property tables, child policy and factory; the registry
//! resolves a tag by custom registration, import namespace or the built-in
//! default namespace.

mod component;
mod core;
mod library;

pub use component::{ChildPolicy, Component, ComponentFactory, ComponentType, PropertySpec, Widget};
pub use self::core::ComponentRegistry;
pub use library::{create_default_library, default_library};
