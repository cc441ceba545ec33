//! Component types and their property tables.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::types::{Value, ValueKind};

/// A live component instance.
///
/// The inflater only talks to components through their property setters;
/// everything else (rendering, events) belongs to the host library.
pub trait Component: fmt::Debug + Send + Sync {
    /// Fully qualified type name, e.g. `ui.Button`.
    fn type_name(&self) -> &str;

    /// Assign a typed property value.
    ///
    /// # Errors
    /// Returns a reason when the component rejects the value.
    fn set_property(&mut self, name: &str, value: Value) -> Result<(), String>;

    /// Get the current value of a property.
    fn property(&self, name: &str) -> Option<&Value>;

    /// All assigned properties, sorted by name.
    fn properties(&self) -> Vec<(&str, &Value)>;

    /// Downcast support for binders.
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast support for binders.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Generic component storing its properties in a map.
///
/// Used by the built-in library and as the default product of a
/// [`ComponentType`] without a custom factory.
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    type_name: String,
    properties: BTreeMap<String, Value>,
}

impl Widget {
    /// Create a widget without properties.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            properties: BTreeMap::new(),
        }
    }
}

impl Component for Widget {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn set_property(&mut self, name: &str, value: Value) -> Result<(), String> {
        self.properties.insert(name.to_string(), value);
        Ok(())
    }

    fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    fn properties(&self) -> Vec<(&str, &Value)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v)).collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Declaration of one settable property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySpec {
    pub name: String,
    pub kind: ValueKind,
    pub default: Option<Value>,
}

impl PropertySpec {
    /// Declare a property without default.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    /// Set the value applied when the markup does not mention the property.
    #[must_use]
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }
}

/// How many children a component accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChildPolicy {
    /// No children.
    #[default]
    Leaf,
    /// At most one child (panels, windows).
    Single,
    /// Any number of children.
    Many,
}

impl ChildPolicy {
    /// Check whether one more child can be attached.
    ///
    /// # Errors
    /// Returns the reason the child is rejected.
    pub fn accept(&self, existing_children: usize) -> Result<(), String> {
        match self {
            Self::Leaf => Err("component does not accept children".to_string()),
            Self::Single if existing_children >= 1 => {
                Err("component accepts only one child".to_string())
            }
            Self::Single | Self::Many => Ok(()),
        }
    }
}

/// Constructor of component instances.
pub type ComponentFactory =
    Arc<dyn Fn(&ComponentType) -> Result<Box<dyn Component>, String> + Send + Sync>;

/// An instantiable component type with its property table.
///
/// The table is built once when the type is declared; attribute dispatch
/// during inflation is a lookup in it.
#[derive(Clone)]
pub struct ComponentType {
    name: String,
    properties: Vec<PropertySpec>,
    property_index: HashMap<String, usize>,
    slot_properties: Vec<PropertySpec>,
    slot_index: HashMap<String, usize>,
    children: ChildPolicy,
    factory: ComponentFactory,
}

impl ComponentType {
    /// Declare a leaf type producing [`Widget`]s.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            property_index: HashMap::new(),
            slot_properties: Vec::new(),
            slot_index: HashMap::new(),
            children: ChildPolicy::Leaf,
            factory: Arc::new(
                |ty: &ComponentType| -> Result<Box<dyn Component>, String> {
                    Ok(Box::new(Widget::new(ty.name())))
                },
            ),
        }
    }

    /// Add a property. A later declaration with the same name replaces the earlier one.
    #[must_use]
    pub fn with_property(mut self, spec: PropertySpec) -> Self {
        insert_spec(&mut self.properties, &mut self.property_index, spec);
        self
    }

    /// Add several properties.
    #[must_use]
    pub fn with_properties(self, specs: impl IntoIterator<Item = PropertySpec>) -> Self {
        specs.into_iter().fold(self, Self::with_property)
    }

    /// Add a property children can set on their slot in this container
    /// (written as `p:name="..."` on the child).
    #[must_use]
    pub fn with_slot_property(mut self, spec: PropertySpec) -> Self {
        insert_spec(&mut self.slot_properties, &mut self.slot_index, spec);
        self
    }

    /// Set the child policy.
    #[must_use]
    pub fn with_children(mut self, policy: ChildPolicy) -> Self {
        self.children = policy;
        self
    }

    /// Use a custom constructor.
    #[must_use]
    pub fn with_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&ComponentType) -> Result<Box<dyn Component>, String> + Send + Sync + 'static,
    {
        self.factory = Arc::new(factory);
        self
    }

    /// Fully qualified type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a property declaration.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertySpec> {
        self.property_index.get(name).map(|&i| &self.properties[i])
    }

    /// Property declarations in declaration order.
    #[must_use]
    pub fn properties(&self) -> &[PropertySpec] {
        &self.properties
    }

    /// Look up a slot property declaration.
    #[must_use]
    pub fn slot_property(&self, name: &str) -> Option<&PropertySpec> {
        self.slot_index.get(name).map(|&i| &self.slot_properties[i])
    }

    /// Child policy of the type.
    #[must_use]
    pub fn child_policy(&self) -> ChildPolicy {
        self.children
    }

    /// Construct a new instance.
    ///
    /// # Errors
    /// Returns the factory's reason when construction fails.
    pub fn instantiate(&self) -> Result<Box<dyn Component>, String> {
        (self.factory)(self)
    }
}

fn insert_spec(specs: &mut Vec<PropertySpec>, index: &mut HashMap<String, usize>, spec: PropertySpec) {
    match index.get(&spec.name) {
        Some(&i) => specs[i] = spec,
        None => {
            index.insert(spec.name.clone(), specs.len());
            specs.push(spec);
        }
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentType")
            .field("name", &self.name)
            .field("properties", &self.properties)
            .field("slot_properties", &self.slot_properties)
            .field("children", &self.children)
            .finish()
    }
}
