//! Built-in component library.
//!
//! Declares the `ui` package: layouts, containers and basic fields with
//! their property tables. The components are generic [`Widget`]s; a host
//! toolkit replaces them by registering its own types or factories.
//!
//! [`Widget`]: super::Widget

use std::sync::LazyLock;

use super::component::{ChildPolicy, ComponentType, PropertySpec};
use super::core::ComponentRegistry;
use crate::types::{EnumSpec, Value, ValueKind};

static DEFAULT_LIBRARY: LazyLock<ComponentRegistry> = LazyLock::new(create_default_library);

/// Shared, immutable built-in library.
#[must_use]
pub fn default_library() -> &'static ComponentRegistry {
    &DEFAULT_LIBRARY
}

/// Properties every component has.
fn common_properties() -> Vec<PropertySpec> {
    vec![
        PropertySpec::new("caption", ValueKind::Text),
        PropertySpec::new("description", ValueKind::Text),
        PropertySpec::new("styleName", ValueKind::Text),
        PropertySpec::new("width", ValueKind::Size),
        PropertySpec::new("height", ValueKind::Size),
        PropertySpec::new("visible", ValueKind::Bool).with_default(Value::Bool(true)),
        PropertySpec::new("enabled", ValueKind::Bool).with_default(Value::Bool(true)),
    ]
}

fn component(name: &str) -> ComponentType {
    ComponentType::new(format!("ui.{name}")).with_properties(common_properties())
}

fn ordered_layout(name: &str) -> ComponentType {
    component(name)
        .with_children(ChildPolicy::Many)
        .with_property(PropertySpec::new("spacing", ValueKind::Bool))
        .with_property(PropertySpec::new("margin", ValueKind::Bool))
        .with_slot_property(PropertySpec::new("expandRatio", ValueKind::Float))
        .with_slot_property(PropertySpec::new("alignment", ValueKind::Alignment))
}

fn enumeration(name: &str, variants: &[&str]) -> ValueKind {
    ValueKind::Enum(EnumSpec::new(name, variants.iter().copied()))
}

/// Create the built-in `ui` library.
#[must_use]
pub fn create_default_library() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();

    // Ordered layouts
    registry.register_type(ordered_layout("VerticalLayout"));
    registry.register_type(ordered_layout("HorizontalLayout"));
    registry.register_type(ordered_layout("FormLayout"));

    // Positional layouts
    registry.register_type(
        component("GridLayout")
            .with_children(ChildPolicy::Many)
            .with_property(PropertySpec::new("columns", ValueKind::Integer).with_default(Value::Integer(1)))
            .with_property(PropertySpec::new("rows", ValueKind::Integer).with_default(Value::Integer(1)))
            .with_property(PropertySpec::new("spacing", ValueKind::Bool))
            .with_slot_property(PropertySpec::new("column", ValueKind::Integer))
            .with_slot_property(PropertySpec::new("row", ValueKind::Integer))
            .with_slot_property(PropertySpec::new("alignment", ValueKind::Alignment)),
    );
    registry.register_type(
        component("AbsoluteLayout")
            .with_children(ChildPolicy::Many)
            .with_slot_property(PropertySpec::new("top", ValueKind::Size))
            .with_slot_property(PropertySpec::new("right", ValueKind::Size))
            .with_slot_property(PropertySpec::new("bottom", ValueKind::Size))
            .with_slot_property(PropertySpec::new("left", ValueKind::Size))
            .with_slot_property(PropertySpec::new("zIndex", ValueKind::Integer)),
    );
    registry.register_type(component("CssLayout").with_children(ChildPolicy::Many));

    // Single component containers
    registry.register_type(
        component("Panel")
            .with_children(ChildPolicy::Single)
            .with_property(PropertySpec::new("scrollLeft", ValueKind::Integer))
            .with_property(PropertySpec::new("scrollTop", ValueKind::Integer)),
    );
    registry.register_type(
        component("Window")
            .with_children(ChildPolicy::Single)
            .with_property(PropertySpec::new("modal", ValueKind::Bool))
            .with_property(PropertySpec::new("resizable", ValueKind::Bool))
            .with_property(PropertySpec::new("closable", ValueKind::Bool)),
    );
    registry.register_type(
        component("TabSheet")
            .with_children(ChildPolicy::Many)
            .with_property(PropertySpec::new("selected", ValueKind::ComponentRef))
            .with_slot_property(PropertySpec::new("tabCaption", ValueKind::Text))
            .with_slot_property(PropertySpec::new("closable", ValueKind::Bool)),
    );

    // Fields and widgets
    registry.register_type(
        component("Button")
            .with_property(PropertySpec::new(
                "style",
                enumeration(
                    "ButtonStyle",
                    &["primary", "friendly", "danger", "borderless", "link", "small", "large"],
                ),
            ))
            .with_property(PropertySpec::new("disableOnClick", ValueKind::Bool))
            .with_property(PropertySpec::new("tabIndex", ValueKind::Integer)),
    );
    registry.register_type(
        component("Label")
            .with_property(PropertySpec::new("value", ValueKind::Text))
            .with_property(PropertySpec::new(
                "contentMode",
                enumeration("ContentMode", &["text", "preformatted", "html"]),
            ))
            .with_property(PropertySpec::new("for", ValueKind::ComponentRef)),
    );
    registry.register_type(
        component("TextField")
            .with_property(PropertySpec::new("value", ValueKind::Text))
            .with_property(PropertySpec::new("inputPrompt", ValueKind::Text))
            .with_property(PropertySpec::new("maxLength", ValueKind::Integer))
            .with_property(PropertySpec::new("required", ValueKind::Bool))
            .with_property(PropertySpec::new("readOnly", ValueKind::Bool)),
    );
    registry.register_type(
        component("TextArea")
            .with_property(PropertySpec::new("value", ValueKind::Text))
            .with_property(PropertySpec::new("rows", ValueKind::Integer))
            .with_property(PropertySpec::new("wordwrap", ValueKind::Bool))
            .with_property(PropertySpec::new("readOnly", ValueKind::Bool)),
    );
    registry.register_type(
        component("CheckBox").with_property(PropertySpec::new("value", ValueKind::Bool)),
    );
    registry.register_type(
        component("Slider")
            .with_property(PropertySpec::new("min", ValueKind::Float))
            .with_property(PropertySpec::new("max", ValueKind::Float))
            .with_property(PropertySpec::new("resolution", ValueKind::Integer))
            .with_property(PropertySpec::new(
                "orientation",
                enumeration("Orientation", &["horizontal", "vertical"]),
            )),
    );
    registry.register_type(
        component("DateField").with_property(PropertySpec::new(
            "resolution",
            enumeration("Resolution", &["second", "minute", "hour", "day", "month", "year"]),
        )),
    );
    registry.register_type(
        component("ColorPicker").with_property(PropertySpec::new("color", ValueKind::Color)),
    );
    registry.register_type(
        component("Image")
            .with_property(PropertySpec::new("source", ValueKind::Text))
            .with_property(PropertySpec::new("alternateText", ValueKind::Text)),
    );
    registry.register_type(
        component("Link")
            .with_property(PropertySpec::new("resource", ValueKind::Text))
            .with_property(PropertySpec::new("targetName", ValueKind::Text)),
    );

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ChildPolicy;
    use crate::types::{Location, QualifiedName};

    #[test]
    fn test_create_default_library() {
        let registry = create_default_library();

        // Layouts
        assert!(registry.has_type("ui.VerticalLayout"));
        assert!(registry.has_type("ui.GridLayout"));

        // Containers
        assert!(registry.has_type("ui.Panel"));
        assert!(registry.has_type("ui.TabSheet"));

        // Fields
        assert!(registry.has_type("ui.Button"));
        assert!(registry.has_type("ui.TextField"));
        assert!(!registry.has_type("ui.Bogus"));
    }

    #[test]
    fn test_child_policies() {
        let registry = default_library();
        let location = Location::new("test.xml", 1, 1);
        let policy = |name: &str| {
            registry
                .resolve(&QualifiedName::local(name), &location)
                .unwrap()
                .child_policy()
        };

        assert_eq!(policy("VerticalLayout"), ChildPolicy::Many);
        assert_eq!(policy("Panel"), ChildPolicy::Single);
        assert_eq!(policy("Button"), ChildPolicy::Leaf);
    }

    #[test]
    fn test_common_properties_everywhere() {
        let registry = create_default_library();
        let location = Location::new("test.xml", 1, 1);

        for name in ["Button", "Label", "VerticalLayout", "Window"] {
            let ty = registry.resolve(&QualifiedName::local(name), &location).unwrap();
            assert!(ty.property("caption").is_some(), "{name} should have caption");
            assert!(ty.property("width").is_some(), "{name} should have width");
            assert_eq!(
                ty.property("visible").and_then(|p| p.default.clone()),
                Some(Value::Bool(true))
            );
        }
    }

    #[test]
    fn test_reference_properties() {
        let registry = create_default_library();
        let location = Location::new("test.xml", 1, 1);
        let label = registry.resolve(&QualifiedName::local("Label"), &location).unwrap();

        assert_eq!(label.property("for").unwrap().kind, ValueKind::ComponentRef);
    }
}
