//! Binding inflated layouts to application controllers.
//!
//! The inflater never wires components to controllers itself. It talks to a
//! [`Binder`] at exactly two points: before inflation it asks for the ids the
//! controller already owns, and after inflation it hands over the finished
//! [`Layout`].

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::config::{InflaterConfig, INLINE_SOURCE};
use crate::error::{BindError, Result};
use crate::inflater::{FsFragmentLoader, Layout, LayoutInflater};
use crate::types::NodeId;

/// Capability interface of a controller binder.
pub trait Binder {
    /// Ids (without prefix) of components the controller already owns.
    ///
    /// The layout must not declare any of them.
    fn reserved_ids(&self) -> HashSet<String> {
        HashSet::new()
    }

    /// Wire the inflated layout to the controller.
    ///
    /// # Errors
    /// Returns a `BindError` when the layout does not fit the controller.
    fn bind(&mut self, layout: &mut Layout) -> std::result::Result<(), BindError>;
}

#[derive(Debug, Clone)]
struct Field {
    expected_type: Option<String>,
    node: Option<NodeId>,
}

/// Binder that resolves a declared set of fields by id.
///
/// Each field names the markup id of a component the controller wants,
/// optionally with the component type it must have. Fields the controller
/// has already assigned are reported as reserved ids instead.
#[derive(Debug, Clone, Default)]
pub struct FieldBinder {
    fields: BTreeMap<String, Field>,
    assigned: HashSet<String>,
}

impl FieldBinder {
    /// Create a binder without fields.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field of any component type.
    #[must_use]
    pub fn with_field(mut self, id: impl Into<String>) -> Self {
        self.fields.insert(
            id.into(),
            Field {
                expected_type: None,
                node: None,
            },
        );
        self
    }

    /// Declare a field that must be of the given component type (e.g. `ui.Button`).
    #[must_use]
    pub fn with_typed_field(mut self, id: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.fields.insert(
            id.into(),
            Field {
                expected_type: Some(type_name.into()),
                node: None,
            },
        );
        self
    }

    /// Declare a field the controller has already assigned.
    #[must_use]
    pub fn with_assigned(mut self, id: impl Into<String>) -> Self {
        self.assigned.insert(id.into());
        self
    }

    /// Node bound to a field after [`bind`](Binder::bind).
    #[must_use]
    pub fn node(&self, id: &str) -> Option<NodeId> {
        self.fields.get(id).and_then(|field| field.node)
    }

    /// Number of bound fields.
    #[must_use]
    pub fn bound_count(&self) -> usize {
        self.fields.values().filter(|field| field.node.is_some()).count()
    }
}

impl Binder for FieldBinder {
    fn reserved_ids(&self) -> HashSet<String> {
        self.assigned.clone()
    }

    fn bind(&mut self, layout: &mut Layout) -> std::result::Result<(), BindError> {
        for (id, field) in &mut self.fields {
            let node = layout
                .node(id)
                .ok_or_else(|| BindError::MissingComponent(id.clone()))?;

            let actual = node.component_type().name();
            if let Some(expected) = &field.expected_type {
                if expected != actual {
                    return Err(BindError::TypeMismatch {
                        id: id.clone(),
                        expected: expected.clone(),
                        actual: actual.to_string(),
                    });
                }
            }

            field.node = layout.ids().lookup(id);
            tracing::debug!(id = %id, component = actual, "Bound field");
        }
        Ok(())
    }
}

/// Entry point that inflates a layout and binds it in one call.
#[derive(Debug, Default)]
pub struct LayoutBuilder {
    inflater: LayoutInflater,
}

impl LayoutBuilder {
    /// Create a builder around a configured inflater.
    #[must_use]
    pub fn new(inflater: LayoutInflater) -> Self {
        Self { inflater }
    }

    /// Create a builder from a config file's settings.
    ///
    /// Fragments are loaded from the configured fragment root, or from
    /// `document_dir` when the config names none.
    ///
    /// # Errors
    /// Returns `InvalidIdPrefix` if the configured prefix is not valid.
    pub fn from_config(config: &InflaterConfig, document_dir: &Path) -> Result<Self> {
        let fragment_root = config
            .fragment_root
            .clone()
            .unwrap_or_else(|| document_dir.to_path_buf());

        let inflater = LayoutInflater::new()
            .with_id_prefix(config.id_prefix.clone().unwrap_or_default())?
            .with_fragment_loader(FsFragmentLoader::new(fragment_root))
            .with_max_include_depth(config.max_include_depth);

        Ok(Self::new(inflater))
    }

    /// The underlying inflater.
    #[must_use]
    pub fn inflater(&self) -> &LayoutInflater {
        &self.inflater
    }

    /// Inflate markup and bind the result.
    ///
    /// # Errors
    /// Returns `Inflate` if inflation fails and `Bind` if the binder rejects
    /// the layout.
    pub fn create_from<B: Binder + ?Sized>(&self, xml: &str, binder: &mut B) -> Result<Layout> {
        self.create_from_source(INLINE_SOURCE, xml, binder)
    }

    /// Inflate named markup and bind the result.
    ///
    /// # Errors
    /// Returns `Inflate` if inflation fails and `Bind` if the binder rejects
    /// the layout.
    pub fn create_from_source<B: Binder + ?Sized>(
        &self,
        source: &str,
        xml: &str,
        binder: &mut B,
    ) -> Result<Layout> {
        let reserved = binder.reserved_ids();
        let mut layout = self.inflater.inflate_source(source, xml, &reserved)?;
        binder.bind(&mut layout)?;
        Ok(layout)
    }

    /// Read a layout file, inflate it and bind the result.
    ///
    /// # Errors
    /// Returns `Io` if the file cannot be read, otherwise as
    /// [`create_from`](Self::create_from).
    pub fn create_from_file<B: Binder + ?Sized>(&self, path: &Path, binder: &mut B) -> Result<Layout> {
        let xml = std::fs::read_to_string(path)?;
        let source = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());
        self.create_from_source(&source, &xml, binder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{InflateErrorKind, LayoutError};

    const FORM: &str = r#"<VerticalLayout>
    <TextField id="name"/>
    <Button id="ok" caption="OK"/>
</VerticalLayout>"#;

    #[test]
    fn test_bind_fields() {
        let builder = LayoutBuilder::default();
        let mut binder = FieldBinder::new()
            .with_typed_field("name", "ui.TextField")
            .with_field("ok");

        let layout = builder.create_from(FORM, &mut binder).unwrap();

        assert_eq!(binder.bound_count(), 2);
        assert_eq!(binder.node("ok"), layout.ids().lookup("ok"));
    }

    #[test]
    fn test_bind_with_prefix_uses_markup_ids() {
        let inflater = LayoutInflater::new().with_id_prefix("form-").unwrap();
        let mut binder = FieldBinder::new().with_field("ok");

        let layout = LayoutBuilder::new(inflater)
            .create_from(FORM, &mut binder)
            .unwrap();

        assert!(layout.ids().contains("form-ok"));
        assert!(binder.node("ok").is_some());
    }

    #[test]
    fn test_missing_component_is_bind_error() {
        let mut binder = FieldBinder::new().with_field("cancel");
        let err = LayoutBuilder::default()
            .create_from(FORM, &mut binder)
            .unwrap_err();

        assert!(matches!(err, LayoutError::Bind(BindError::MissingComponent(ref id)) if id == "cancel"));
    }

    #[test]
    fn test_type_mismatch() {
        let mut binder = FieldBinder::new().with_typed_field("ok", "ui.Label");
        let err = LayoutBuilder::default()
            .create_from(FORM, &mut binder)
            .unwrap_err();

        match err {
            LayoutError::Bind(BindError::TypeMismatch { expected, actual, .. }) => {
                assert_eq!(expected, "ui.Label");
                assert_eq!(actual, "ui.Button");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_assigned_fields_are_reserved() {
        let mut binder = FieldBinder::new().with_assigned("ok");
        let err = LayoutBuilder::default()
            .create_from(FORM, &mut binder)
            .unwrap_err();

        match err {
            LayoutError::Inflate(err) => {
                assert!(matches!(err.kind(), InflateErrorKind::DuplicateId { .. }));
                assert_eq!(err.location().line, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_create_from_file_with_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("main.xml"),
            r#"<VerticalLayout xmlns:in="urn:inflater"><in:include src="buttons.xml"/></VerticalLayout>"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("buttons.xml"), r#"<Button id="ok"/>"#).unwrap();

        let config = InflaterConfig {
            id_prefix: Some("main-".to_string()),
            ..InflaterConfig::default()
        };
        let builder = LayoutBuilder::from_config(&config, dir.path()).unwrap();
        let mut binder = FieldBinder::new().with_typed_field("ok", "ui.Button");

        let layout = builder
            .create_from_file(&dir.path().join("main.xml"), &mut binder)
            .unwrap();
        assert!(layout.ids().contains("main-ok"));
        assert_eq!(layout.node("ok").unwrap().location().source, "buttons.xml");
    }

    #[test]
    fn test_create_from_missing_file() {
        let err = LayoutBuilder::default()
            .create_from_file(Path::new("/nonexistent/layout.xml"), &mut FieldBinder::new())
            .unwrap_err();
        assert!(matches!(err, LayoutError::Io(_)));
    }
}
