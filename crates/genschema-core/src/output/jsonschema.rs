//! JSON Schema fragment renderer.
//!
//! A record renders as an object keyed by field name, in declaration order:
//!
//! ```text
//! { "X": { "type": "integer", "description": "X coordinate" }, ... }
//! ```
//!
//! References to other records expand inline under `properties`, arrays put
//! their element schema under `items`, and pointers are transparent.
//! Rendering never fails: unknown types become the `"??"` marker and
//! unresolved references follow [`UnresolvedPolicy`].

use crate::ir::{RecordType, TypeExpr, TypeName, UNKNOWN_TYPE};
use crate::registry::Registry;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// What to emit for a field whose type names an unregistered record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPolicy {
    /// Leave out the `type` entry; the field keeps its description.
    #[default]
    Omit,
    /// Emit the `"??"` marker, like an unknown primitive.
    Placeholder,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub unresolved: UnresolvedPolicy,
}

/// The rendered schema of one top-level record type.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaFragment {
    pub name: TypeName,
    pub schema: Value,
}

impl SchemaFragment {
    /// Indented JSON text.
    pub fn to_pretty(&self) -> String {
        format!("{:#}", self.schema)
    }
}

/// Compact JSON.
impl fmt::Display for SchemaFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.schema, f)
    }
}

/// Renders record types from a registry.
#[derive(Debug, Clone, Copy)]
pub struct JsonSchemaRenderer<'r> {
    registry: &'r Registry,
    options: RenderOptions,
}

impl<'r> JsonSchemaRenderer<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self::with_options(registry, RenderOptions::default())
    }

    pub fn with_options(registry: &'r Registry, options: RenderOptions) -> Self {
        Self { registry, options }
    }

    /// Render the registered type `name`, or `None` if it isn't registered.
    pub fn render(&self, name: &str) -> Option<SchemaFragment> {
        let (name, record) = self.registry.get_key_value(name)?;
        let mut path = vec![name.as_str()];
        let properties = self.record_properties(record, &mut path);
        Some(SchemaFragment {
            name: name.clone(),
            schema: Value::Object(properties),
        })
    }

    /// Render every registered type, in declaration order.
    ///
    /// Types are rendered in parallel; the registry is only read.
    pub fn render_all(&self) -> Vec<SchemaFragment> {
        let names: Vec<&str> = self.registry.names().collect();
        names
            .par_iter()
            .filter_map(|name| self.render(name))
            .collect()
    }

    /// Render a record that need not be registered itself.
    pub fn render_record(&self, record: &RecordType) -> Value {
        let mut path = Vec::new();
        Value::Object(self.record_properties(record, &mut path))
    }

    /// Render a single type expression.
    pub fn render_type(&self, expr: &TypeExpr) -> Value {
        let mut path = Vec::new();
        Value::Object(self.type_entries(expr, &mut path))
    }

    /// `path` holds the records being expanded, outermost first.
    fn record_properties(&self, record: &RecordType, path: &mut Vec<&'r str>) -> Map<String, Value> {
        let mut properties = Map::new();
        for field in &record.fields {
            let mut entry = self.type_entries(&field.type_expr, path);
            entry.insert(
                "description".into(),
                Value::String(field.description.clone()),
            );
            properties.insert(field.name.clone(), Value::Object(entry));
        }
        properties
    }

    fn type_entries(&self, expr: &TypeExpr, path: &mut Vec<&'r str>) -> Map<String, Value> {
        let mut entries = Map::new();

        match expr {
            TypeExpr::Primitive(kind) => {
                entries.insert("type".into(), kind.schema_type().into());
            }

            TypeExpr::Reference(name) => match self.registry.get_key_value(name) {
                Some((name, record)) => {
                    entries.insert("type".into(), "object".into());
                    if path.contains(&name.as_str()) {
                        // Self-referential; stop after one expansion.
                        tracing::debug!(%name, "recursive reference left unexpanded");
                    } else {
                        path.push(name.as_str());
                        let properties = self.record_properties(record, path);
                        path.pop();
                        entries.insert("properties".into(), Value::Object(properties));
                    }
                }
                None => {
                    tracing::warn!(%name, "unresolved type reference");
                    if self.options.unresolved == UnresolvedPolicy::Placeholder {
                        entries.insert("type".into(), UNKNOWN_TYPE.into());
                    }
                }
            },

            TypeExpr::Array(element) => {
                entries.insert("type".into(), "array".into());
                let items = self.type_entries(element, path);
                entries.insert("items".into(), Value::Object(items));
            }

            TypeExpr::Indirection(inner) => return self.type_entries(inner, path),
        }

        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{FieldDecl, PrimitiveKind};

    fn int() -> TypeExpr {
        TypeExpr::Primitive(PrimitiveKind::Integer)
    }

    fn point() -> RecordType {
        RecordType::new(vec![
            FieldDecl::new("X", int()).with_description("X coordinate"),
            FieldDecl::new("Y", int()).with_description("Y coordinate"),
        ])
    }

    fn geometry() -> Registry {
        let mut registry = Registry::default();
        registry.insert("Point", point());
        registry.insert(
            "Line",
            RecordType::new(vec![
                FieldDecl::new("A", TypeExpr::indirection(TypeExpr::reference("Point"))),
                FieldDecl::new("B", TypeExpr::array(TypeExpr::reference("Point"))),
            ]),
        );
        registry
    }

    #[test]
    fn test_point() {
        let registry = geometry();
        let fragment = JsonSchemaRenderer::new(&registry).render("Point").unwrap();
        insta::assert_snapshot!(
            fragment.to_string(),
            @r#"{"X":{"type":"integer","description":"X coordinate"},"Y":{"type":"integer","description":"Y coordinate"}}"#
        );
    }

    #[test]
    fn test_line() {
        let registry = geometry();
        let fragment = JsonSchemaRenderer::new(&registry).render("Line").unwrap();
        let point = r#"{"X":{"type":"integer","description":"X coordinate"},"Y":{"type":"integer","description":"Y coordinate"}}"#;
        let expected = format!(
            r#"{{"A":{{"type":"object","properties":{point},"description":""}},"B":{{"type":"array","items":{{"type":"object","properties":{point}}},"description":""}}}}"#
        );
        assert_eq!(fragment.to_string(), expected);
    }

    #[test]
    fn test_primitive_fields_have_no_properties() {
        let registry = Registry::default();
        let record = RecordType::new(vec![
            FieldDecl::new("N", int()),
            FieldDecl::new("S", TypeExpr::Primitive(PrimitiveKind::String)),
            FieldDecl::new("B", TypeExpr::Primitive(PrimitiveKind::Boolean)),
            FieldDecl::new("F", TypeExpr::Primitive(PrimitiveKind::Unknown)),
        ]);
        let schema = JsonSchemaRenderer::new(&registry).render_record(&record);

        let object = schema.as_object().unwrap();
        let keys: Vec<&str> = object.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["N", "S", "B", "F"]);
        assert!(object.values().all(|v| v.get("properties").is_none()));
        assert_eq!(object["F"]["type"], "??");
    }

    #[test]
    fn test_string_array() {
        let registry = Registry::default();
        let expr = TypeExpr::array(TypeExpr::Primitive(PrimitiveKind::String));
        let schema = JsonSchemaRenderer::new(&registry).render_type(&expr);
        assert_eq!(schema.to_string(), r#"{"type":"array","items":{"type":"string"}}"#);
    }

    #[test]
    fn test_indirection_is_transparent() {
        let registry = geometry();
        let renderer = JsonSchemaRenderer::new(&registry);
        let bare = renderer.render_type(&TypeExpr::reference("Point"));
        let pointer = renderer.render_type(&TypeExpr::indirection(TypeExpr::reference("Point")));
        assert_eq!(bare.to_string(), pointer.to_string());
    }

    #[test]
    fn test_unresolved_reference() {
        let registry = Registry::default();
        let record = RecordType::new(vec![
            FieldDecl::new("Before", int()),
            FieldDecl::new("Missing", TypeExpr::reference("Nowhere")).with_description("gone"),
            FieldDecl::new("After", int()),
        ]);

        let omitted = JsonSchemaRenderer::new(&registry).render_record(&record);
        assert_eq!(
            omitted.to_string(),
            r#"{"Before":{"type":"integer","description":""},"Missing":{"description":"gone"},"After":{"type":"integer","description":""}}"#
        );

        let options = RenderOptions {
            unresolved: UnresolvedPolicy::Placeholder,
        };
        let marked = JsonSchemaRenderer::with_options(&registry, options).render_record(&record);
        assert_eq!(marked["Missing"]["type"], "??");
        assert_eq!(marked["After"]["type"], "integer");
    }

    #[test]
    fn test_recursive_reference_terminates() {
        let mut registry = Registry::default();
        registry.insert(
            "Node",
            RecordType::new(vec![
                FieldDecl::new("Value", int()),
                FieldDecl::new("Next", TypeExpr::indirection(TypeExpr::reference("Node"))),
            ]),
        );
        let fragment = JsonSchemaRenderer::new(&registry).render("Node").unwrap();
        assert_eq!(
            fragment.to_string(),
            r#"{"Value":{"type":"integer","description":""},"Next":{"type":"object","description":""}}"#
        );
    }

    #[test]
    fn test_render_all_is_ordered_and_idempotent() {
        let registry = geometry();
        let renderer = JsonSchemaRenderer::new(&registry);
        let first = renderer.render_all();
        let second = renderer.render_all();

        let names: Vec<&str> = first.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Point", "Line"]);
        let text = |fragments: &[SchemaFragment]| {
            fragments.iter().map(|f| f.to_pretty()).collect::<Vec<_>>()
        };
        assert_eq!(text(&first), text(&second));
    }

    #[test]
    fn test_unknown_name() {
        let registry = geometry();
        assert!(JsonSchemaRenderer::new(&registry).render("Circle").is_none());
    }
}
