//! Registry of record types declared in one scope.
//!
//! The builder collects every struct declaration first so that the renderer
//! can resolve references regardless of declaration order. A registry is a
//! plain value: build a fresh one per scope and share it read-only.

use crate::ir::{FieldDecl, PrimitiveKind, RecordType, TypeExpr, TypeName};
use crate::syntax::{Decl, FieldSyntax, SourceUnit, TypeSyntax};
use std::collections::HashMap;

/// Options that affect how declarations become record types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Use `json:"..."` struct tags to rename or drop fields.
    pub json_tags: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { json_tags: true }
    }
}

/// Mapping from type name to record definition.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    types: HashMap<TypeName, RecordType>,
    /// First-declaration order, for deterministic iteration.
    order: Vec<TypeName>,
}

impl Registry {
    /// Look up a record type.
    pub fn get(&self, name: &str) -> Option<&RecordType> {
        self.types.get(name)
    }

    /// Look up a record type, returning the registry's own copy of the name.
    pub fn get_key_value(&self, name: &str) -> Option<(&TypeName, &RecordType)> {
        self.types.get_key_value(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Registered type names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Insert a record. A later declaration of the same name replaces the
    /// earlier one but keeps its position.
    pub fn insert(&mut self, name: impl Into<TypeName>, record: RecordType) {
        let name = name.into();
        if self.types.insert(name.clone(), record).is_some() {
            tracing::debug!(%name, "duplicate type declaration, last one wins");
        } else {
            self.order.push(name);
        }
    }
}

/// Collects record declarations from parsed source units.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    options: BuildOptions,
    registry: Registry,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: BuildOptions) -> Self {
        Self {
            options,
            registry: Registry::default(),
        }
    }

    /// Register every struct declared in a unit. Other declarations are ignored.
    pub fn add_unit(&mut self, unit: &SourceUnit) -> &mut Self {
        for decl in &unit.decls {
            match decl {
                Decl::Record { name, fields } => {
                    let record = self.record_type(fields);
                    self.registry.insert(name.clone(), record);
                }
                Decl::Other { name, kind } => {
                    tracing::trace!(%name, %kind, "skipping non-struct declaration");
                }
            }
        }
        self
    }

    pub fn build(self) -> Registry {
        self.registry
    }

    /// Translate a struct body into a record type.
    pub fn record_type(&self, fields: &[FieldSyntax]) -> RecordType {
        let mut decls = Vec::with_capacity(fields.len());

        for field in fields {
            let type_expr = translate(&field.ty);
            let description = describe(field);

            let json_tag = if self.options.json_tags {
                field.tag.as_deref().and_then(|tag| lookup_tag(tag, "json"))
            } else {
                None
            };
            let json_name = json_tag
                .as_deref()
                .map(|value| value.split(',').next().unwrap_or(""));
            if json_name == Some("-") {
                continue;
            }

            if field.is_embedded() {
                let Some(name) = field.ty.embedded_name() else {
                    tracing::warn!(ty = ?field.ty, "embedded field without a type name, skipping");
                    continue;
                };
                let name = json_name.filter(|n| !n.is_empty()).unwrap_or(name);
                decls.push(FieldDecl::new(name, type_expr).with_description(description));
                continue;
            }

            // A tag names one field; it can't rename a multi-name declaration.
            let renamed = json_name
                .filter(|n| !n.is_empty())
                .filter(|_| field.names.len() == 1);

            for name in &field.names {
                let name = renamed.unwrap_or(name.as_str());
                decls.push(
                    FieldDecl::new(name, type_expr.clone()).with_description(description.clone()),
                );
            }
        }

        RecordType::new(decls)
    }
}

/// Build a registry from the units of one scope with default options.
pub fn build_registry<'a>(units: impl IntoIterator<Item = &'a SourceUnit>) -> Registry {
    let mut builder = RegistryBuilder::new();
    for unit in units {
        builder.add_unit(unit);
    }
    builder.build()
}

/// Translate Go type syntax into a type expression.
pub fn translate(ty: &TypeSyntax) -> TypeExpr {
    match ty {
        TypeSyntax::Named(name) => match PrimitiveKind::from_go(name) {
            Some(kind) => TypeExpr::Primitive(kind),
            None => TypeExpr::Reference(name.clone()),
        },
        TypeSyntax::Pointer(inner) => TypeExpr::indirection(translate(inner)),
        TypeSyntax::Slice(elem) | TypeSyntax::Array(elem) => TypeExpr::array(translate(elem)),
        TypeSyntax::Qualified { .. }
        | TypeSyntax::Map { .. }
        | TypeSyntax::Struct
        | TypeSyntax::Generic(_)
        | TypeSyntax::Other(_) => TypeExpr::Primitive(PrimitiveKind::Unknown),
    }
}

/// Description text for a field: the doc comment if present, else the
/// trailing comment.
fn describe(field: &FieldSyntax) -> String {
    let lines = if field.doc.is_empty() {
        &field.comment
    } else {
        &field.doc
    };
    lines
        .iter()
        .map(|line| comment_text(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Strip comment delimiters and the single space gofmt puts after them.
/// Any further indentation is part of the text.
fn comment_text(raw: &str) -> &str {
    if let Some(line) = raw.strip_prefix("//") {
        return line.strip_prefix(' ').unwrap_or(line);
    }
    let block = raw
        .strip_prefix("/*")
        .and_then(|block| block.strip_suffix("*/"))
        .unwrap_or(raw);
    let block = block.strip_prefix(' ').unwrap_or(block);
    block.strip_suffix(' ').unwrap_or(block)
}

/// Look up `key` in a Go struct tag (`key:"value" other:"value"`).
pub fn lookup_tag(tag: &str, key: &str) -> Option<String> {
    let mut rest = tag;
    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            return None;
        }

        let name_len = rest
            .find(|c: char| c <= ' ' || c == ':' || c == '"' || c == '\u{7f}')
            .unwrap_or(rest.len());
        let after = &rest[name_len..];
        if name_len == 0 || !after.starts_with(":\"") {
            return None;
        }
        let name = &rest[..name_len];

        // Quoted value with backslash escapes.
        let quoted = &after[1..];
        let mut value = String::new();
        let mut end = None;
        let mut chars = quoted.char_indices().skip(1);
        while let Some((i, c)) = chars.next() {
            match c {
                '"' => {
                    end = Some(i);
                    break;
                }
                '\\' => {
                    if let Some((_, escaped)) = chars.next() {
                        value.push(escaped);
                    }
                }
                _ => value.push(c),
            }
        }
        let end = end?;

        if name == key {
            return Some(value);
        }
        rest = &quoted[end + 1..];
    }
}
