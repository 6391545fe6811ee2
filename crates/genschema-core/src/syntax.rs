//! Parsed source declarations.
//!
//! This is what a [`Reader`](crate::traits::Reader) hands to the registry
//! builder: top-level type declarations with their fields still in raw,
//! syntactic form. Nothing here is resolved or interpreted yet.

use serde::Serialize;

/// One parsed compilation unit (a single source file).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceUnit {
    /// Package clause, if the file has one.
    pub package: Option<String>,
    /// Top-level type declarations, in source order.
    pub decls: Vec<Decl>,
}

impl SourceUnit {
    /// Names of the struct declarations in this unit, in source order.
    pub fn record_names(&self) -> impl Iterator<Item = &str> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Record { name, .. } => Some(name.as_str()),
            Decl::Other { .. } => None,
        })
    }
}

/// A top-level type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decl", rename_all = "snake_case")]
pub enum Decl {
    /// `type Name struct { ... }`
    Record {
        name: String,
        fields: Vec<FieldSyntax>,
    },
    /// Any other type declaration (alias, interface, defined type over a
    /// non-struct type). `kind` is the syntax kind of the right-hand side.
    Other { name: String, kind: String },
}

/// One field line of a struct body, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSyntax {
    /// Declared names. Empty for an embedded field.
    pub names: Vec<String>,
    pub ty: TypeSyntax,
    /// Struct tag with its quotes removed.
    pub tag: Option<String>,
    /// Raw comment lines immediately above the field, delimiters included.
    pub doc: Vec<String>,
    /// Raw comments trailing the field on its last line.
    pub comment: Vec<String>,
}

impl FieldSyntax {
    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }
}

/// Type syntax as written in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "syntax", content = "of", rename_all = "snake_case")]
pub enum TypeSyntax {
    /// A bare identifier: `int32`, `Point`.
    Named(String),
    /// `pkg.Name`
    Qualified { package: String, name: String },
    /// `*T`
    Pointer(Box<TypeSyntax>),
    /// `[]T`
    Slice(Box<TypeSyntax>),
    /// `[N]T`; the length is dropped.
    Array(Box<TypeSyntax>),
    /// `map[K]V`
    Map {
        key: Box<TypeSyntax>,
        value: Box<TypeSyntax>,
    },
    /// An inline `struct { ... }`.
    Struct,
    /// `Name[Args]`; only the base type is kept.
    Generic(Box<TypeSyntax>),
    /// Anything else (channels, functions, interfaces), by syntax kind.
    Other(String),
}

impl TypeSyntax {
    /// Identifier an embedded field of this type is known by.
    ///
    /// Go names an embedded field after its type, ignoring any pointer,
    /// package qualifier or type arguments.
    pub fn embedded_name(&self) -> Option<&str> {
        match self {
            TypeSyntax::Named(name) => Some(name),
            TypeSyntax::Qualified { name, .. } => Some(name),
            TypeSyntax::Pointer(inner) | TypeSyntax::Generic(inner) => inner.embedded_name(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_name() {
        let ptr = TypeSyntax::Pointer(Box::new(TypeSyntax::Qualified {
            package: "sync".into(),
            name: "Mutex".into(),
        }));
        assert_eq!(ptr.embedded_name(), Some("Mutex"));

        let generic = TypeSyntax::Generic(Box::new(TypeSyntax::Named("List".into())));
        assert_eq!(generic.embedded_name(), Some("List"));

        let slice = TypeSyntax::Slice(Box::new(TypeSyntax::Named("Point".into())));
        assert_eq!(slice.embedded_name(), None);
    }
}
