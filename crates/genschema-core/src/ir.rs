//! Resolved type model.
//!
//! The registry builder translates [`TypeSyntax`](crate::syntax::TypeSyntax)
//! into these types; the renderer only ever sees this model.

use serde::Serialize;

/// Name of a declared record type, unique within a scope.
pub type TypeName = String;

/// Primitive kinds the schema knows how to describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Integer,
    String,
    Boolean,
    /// A predeclared or otherwise opaque type with no schema mapping.
    Unknown,
}

impl PrimitiveKind {
    /// Classify a Go predeclared type name.
    ///
    /// Returns `None` for identifiers that are not predeclared, which makes
    /// them candidates for a record reference.
    pub fn from_go(name: &str) -> Option<Self> {
        match name {
            "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16"
            | "uint32" | "uint64" | "uintptr" | "byte" | "rune" => Some(Self::Integer),
            "string" => Some(Self::String),
            "bool" => Some(Self::Boolean),
            "float32" | "float64" | "complex64" | "complex128" | "error" | "any" => {
                Some(Self::Unknown)
            }
            _ => None,
        }
    }

    /// The JSON Schema `type` keyword for this kind.
    pub fn schema_type(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Unknown => UNKNOWN_TYPE,
        }
    }
}

/// Marker emitted where a type has no schema mapping.
pub const UNKNOWN_TYPE: &str = "??";

/// A field's type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "expr", content = "of", rename_all = "snake_case")]
pub enum TypeExpr {
    Primitive(PrimitiveKind),
    /// Another record type, looked up when rendering.
    Reference(TypeName),
    Array(Box<TypeExpr>),
    /// Pointer-like wrapper; has no effect on the schema.
    Indirection(Box<TypeExpr>),
}

impl TypeExpr {
    pub fn reference(name: impl Into<TypeName>) -> Self {
        Self::Reference(name.into())
    }

    pub fn array(element: TypeExpr) -> Self {
        Self::Array(Box::new(element))
    }

    pub fn indirection(inner: TypeExpr) -> Self {
        Self::Indirection(Box::new(inner))
    }
}

/// One field of a record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDecl {
    pub name: String,
    pub type_expr: TypeExpr,
    /// Empty when the field has no comment.
    pub description: String,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, type_expr: TypeExpr) -> Self {
        Self {
            name: name.into(),
            type_expr,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A record (struct) type: its fields in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordType {
    pub fields: Vec<FieldDecl>,
}

impl RecordType {
    pub fn new(fields: Vec<FieldDecl>) -> Self {
        Self { fields }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_go_primitives() {
        assert_eq!(PrimitiveKind::from_go("int32"), Some(PrimitiveKind::Integer));
        assert_eq!(PrimitiveKind::from_go("uint8"), Some(PrimitiveKind::Integer));
        assert_eq!(PrimitiveKind::from_go("string"), Some(PrimitiveKind::String));
        assert_eq!(PrimitiveKind::from_go("bool"), Some(PrimitiveKind::Boolean));
        assert_eq!(PrimitiveKind::from_go("float64"), Some(PrimitiveKind::Unknown));
        assert_eq!(PrimitiveKind::from_go("Point"), None);
    }

    #[test]
    fn test_schema_type() {
        assert_eq!(PrimitiveKind::Integer.schema_type(), "integer");
        assert_eq!(PrimitiveKind::Unknown.schema_type(), "??");
    }
}
