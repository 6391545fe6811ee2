//! JSON Schema generation from Go struct declarations.
//!
//! `genschema-core` turns the record types declared in a Go package into
//! JSON Schema-like fragments, one per struct.
//!
//! # Architecture
//!
//! ```text
//! Source            Syntax              Registry           Output
//! ──────────     ──────────────     ──────────────     ───────────────
//! *.go  ─────> SourceUnit ─────┐
//! *.go  ─────> SourceUnit ─────┼──> Registry ──────> SchemaFragment per struct
//! (input/go.rs) (syntax.rs)    ┘   (registry.rs)     (output/jsonschema.rs)
//! ```
//!
//! All units of a scope are registered before anything is rendered, so a
//! struct may refer to one declared later or in another file.
//!
//! # Example
//!
//! ```
//! use genschema_core::{generate, input::read_go};
//!
//! let unit = read_go(r#"
//! package geometry
//!
//! type Point struct {
//!     X int32 // X coordinate
//!     Y int32 // Y coordinate
//! }
//! "#).unwrap();
//!
//! let fragments = generate(&[unit], Default::default(), Default::default());
//! assert_eq!(fragments[0].name, "Point");
//! assert_eq!(
//!     fragments[0].to_string(),
//!     r#"{"X":{"type":"integer","description":"X coordinate"},"Y":{"type":"integer","description":"Y coordinate"}}"#
//! );
//! ```
//!
//! # Feature Flags
//!
//! - `input-go` (default) - tree-sitter based Go reader

pub mod input;
pub mod ir;
pub mod output;
pub mod registry;
pub mod syntax;
pub mod traits;

pub use ir::{FieldDecl, PrimitiveKind, RecordType, TypeExpr, TypeName};
pub use output::{JsonSchemaRenderer, RenderOptions, SchemaFragment, UnresolvedPolicy};
pub use registry::{BuildOptions, Registry, RegistryBuilder, build_registry};
pub use syntax::{Decl, FieldSyntax, SourceUnit, TypeSyntax};
pub use traits::{ReadError, Reader};

#[cfg(feature = "input-go")]
pub use input::read_go;

/// Register the units of one scope, then render every struct they declare.
pub fn generate<'a>(
    units: impl IntoIterator<Item = &'a SourceUnit>,
    build: BuildOptions,
    render: RenderOptions,
) -> Vec<SchemaFragment> {
    let mut builder = RegistryBuilder::with_options(build);
    for unit in units {
        builder.add_unit(unit);
    }
    let registry = builder.build();
    JsonSchemaRenderer::with_options(&registry, render).render_all()
}
