//! Output rendering.
//!
//! Renderers take a [`Registry`](crate::registry::Registry) and produce one
//! schema fragment per record type.

pub mod jsonschema;

pub use jsonschema::{JsonSchemaRenderer, RenderOptions, SchemaFragment, UnresolvedPolicy};
