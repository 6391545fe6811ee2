//! Tree-sitter based Go reader.
//!
//! Extracts top-level type declarations from Go source. Struct bodies keep
//! their raw field syntax and the comments around each field; deciding what
//! they mean is left to the registry builder.

use crate::syntax::{Decl, FieldSyntax, SourceUnit, TypeSyntax};
use crate::traits::{ReadError, Reader};
use tree_sitter::{Node, Parser, Tree};

/// Static instance of the Go reader.
pub static GO_READER: GoReader = GoReader;

/// Go reader using tree-sitter.
pub struct GoReader;

impl Reader for GoReader {
    fn language(&self) -> &'static str {
        "go"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["go"]
    }

    fn read(&self, source: &str) -> Result<SourceUnit, ReadError> {
        read_go(source)
    }
}

/// Parse Go source into its top-level type declarations.
pub fn read_go(source: &str) -> Result<SourceUnit, ReadError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|err| ReadError::Parse(err.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ReadError::Parse("failed to parse Go".into()))?;

    let ctx = ReadContext::new(source);
    ctx.read_unit(&tree)
}

/// Row and byte extent of a field declaration, comments excluded.
#[derive(Debug, Clone, Copy)]
struct FieldSpan {
    start_row: usize,
    start_byte: usize,
    end_row: usize,
    end_byte: usize,
}

impl FieldSpan {
    fn of(node: Node) -> Self {
        let mut cursor = node.walk();
        let content: Vec<Node> = node
            .children(&mut cursor)
            .filter(|child| child.kind() != "comment")
            .collect();
        let first = content.first().copied().unwrap_or(node);
        let last = content.last().copied().unwrap_or(node);
        Self {
            start_row: first.start_position().row,
            start_byte: first.start_byte(),
            end_row: last.end_position().row,
            end_byte: last.end_byte(),
        }
    }
}

/// Field spans of one struct body plus the row of its opening brace.
struct BodyLayout {
    open_row: usize,
    spans: Vec<FieldSpan>,
}

impl BodyLayout {
    /// Whether a comment sits on a line that already holds code before it.
    fn is_trailing(&self, comment: Node) -> bool {
        let row = comment.start_position().row;
        row == self.open_row
            || self
                .spans
                .iter()
                .any(|span| span.end_row == row && span.end_byte <= comment.start_byte())
    }
}

struct ReadContext<'a> {
    source: &'a str,
}

impl<'a> ReadContext<'a> {
    fn new(source: &'a str) -> Self {
        Self { source }
    }

    fn node_text(&self, node: Node) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn read_unit(&self, tree: &Tree) -> Result<SourceUnit, ReadError> {
        let root = tree.root_node();

        if root.has_error() {
            return Err(self.syntax_error(root));
        }

        let mut unit = SourceUnit::default();
        let mut cursor = root.walk();

        for child in root.children(&mut cursor) {
            match child.kind() {
                "package_clause" => {
                    unit.package = find_child(child, "package_identifier")
                        .map(|name| self.node_text(name).to_string());
                }
                "type_declaration" => self.read_type_declaration(child, &mut unit.decls),
                _ => {}
            }
        }

        Ok(unit)
    }

    fn syntax_error(&self, root: Node) -> ReadError {
        let Some(node) = first_error(root) else {
            return ReadError::Syntax {
                line: 1,
                column: 1,
                message: "invalid syntax".into(),
            };
        };

        let position = node.start_position();
        let message = if node.is_missing() {
            format!("missing `{}`", node.kind())
        } else {
            let text = self.node_text(node);
            let snippet: String = text.lines().next().unwrap_or("").chars().take(24).collect();
            format!("unexpected `{}`", snippet.trim())
        };

        ReadError::Syntax {
            line: position.row + 1,
            column: position.column + 1,
            message,
        }
    }

    fn read_type_declaration(&self, node: Node, decls: &mut Vec<Decl>) {
        // Covers both `type X ...` and grouped `type ( ... )` forms.
        let mut cursor = node.walk();
        for spec in node.children(&mut cursor) {
            match spec.kind() {
                "type_spec" => {
                    if let Some(decl) = self.read_type_spec(spec) {
                        decls.push(decl);
                    }
                }
                "type_alias" => {
                    if let Some(name) = spec.child_by_field_name("name") {
                        decls.push(Decl::Other {
                            name: self.node_text(name).to_string(),
                            kind: "type_alias".into(),
                        });
                    }
                }
                _ => {}
            }
        }
    }

    fn read_type_spec(&self, node: Node) -> Option<Decl> {
        let name = self.node_text(node.child_by_field_name("name")?).to_string();
        let ty = node.child_by_field_name("type")?;

        if ty.kind() == "struct_type" {
            Some(Decl::Record {
                name,
                fields: self.read_struct_fields(ty),
            })
        } else {
            Some(Decl::Other {
                name,
                kind: ty.kind().to_string(),
            })
        }
    }

    fn read_struct_fields(&self, struct_type: Node) -> Vec<FieldSyntax> {
        let Some(list) = find_child(struct_type, "field_declaration_list") else {
            return Vec::new();
        };

        let mut comments = Vec::new();
        let mut declarations = Vec::new();
        let mut cursor = list.walk();

        for child in list.children(&mut cursor) {
            match child.kind() {
                "comment" => comments.push(child),
                "field_declaration" => {
                    // Trailing comments can end up nested in the declaration.
                    let mut inner = child.walk();
                    comments.extend(
                        child
                            .children(&mut inner)
                            .filter(|node| node.kind() == "comment"),
                    );
                    declarations.push(child);
                }
                _ => {}
            }
        }
        comments.sort_by_key(|comment| comment.start_byte());

        let layout = BodyLayout {
            open_row: list.start_position().row,
            spans: declarations.iter().map(|decl| FieldSpan::of(*decl)).collect(),
        };

        declarations
            .iter()
            .zip(&layout.spans)
            .filter_map(|(decl, span)| {
                let doc = self.doc_comments(&comments, &layout, span);
                let comment = comments
                    .iter()
                    .filter(|c| c.start_position().row == span.end_row)
                    .filter(|c| c.start_byte() >= span.end_byte)
                    .map(|c| self.node_text(*c).to_string())
                    .collect();
                self.read_field(*decl, doc, comment)
            })
            .collect()
    }

    /// Comment lines directly above a field, with no blank line in between.
    fn doc_comments(&self, comments: &[Node], layout: &BodyLayout, field: &FieldSpan) -> Vec<String> {
        let mut doc = Vec::new();
        let mut next_row = field.start_row;

        for comment in comments
            .iter()
            .rev()
            .filter(|c| c.end_byte() <= field.start_byte)
        {
            let end_row = comment.end_position().row;
            let adjacent = end_row + 1 == next_row || (!doc.is_empty() && end_row == next_row);
            if !adjacent || layout.is_trailing(*comment) {
                break;
            }
            doc.push(self.node_text(*comment).to_string());
            next_row = comment.start_position().row;
        }

        doc.reverse();
        doc
    }

    fn read_field(&self, node: Node, doc: Vec<String>, comment: Vec<String>) -> Option<FieldSyntax> {
        let mut ty = self.read_type(node.child_by_field_name("type")?);

        let mut cursor = node.walk();
        let names: Vec<String> = node
            .children_by_field_name("name", &mut cursor)
            .map(|name| self.node_text(name).to_string())
            .collect();

        // An embedded `*T` keeps its star outside the type node.
        if names.is_empty() && has_token(node, "*") {
            ty = TypeSyntax::Pointer(Box::new(ty));
        }

        let tag = node
            .child_by_field_name("tag")
            .map(|tag| unquote_tag(self.node_text(tag)));

        Some(FieldSyntax {
            names,
            ty,
            tag,
            doc,
            comment,
        })
    }

    fn read_type(&self, node: Node) -> TypeSyntax {
        match node.kind() {
            "type_identifier" => TypeSyntax::Named(self.node_text(node).to_string()),

            "qualified_type" => TypeSyntax::Qualified {
                package: self.field_text(node, "package"),
                name: self.field_text(node, "name"),
            },

            "pointer_type" => TypeSyntax::Pointer(Box::new(self.first_named_type(node))),

            "slice_type" => TypeSyntax::Slice(Box::new(self.field_type(node, "element"))),

            "array_type" | "implicit_length_array_type" => {
                TypeSyntax::Array(Box::new(self.field_type(node, "element")))
            }

            "map_type" => TypeSyntax::Map {
                key: Box::new(self.field_type(node, "key")),
                value: Box::new(self.field_type(node, "value")),
            },

            "struct_type" => TypeSyntax::Struct,

            "generic_type" => TypeSyntax::Generic(Box::new(self.field_type(node, "type"))),

            "parenthesized_type" => self.first_named_type(node),

            other => TypeSyntax::Other(other.to_string()),
        }
    }

    fn field_text(&self, node: Node, field: &str) -> String {
        node.child_by_field_name(field)
            .map(|child| self.node_text(child).to_string())
            .unwrap_or_default()
    }

    fn field_type(&self, node: Node, field: &str) -> TypeSyntax {
        match node.child_by_field_name(field) {
            Some(child) => self.read_type(child),
            None => TypeSyntax::Other(node.kind().to_string()),
        }
    }

    fn first_named_type(&self, node: Node) -> TypeSyntax {
        let mut cursor = node.walk();
        let inner = node
            .children(&mut cursor)
            .find(|child| child.is_named() && child.kind() != "comment");
        match inner {
            Some(child) => self.read_type(child),
            None => TypeSyntax::Other(node.kind().to_string()),
        }
    }
}

fn find_child<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

fn has_token(node: Node, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == token);
    found
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

/// Strip the quotes from a struct tag literal.
fn unquote_tag(text: &str) -> String {
    if let Some(raw) = text.strip_prefix('`').and_then(|s| s.strip_suffix('`')) {
        return raw.to_string();
    }

    let inner = text
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(text);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}
