//! Java front end: lowers a tree-sitter-java tree into [`crate::syntax`] declarations.

use tree_sitter::{Node, Parser};

use crate::syntax::{
    Annotation, AnnotationArgument, ClassDecl, ClassKind, Member, MethodDecl, Parameter,
    SourceParser, SyntaxError,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct JavaParser;

impl SourceParser for JavaParser {
    fn parse(&self, source: &str) -> Result<Vec<ClassDecl>, SyntaxError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .map_err(|e| SyntaxError::Language(e.to_string()))?;
        let tree = parser.parse(source, None).ok_or(SyntaxError::NoTree)?;
        let root = tree.root_node();

        if root.has_error() {
            let (line, column) = first_error(root)
                .map(|n| (n.start_position().row + 1, n.start_position().column + 1))
                .unwrap_or((1, 1));
            return Err(SyntaxError::Invalid { line, column });
        }

        let mut classes = Vec::new();
        collect_classes(root, source.as_bytes(), &mut classes);
        Ok(classes)
    }
}

/// Pre-order search for the first ERROR or MISSING node, only descending
/// into subtrees that contain one.
fn first_error(root: Node) -> Option<Node> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

fn class_kind(kind: &str) -> Option<ClassKind> {
    match kind {
        "class_declaration" => Some(ClassKind::Class),
        "interface_declaration" => Some(ClassKind::Interface),
        "enum_declaration" => Some(ClassKind::Enum),
        "record_declaration" => Some(ClassKind::Record),
        _ => None,
    }
}

/// Pre-order walk, so an enclosing type always precedes the types nested in it.
/// Iterative: expression trees can be arbitrarily deep.
fn collect_classes(root: Node, source: &[u8], out: &mut Vec<ClassDecl>) {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if let Some(kind) = class_kind(node.kind())
            && let Some(class) = lower_class(node, kind, source)
        {
            out.push(class);
        }
        if cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

fn lower_class(node: Node, kind: ClassKind, source: &[u8]) -> Option<ClassDecl> {
    let name = node_text(&node.child_by_field_name("name")?, source).to_string();
    let members = node
        .child_by_field_name("body")
        .map(|body| lower_members(body, source))
        .unwrap_or_default();

    Some(ClassDecl {
        name,
        kind,
        annotations: modifier_annotations(node, source),
        members,
    })
}

fn lower_members(body: Node, source: &[u8]) -> Vec<Member> {
    let mut members = Vec::new();
    let mut cursor = body.walk();
    for child in body.named_children(&mut cursor) {
        match child.kind() {
            _ if child.is_extra() => {}
            "method_declaration" => {
                if let Some(method) = lower_method(child, source) {
                    members.push(Member::Method(method));
                }
            }
            "enum_body_declarations" => members.extend(lower_members(child, source)),
            kind => members.push(Member::Other {
                kind: kind.to_string(),
            }),
        }
    }
    members
}

fn lower_method(node: Node, source: &[u8]) -> Option<MethodDecl> {
    let name = node_text(&node.child_by_field_name("name")?, source).to_string();
    let parameters = node
        .child_by_field_name("parameters")
        .map(|params| lower_parameters(params, source))
        .unwrap_or_default();

    Some(MethodDecl {
        name,
        line: signature_line(node),
        parameters,
        annotations: modifier_annotations(node, source),
    })
}

/// Line of the first token after the modifiers, i.e. where the signature starts.
fn signature_line(node: Node) -> usize {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .find(|c| c.kind() != "modifiers" && !c.is_extra())
        .map(|c| line_of(&c))
        .unwrap_or_else(|| line_of(&node))
}

fn lower_parameters(params: Node, source: &[u8]) -> Vec<Parameter> {
    let mut parameters = Vec::new();
    let mut cursor = params.walk();
    for child in params.named_children(&mut cursor) {
        if matches!(child.kind(), "formal_parameter" | "spread_parameter") {
            parameters.push(Parameter {
                name: parameter_name(child, source),
                annotations: modifier_annotations(child, source),
            });
        }
    }
    parameters
}

fn parameter_name(node: Node, source: &[u8]) -> String {
    if let Some(name) = node.child_by_field_name("name") {
        return node_text(&name, source).to_string();
    }
    // varargs keep the name inside a variable_declarator
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .find(|c| c.kind() == "variable_declarator")
        .and_then(|d| d.child_by_field_name("name"))
        .map(|n| node_text(&n, source).to_string())
        .unwrap_or_default()
}

fn modifier_annotations(node: Node, source: &[u8]) -> Vec<Annotation> {
    let mut cursor = node.walk();
    let Some(modifiers) = node.children(&mut cursor).find(|c| c.kind() == "modifiers") else {
        return Vec::new();
    };

    let mut inner = modifiers.walk();
    modifiers
        .named_children(&mut inner)
        .filter_map(|c| lower_annotation(c, source))
        .collect()
}

fn lower_annotation(node: Node, source: &[u8]) -> Option<Annotation> {
    let argument = match node.kind() {
        "marker_annotation" => AnnotationArgument::Absent,
        "annotation" => node
            .child_by_field_name("arguments")
            .map(|args| lower_argument_list(args, source))
            .unwrap_or(AnnotationArgument::Absent),
        _ => return None,
    };
    let name = compact(node_text(&node.child_by_field_name("name")?, source));

    Some(Annotation {
        name,
        argument,
        line: line_of(&node),
    })
}

fn lower_argument_list(args: Node, source: &[u8]) -> AnnotationArgument {
    let values = named_values(args);
    match values.as_slice() {
        [] => AnnotationArgument::Absent,
        [single] if single.kind() != "element_value_pair" => lower_value(*single, source),
        [first, ..] => AnnotationArgument::Unsupported {
            kind: first.kind().to_string(),
        },
    }
}

fn lower_value(node: Node, source: &[u8]) -> AnnotationArgument {
    let text = node_text(&node, source);
    match node.kind() {
        "string_literal" => AnnotationArgument::Literal(unquote(text)),
        "character_literal"
        | "decimal_integer_literal"
        | "hex_integer_literal"
        | "octal_integer_literal"
        | "binary_integer_literal"
        | "decimal_floating_point_literal"
        | "hex_floating_point_literal"
        | "true"
        | "false"
        | "null_literal" => AnnotationArgument::Literal(text.to_string()),
        "identifier" => AnnotationArgument::Reference {
            qualifier: None,
            member: text.to_string(),
        },
        "field_access" => {
            match (
                node.child_by_field_name("object"),
                node.child_by_field_name("field"),
            ) {
                (Some(object), Some(field)) => AnnotationArgument::Reference {
                    qualifier: Some(compact(node_text(&object, source))),
                    member: node_text(&field, source).to_string(),
                },
                _ => AnnotationArgument::Unsupported {
                    kind: "field_access".to_string(),
                },
            }
        }
        "element_value_array_initializer" => AnnotationArgument::Array(
            named_values(node)
                .into_iter()
                .map(|v| lower_value(v, source))
                .collect(),
        ),
        kind => AnnotationArgument::Unsupported {
            kind: kind.to_string(),
        },
    }
}

fn named_values(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| !c.is_extra())
        .collect()
}

fn unquote(text: &str) -> String {
    for delim in ["\"\"\"", "\""] {
        if let Some(inner) = text
            .strip_prefix(delim)
            .and_then(|t| t.strip_suffix(delim))
        {
            return inner.to_string();
        }
    }
    text.to_string()
}

fn line_of(node: &Node) -> usize {
    node.start_position().row + 1
}

fn node_text<'a>(node: &Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

fn compact(s: &str) -> String {
    s.split_whitespace().collect()
}
