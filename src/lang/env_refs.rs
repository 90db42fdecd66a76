//! Locating build-time environment lookups in a tree-sitter syntax tree.
//!
//! A reference is a member access on `process.env`, either `process.env.NAME`
//! or `process.env["NAME"]` with a plain string key. The JavaScript,
//! TypeScript and TSX grammars share these node kinds.

use tree_sitter::{Node, Tree};

/// One `process.env` lookup found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvReference {
    /// Variable name being read
    pub name: String,
    /// Byte offset where the whole lookup expression starts
    pub start_byte: usize,
    /// Byte offset where the lookup expression ends
    pub end_byte: usize,
    /// 1-based line of the lookup
    pub line: usize,
    /// True when the expression is written to (assignment, update, delete)
    pub is_write_target: bool,
}

/// Collect every `process.env` reference in source order.
pub fn find_env_references(tree: &Tree, source: &str) -> Vec<EnvReference> {
    let mut references = Vec::new();
    let mut stack = vec![tree.root_node()];

    while let Some(node) = stack.pop() {
        if let Some(name) = env_reference_name(&node, source) {
            references.push(EnvReference {
                name,
                start_byte: node.start_byte(),
                end_byte: node.end_byte(),
                line: node.start_position().row + 1,
                is_write_target: is_write_target(&node),
            });
            // The object is `process.env` itself, so no nested lookup can match.
            continue;
        }

        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }

    references
}

/// Return the variable name if `node` reads a key from `process.env`.
fn env_reference_name(node: &Node, source: &str) -> Option<String> {
    if has_optional_chain(node) {
        return None;
    }

    let name = match node.kind() {
        "member_expression" => {
            let property = node.child_by_field_name("property")?;
            if property.kind() != "property_identifier" {
                return None;
            }
            node_text(&property, source)?.to_string()
        }
        "subscript_expression" => {
            let index = node.child_by_field_name("index")?;
            plain_string_value(&index, source)?
        }
        _ => return None,
    };

    let object = node.child_by_field_name("object")?;
    if !is_process_env(&object, source) || name.is_empty() {
        return None;
    }
    Some(name)
}

/// Whether `node` is `process.env` or `process["env"]`.
fn is_process_env(node: &Node, source: &str) -> bool {
    if has_optional_chain(node) {
        return false;
    }
    let Some(object) = node.child_by_field_name("object") else {
        return false;
    };
    if object.kind() != "identifier" || node_text(&object, source) != Some("process") {
        return false;
    }

    match node.kind() {
        "member_expression" => node
            .child_by_field_name("property")
            .and_then(|property| node_text(&property, source))
            == Some("env"),
        "subscript_expression" => node
            .child_by_field_name("index")
            .and_then(|index| plain_string_value(&index, source))
            .as_deref()
            == Some("env"),
        _ => false,
    }
}

/// Value of a string literal without escape sequences or substitutions.
fn plain_string_value(node: &Node, source: &str) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }
    let mut value = String::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "string_fragment" {
            return None;
        }
        value.push_str(node_text(&child, source)?);
    }
    Some(value)
}

fn has_optional_chain(node: &Node) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| matches!(child.kind(), "optional_chain" | "?."));
    found
}

/// Assignment targets, destructuring targets, for-in/of heads, update
/// operands and `delete` operands must stay lookups.
fn is_write_target(node: &Node) -> bool {
    let mut target = *node;
    let Some(mut parent) = target.parent() else {
        return false;
    };
    while matches!(parent.kind(), "parenthesized_expression" | "non_null_expression") {
        target = parent;
        let Some(next) = parent.parent() else {
            return false;
        };
        parent = next;
    }

    match parent.kind() {
        "assignment_expression" | "augmented_assignment_expression" | "for_in_statement" => {
            is_field(&parent, "left", &target)
        }
        // Defaults on the right of a pattern are reads.
        "assignment_pattern" | "object_assignment_pattern" => is_field(&parent, "left", &target),
        "pair_pattern" => is_field(&parent, "value", &target),
        "array_pattern" | "object_pattern" | "rest_pattern" => true,
        "update_expression" => true,
        "unary_expression" => parent
            .child_by_field_name("operator")
            .is_some_and(|operator| operator.kind() == "delete"),
        _ => false,
    }
}

fn is_field(parent: &Node, field: &str, child: &Node) -> bool {
    parent
        .child_by_field_name(field)
        .is_some_and(|node| node.id() == child.id())
}

fn node_text<'a>(node: &Node, source: &'a str) -> Option<&'a str> {
    node.utf8_text(source.as_bytes()).ok()
}
