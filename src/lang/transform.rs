//! Syntax-aware rewriting of environment lookups.
//!
//! The rewrite runs as three steps behind [`SourceTransform`]: parse the text
//! into a tree, decide which lookups to replace, and print the result. The
//! tree-sitter engine never reprints unrelated code: it splices literal values
//! into the original text, so comments, formatting and type annotations are
//! kept byte for byte.

use std::path::{Path, PathBuf};

use tracing::debug;
use tree_sitter::{Node, Tree};

use super::env_refs::{find_env_references, EnvReference};
use super::registry::{create_parser_for_language, language_key_for_path};
use crate::core::config::AbsentVariables;
use crate::core::environment::EnvSnapshot;
use crate::core::errors::{InlineError, Result};
use crate::core::policy::InlinePolicy;

/// Pluggable parse/substitute/print engine used by the variable inliner.
pub trait SourceTransform: Send + Sync + 'static {
    /// Engine-specific syntax representation.
    type Tree: Send + 'static;

    /// Parse source text. Malformed sources are rejected with a parse error.
    fn parse(&self, path: &Path, text: String) -> Result<Self::Tree>;

    /// Replace eligible lookups with literal values.
    fn substitute(
        &self,
        tree: Self::Tree,
        policy: &InlinePolicy,
        env: &EnvSnapshot,
    ) -> Result<Self::Tree>;

    /// Render the tree back to source text with the original line structure.
    fn print(&self, tree: &Self::Tree) -> String;
}

/// A literal spliced over a byte range of the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub start_byte: usize,
    pub end_byte: usize,
    pub text: String,
}

/// Parsed source file together with its pending replacements.
#[derive(Debug)]
pub struct ParsedSource {
    pub path: PathBuf,
    pub language: &'static str,
    pub text: String,
    pub tree: Tree,
    pub replacements: Vec<Replacement>,
}

impl ParsedSource {
    /// All `process.env` lookups in the file, in source order.
    pub fn env_references(&self) -> Vec<EnvReference> {
        find_env_references(&self.tree, &self.text)
    }
}

/// Tree-sitter backed engine for JavaScript, TypeScript and their JSX variants.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeSitterTransform {
    absent_variables: AbsentVariables,
}

impl TreeSitterTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_absent_variables(mut self, absent_variables: AbsentVariables) -> Self {
        self.absent_variables = absent_variables;
        self
    }

    fn literal_for(&self, value: Option<&str>) -> Option<String> {
        match (value, self.absent_variables) {
            (Some(value), _) => Some(render_string_literal(value)),
            (None, AbsentVariables::Undefined) => Some("undefined".to_string()),
            (None, AbsentVariables::Keep) => None,
        }
    }
}

impl SourceTransform for TreeSitterTransform {
    type Tree = ParsedSource;

    fn parse(&self, path: &Path, text: String) -> Result<ParsedSource> {
        let language = language_key_for_path(path).ok_or_else(|| {
            InlineError::unsupported(format!(
                "Could not determine source kind for file: {}",
                path.display()
            ))
        })?;

        let mut parser = create_parser_for_language(language)?;
        let tree = parser.parse(&text, None).ok_or_else(|| {
            InlineError::parse_with_location(language, "Parser produced no tree", path, None, None)
        })?;

        if let Some(node) = first_error_node(&tree) {
            let position = node.start_position();
            let message = if node.is_missing() {
                format!("Missing {}", node.kind())
            } else {
                "Unexpected syntax".to_string()
            };
            return Err(InlineError::parse_with_location(
                language,
                format!(
                    "{} at {}:{}:{}",
                    message,
                    path.display(),
                    position.row + 1,
                    position.column + 1
                ),
                path,
                Some(position.row + 1),
                Some(position.column + 1),
            ));
        }

        Ok(ParsedSource {
            path: path.to_path_buf(),
            language,
            text,
            tree,
            replacements: Vec::new(),
        })
    }

    fn substitute(
        &self,
        mut source: ParsedSource,
        policy: &InlinePolicy,
        env: &EnvSnapshot,
    ) -> Result<ParsedSource> {
        for reference in source.env_references() {
            if reference.is_write_target || !policy.is_eligible(&reference.name) {
                continue;
            }
            let Some(literal) = self.literal_for(env.get(&reference.name)) else {
                continue;
            };

            let original = &source.text[reference.start_byte..reference.end_byte];
            let mut text = literal;
            text.push_str(&line_breaks(original));

            debug!(
                "{}:{} inlining process.env.{}",
                source.path.display(),
                reference.line,
                reference.name
            );
            source.replacements.push(Replacement {
                start_byte: reference.start_byte,
                end_byte: reference.end_byte,
                text,
            });
        }

        Ok(source)
    }

    fn print(&self, source: &ParsedSource) -> String {
        let mut replacements: Vec<&Replacement> = source.replacements.iter().collect();
        replacements.sort_by_key(|r| r.start_byte);

        let mut output = String::with_capacity(source.text.len());
        let mut cursor = 0;
        for replacement in replacements {
            if replacement.start_byte < cursor {
                continue;
            }
            output.push_str(&source.text[cursor..replacement.start_byte]);
            output.push_str(&replacement.text);
            cursor = replacement.end_byte;
        }
        output.push_str(&source.text[cursor..]);
        output
    }
}

/// Render a value as a double-quoted JavaScript string literal.
///
/// JSON string escaping is valid JavaScript and never emits a raw newline.
/// U+2028 and U+2029 are left raw by JSON but count as line terminators in
/// JavaScript tooling, so they are escaped as well.
pub fn render_string_literal(value: &str) -> String {
    serde_json::Value::String(value.to_string())
        .to_string()
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

/// The line terminators contained in `text`, in order.
fn line_breaks(text: &str) -> String {
    let mut breaks = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                breaks.push_str("\r\n");
            }
            '\n' => breaks.push('\n'),
            _ => {}
        }
    }
    breaks
}

/// First `ERROR` or `MISSING` node in document order.
fn first_error_node(tree: &Tree) -> Option<Node<'_>> {
    let root = tree.root_node();
    if !root.has_error() {
        return None;
    }

    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if !node.has_error() {
            continue;
        }
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    Some(root)
}

#[cfg(test)]
#[path = "transform_tests.rs"]
mod tests;
