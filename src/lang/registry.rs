//! Supported source kinds and tree-sitter grammar lookup.

use std::path::Path;
use tree_sitter::Language;

use crate::core::errors::{InlineError, Result};

/// Metadata describing one of the rewritable source kinds.
#[derive(Debug, Clone, Copy)]
pub struct LanguageInfo {
    /// Canonical short key (e.g. "js").
    pub key: &'static str,
    /// Human-friendly display name.
    pub name: &'static str,
    /// Supported file extensions (without leading dots).
    pub extensions: &'static [&'static str],
    /// Notes for CLI output.
    pub notes: &'static str,
}

const REGISTERED_LANGUAGES: &[LanguageInfo] = &[
    LanguageInfo {
        key: "js",
        name: "JavaScript",
        extensions: &["js", "jsx", "mjs", "cjs"],
        notes: "JSX syntax accepted",
    },
    LanguageInfo {
        key: "ts",
        name: "TypeScript",
        extensions: &["ts", "mts", "cts"],
        notes: "Type annotations preserved",
    },
    LanguageInfo {
        key: "tsx",
        name: "TypeScript JSX",
        extensions: &["tsx"],
        notes: "Type annotations preserved",
    },
];

/// Return the source kinds compiled into this build.
pub fn registered_languages() -> &'static [LanguageInfo] {
    REGISTERED_LANGUAGES
}

/// Identify the canonical language key for a file path.
pub fn language_key_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?;
    find_language_by_extension(ext).map(|info| info.key)
}

/// Get tree-sitter language for a given language key
pub fn get_tree_sitter_language(language_key: &str) -> Result<Language> {
    match normalize_language_key(language_key) {
        Some("js") => Ok(tree_sitter_javascript::LANGUAGE.into()),
        Some("ts") => Ok(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        Some("tsx") => Ok(tree_sitter_typescript::LANGUAGE_TSX.into()),
        _ => Err(InlineError::unsupported(format!(
            "No tree-sitter grammar for: {}",
            language_key
        ))),
    }
}

/// Create a new parser for the given language
pub fn create_parser_for_language(language_key: &str) -> Result<tree_sitter::Parser> {
    let mut parser = tree_sitter::Parser::new();
    let tree_sitter_language = get_tree_sitter_language(language_key)?;
    parser.set_language(&tree_sitter_language).map_err(|e| {
        InlineError::parse(
            language_key,
            format!("Failed to set parser language: {}", e),
        )
    })?;
    Ok(parser)
}

/// Check whether a file extension (with or without leading dot) is supported.
pub fn extension_is_supported(ext: &str) -> bool {
    find_language_by_extension(ext).is_some()
}

/// Finds the language info for a given file extension.
fn find_language_by_extension(ext: &str) -> Option<&'static LanguageInfo> {
    let target = ext.trim_start_matches('.');
    if target.is_empty() {
        return None;
    }
    registered_languages().iter().find(|info| {
        info.extensions
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(target))
    })
}

/// Normalizes a language identifier to its canonical key.
fn normalize_language_key(language: &str) -> Option<&'static str> {
    match language.to_ascii_lowercase().as_str() {
        "js" | "jsx" | "mjs" | "cjs" | "javascript" => Some("js"),
        "ts" | "mts" | "cts" | "typescript" => Some("ts"),
        "tsx" => Some("tsx"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_key_detection() {
        assert_eq!(language_key_for_path(Path::new("fn/hello.js")), Some("js"));
        assert_eq!(language_key_for_path(Path::new("fn/hello.jsx")), Some("js"));
        assert_eq!(language_key_for_path(Path::new("fn/hello.mjs")), Some("js"));
        assert_eq!(language_key_for_path(Path::new("fn/hello.cjs")), Some("js"));
        assert_eq!(language_key_for_path(Path::new("fn/hello.ts")), Some("ts"));
        assert_eq!(language_key_for_path(Path::new("fn/hello.MTS")), Some("ts"));
        assert_eq!(language_key_for_path(Path::new("fn/hello.tsx")), Some("tsx"));
        assert_eq!(language_key_for_path(Path::new("fn/hello.go")), None);
        assert_eq!(language_key_for_path(Path::new("README")), None);
    }

    #[test]
    fn test_extension_support() {
        for ext in [".js", "JSX", "mjs", ".cjs", "ts", ".tsx", "cts"] {
            assert!(extension_is_supported(ext), "extension {} should be supported", ext);
        }
        for ext in ["", ".", ".zip", "go", "json"] {
            assert!(!extension_is_supported(ext), "extension {} should be rejected", ext);
        }
    }

    #[test]
    fn test_parsers_for_every_registered_language() {
        for info in registered_languages() {
            assert!(get_tree_sitter_language(info.key).is_ok());
            assert!(create_parser_for_language(info.key).is_ok());
        }
        assert!(get_tree_sitter_language("python").is_err());
    }
}
