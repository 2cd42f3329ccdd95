//! Endpoint extractor trait
//!
//! This module defines the common interface that all language extractors
//! implement, plus tree-sitter helpers they share.

use std::path::Path;
use tree_sitter::Node;

use super::{DiscoveredEndpoint, Language};
use crate::types::HttpMethod;

/// Common interface for all language extractors
pub trait EndpointExtractor: Send {
    /// Parse source code and return every route definition found
    fn extract(&mut self, code: &str, file: &Path) -> Vec<DiscoveredEndpoint>;

    /// Get the language this extractor handles
    fn language(&self) -> Language;
}

pub(crate) fn node_text<'a>(node: Node, code: &'a str) -> &'a str {
    &code[node.byte_range()]
}

/// Value of a string literal node, or `None` for anything that is not a
/// plain literal (interpolated strings, identifiers, concatenations).
pub(crate) fn string_literal_value(node: Node, code: &str) -> Option<String> {
    match node.kind() {
        "string"
        | "string_literal"
        | "raw_string_literal"
        | "interpreted_string_literal"
        | "template_string" => {}
        _ => return None,
    }

    let mut cursor = node.walk();
    let interpolated = node
        .children(&mut cursor)
        .any(|c| matches!(c.kind(), "interpolation" | "template_substitution"));
    if interpolated {
        return None;
    }

    unquote(node_text(node, code))
}

/// Strip string prefixes (`r`, `b`, `f`, `u`), raw-string hashes and quotes.
pub(crate) fn unquote(text: &str) -> Option<String> {
    let body = text.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    let hashes = body.len() - body.trim_start_matches('#').len();
    let body = &body[hashes..];
    let body = body.strip_suffix(&"#".repeat(hashes)[..])?;

    for quote in ["\"\"\"", "'''", "\"", "'", "`"] {
        if body.len() >= quote.len() * 2 && body.starts_with(quote) && body.ends_with(quote) {
            return Some(body[quote.len()..body.len() - quote.len()].to_string());
        }
    }
    None
}

/// Map a framework helper name (`get`, `POST`, `Delete`) to a method.
pub(crate) fn method_from_name(name: &str) -> Option<HttpMethod> {
    name.parse().ok()
}

/// Iterate named children without holding a cursor borrow.
pub(crate) fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquote_variants() {
        assert_eq!(unquote("'/users'").as_deref(), Some("/users"));
        assert_eq!(unquote("\"/users\"").as_deref(), Some("/users"));
        assert_eq!(unquote("r\"/users\"").as_deref(), Some("/users"));
        assert_eq!(unquote("r#\"/users\"#").as_deref(), Some("/users"));
        assert_eq!(unquote("`/users`").as_deref(), Some("/users"));
        assert_eq!(unquote("'''/users'''").as_deref(), Some("/users"));
        assert_eq!(unquote("\"\"").as_deref(), Some(""));
        assert_eq!(unquote("users"), None);
    }

    #[test]
    fn test_method_from_name() {
        assert_eq!(method_from_name("get"), Some(HttpMethod::Get));
        assert_eq!(method_from_name("DELETE"), Some(HttpMethod::Delete));
        assert_eq!(method_from_name("Patch"), Some(HttpMethod::Patch));
        assert_eq!(method_from_name("route"), None);
    }
}
