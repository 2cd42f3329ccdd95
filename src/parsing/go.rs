//! Go route extraction.
//!
//! - `http.HandleFunc("/x", h)` and Go 1.22 patterns `mux.Handle("GET /x/{id}", h)`
//! - gorilla/mux `r.HandleFunc("/x", h).Methods("GET", "POST")`
//! - gin / echo style `r.GET("/x", h)`, `r.Any("/x", h)`
//! - chi `r.Get("/x", h)`, `r.Method("GET", "/x", h)`

use std::path::Path;
use tree_sitter::{Node, Parser};

use super::parser::{method_from_name, named_children, node_text, string_literal_value};
use super::{DiscoveredEndpoint, EndpointExtractor, Framework, Language, ParseError};
use crate::types::{HttpMethod, SourceLocation};

pub struct GoExtractor {
    parser: Parser,
}

impl std::fmt::Debug for GoExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoExtractor").finish()
    }
}

impl GoExtractor {
    pub fn new() -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .map_err(|e| ParseError::ParserInit {
                language: Language::Go,
                reason: e.to_string(),
            })?;
        Ok(Self { parser })
    }

    fn visit(&self, node: Node, code: &str, file: &Path, out: &mut Vec<DiscoveredEndpoint>) {
        if node.kind() == "call_expression" {
            extract_call(node, code, file, out);
        }
        for child in named_children(node) {
            self.visit(child, code, file, out);
        }
    }
}

impl EndpointExtractor for GoExtractor {
    fn extract(&mut self, code: &str, file: &Path) -> Vec<DiscoveredEndpoint> {
        let Some(tree) = self.parser.parse(code, None) else {
            tracing::warn!(target: "parse", "Failed to parse {}", file.display());
            return Vec::new();
        };

        let mut endpoints = Vec::new();
        self.visit(tree.root_node(), code, file, &mut endpoints);
        endpoints
    }

    fn language(&self) -> Language {
        Language::Go
    }
}

/// Routing call shapes, keyed by the selector name.
enum RouteCall {
    /// `Handle` / `HandleFunc`
    Mux,
    /// `GET`, `POST`, ..., `Any`
    Gin(Option<HttpMethod>),
    /// `Get`, `Post`, ...
    Chi(HttpMethod),
    /// chi `Method` / `MethodFunc`
    ChiMethod,
}

fn classify(name: &str) -> Option<RouteCall> {
    match name {
        "Handle" | "HandleFunc" => return Some(RouteCall::Mux),
        "Any" => return Some(RouteCall::Gin(None)),
        "Method" | "MethodFunc" => return Some(RouteCall::ChiMethod),
        _ => {}
    }

    let method = method_from_name(name)?;
    let mut chars = name.chars();
    let first_upper = chars.next().is_some_and(|c| c.is_ascii_uppercase());
    if name.chars().all(|c| c.is_ascii_uppercase()) {
        Some(RouteCall::Gin(Some(method)))
    } else if first_upper && chars.all(|c| c.is_ascii_lowercase()) {
        Some(RouteCall::Chi(method))
    } else {
        None
    }
}

fn extract_call(call: Node, code: &str, file: &Path, out: &mut Vec<DiscoveredEndpoint>) {
    let Some(function) = call.child_by_field_name("function") else {
        return;
    };
    if function.kind() != "selector_expression" {
        return;
    }
    let Some(field) = function.child_by_field_name("field") else {
        return;
    };
    let Some(kind) = classify(node_text(field, code)) else {
        return;
    };
    let Some(args) = call.child_by_field_name("arguments").map(named_children) else {
        return;
    };
    if args.len() < 2 {
        return;
    }

    let location = SourceLocation::from_point(file, field.start_position());
    let push = |out: &mut Vec<DiscoveredEndpoint>, path: &str, method, framework| {
        out.push(DiscoveredEndpoint::new(path, method, framework, location.clone()));
    };

    match kind {
        RouteCall::Mux => {
            let Some(pattern) = string_literal_value(args[0], code) else {
                return;
            };
            let Some((pattern_method, path)) = split_pattern(&pattern) else {
                return;
            };

            if let Some(methods) = chained_methods(call, code) {
                if methods.is_empty() {
                    push(out, path, None, Framework::Gorilla);
                }
                for method in methods {
                    push(out, path, Some(method), Framework::Gorilla);
                }
            } else {
                push(out, path, pattern_method, Framework::NetHttp);
            }
        }
        RouteCall::Gin(method) => {
            if let Some(path) = route_path(args[0], code) {
                push(out, &path, method, Framework::Gin);
            }
        }
        RouteCall::Chi(method) => {
            if let Some(path) = route_path(args[0], code) {
                push(out, &path, Some(method), Framework::Chi);
            }
        }
        RouteCall::ChiMethod => {
            if args.len() < 3 {
                return;
            }
            let method = string_literal_value(args[0], code).and_then(|m| method_from_name(&m));
            if let (Some(method), Some(path)) = (method, route_path(args[1], code)) {
                push(out, &path, Some(method), Framework::Chi);
            }
        }
    }
}

/// String literal that looks like a route path.
fn route_path(node: Node, code: &str) -> Option<String> {
    string_literal_value(node, code).filter(|p| p.starts_with('/'))
}

/// `[METHOD ][HOST]/PATH` -> (method, path)
fn split_pattern(pattern: &str) -> Option<(Option<HttpMethod>, &str)> {
    let slash = pattern.find('/')?;
    let (prefix, path) = pattern.split_at(slash);

    let prefix = prefix.trim();
    let method = if pattern[..slash].contains(char::is_whitespace) {
        let token = prefix.split_whitespace().next()?;
        Some(method_from_name(token)?)
    } else {
        None
    };
    Some((method, path))
}

/// Methods from a gorilla `.Methods(...)` call chained onto this route.
///
/// `None` when nothing is chained; an empty list when `.Methods` carries
/// no literal methods.
fn chained_methods(call: Node, code: &str) -> Option<Vec<HttpMethod>> {
    let selector = call.parent().filter(|p| p.kind() == "selector_expression")?;
    let field = selector.child_by_field_name("field")?;
    if node_text(field, code) != "Methods" {
        return None;
    }
    let outer = selector.parent().filter(|p| p.kind() == "call_expression")?;
    let args = outer.child_by_field_name("arguments")?;

    Some(
        named_children(args)
            .into_iter()
            .filter_map(|arg| string_literal_value(arg, code))
            .filter_map(|m| method_from_name(&m))
            .collect(),
    )
}
