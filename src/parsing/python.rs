//! Python route extraction (Flask, FastAPI).
//!
//! Recognized constructs:
//! - `@app.route("/path", methods=["GET", "POST"])` (Flask, defaults to GET)
//! - `@router.get("/path")`, `@app.post(...)`, ... (FastAPI and Flask 2 shortcuts)
//! - `@router.api_route("/path", methods=[...])` (FastAPI)
//! - `app.add_url_rule("/path", view_func=..., methods=[...])` (Flask)

use std::path::Path;
use tree_sitter::{Node, Parser};

use super::parser::{method_from_name, named_children, node_text, string_literal_value};
use super::{DiscoveredEndpoint, EndpointExtractor, Framework, Language, ParseError};
use crate::types::{HttpMethod, SourceLocation};

pub struct PythonExtractor {
    parser: Parser,
}

impl std::fmt::Debug for PythonExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PythonExtractor").finish()
    }
}

/// Per-file state threaded through the walk.
struct FileContext<'a> {
    code: &'a str,
    file: &'a Path,
    shortcut_framework: Framework,
}

impl PythonExtractor {
    pub fn new() -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| ParseError::ParserInit {
                language: Language::Python,
                reason: e.to_string(),
            })?;
        Ok(Self { parser })
    }

    fn visit(&self, node: Node, ctx: &FileContext, out: &mut Vec<DiscoveredEndpoint>) {
        match node.kind() {
            "decorator" => {
                if let Some(call) = node.named_child(0).filter(|n| n.kind() == "call") {
                    self.extract_decorator(node, call, ctx, out);
                }
            }
            "call" => self.extract_add_url_rule(node, ctx, out),
            _ => {}
        }

        for child in named_children(node) {
            self.visit(child, ctx, out);
        }
    }

    fn extract_decorator(
        &self,
        decorator: Node,
        call: Node,
        ctx: &FileContext,
        out: &mut Vec<DiscoveredEndpoint>,
    ) {
        let Some(attr) = attribute_name(call, ctx.code) else {
            return;
        };
        let Some(args) = call.child_by_field_name("arguments") else {
            return;
        };

        let (framework, methods) = match attr {
            "route" => (
                Framework::Flask,
                methods_keyword(args, ctx.code).unwrap_or_else(|| vec![HttpMethod::Get]),
            ),
            "api_route" => (
                Framework::FastApi,
                methods_keyword(args, ctx.code).unwrap_or_else(|| vec![HttpMethod::Get]),
            ),
            other => match method_from_name(other) {
                Some(method) if other.chars().all(|c| c.is_ascii_lowercase()) => {
                    (ctx.shortcut_framework, vec![method])
                }
                _ => return,
            },
        };

        let Some(path) = path_argument(args, ctx.code, &["rule", "path"]) else {
            return;
        };

        let location = SourceLocation::from_point(ctx.file, decorator.start_position());
        for method in methods {
            out.push(DiscoveredEndpoint::new(
                path.clone(),
                Some(method),
                framework,
                location.clone(),
            ));
        }
    }

    fn extract_add_url_rule(
        &self,
        call: Node,
        ctx: &FileContext,
        out: &mut Vec<DiscoveredEndpoint>,
    ) {
        if attribute_name(call, ctx.code) != Some("add_url_rule") {
            return;
        }
        let Some(args) = call.child_by_field_name("arguments") else {
            return;
        };
        let Some(path) = path_argument(args, ctx.code, &["rule"]) else {
            return;
        };

        let methods = methods_keyword(args, ctx.code).unwrap_or_else(|| vec![HttpMethod::Get]);
        let location = SourceLocation::from_point(ctx.file, call.start_position());
        for method in methods {
            out.push(DiscoveredEndpoint::new(
                path.clone(),
                Some(method),
                Framework::Flask,
                location.clone(),
            ));
        }
    }
}

impl EndpointExtractor for PythonExtractor {
    fn extract(&mut self, code: &str, file: &Path) -> Vec<DiscoveredEndpoint> {
        let Some(tree) = self.parser.parse(code, None) else {
            tracing::warn!(target: "parse", "Failed to parse {}", file.display());
            return Vec::new();
        };

        // `@app.get` exists in both frameworks; imports decide the label.
        let shortcut_framework = if code.contains("fastapi") {
            Framework::FastApi
        } else {
            Framework::Flask
        };

        let ctx = FileContext {
            code,
            file,
            shortcut_framework,
        };
        let mut endpoints = Vec::new();
        self.visit(tree.root_node(), &ctx, &mut endpoints);
        endpoints
    }

    fn language(&self) -> Language {
        Language::Python
    }
}

/// `x.y(...)` -> `y`
fn attribute_name<'a>(call: Node, code: &'a str) -> Option<&'a str> {
    let function = call.child_by_field_name("function")?;
    if function.kind() != "attribute" {
        return None;
    }
    function
        .child_by_field_name("attribute")
        .map(|n| node_text(n, code))
}

/// First positional string argument, or one of the given keywords.
fn path_argument(args: Node, code: &str, keywords: &[&str]) -> Option<String> {
    let children = named_children(args);

    if let Some(first) = children.iter().find(|c| c.kind() != "keyword_argument") {
        return string_literal_value(*first, code);
    }

    children
        .iter()
        .filter(|c| c.kind() == "keyword_argument")
        .find(|kw| {
            kw.child_by_field_name("name")
                .is_some_and(|n| keywords.contains(&node_text(n, code)))
        })
        .and_then(|kw| kw.child_by_field_name("value"))
        .and_then(|v| string_literal_value(v, code))
}

/// `methods=["GET", "POST"]`; `None` when the keyword is absent.
fn methods_keyword(args: Node, code: &str) -> Option<Vec<HttpMethod>> {
    let value = named_children(args)
        .into_iter()
        .filter(|c| c.kind() == "keyword_argument")
        .find(|kw| {
            kw.child_by_field_name("name")
                .is_some_and(|n| node_text(n, code) == "methods")
        })?
        .child_by_field_name("value")?;

    if !matches!(value.kind(), "list" | "tuple" | "set") {
        return None;
    }

    let methods: Vec<HttpMethod> = named_children(value)
        .into_iter()
        .filter_map(|item| string_literal_value(item, code))
        .filter_map(|name| method_from_name(&name))
        .collect();

    (!methods.is_empty()).then_some(methods)
}
