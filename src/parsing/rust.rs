//! Rust route extraction (actix-web / Rocket attributes, axum routers).

use std::path::Path;
use tree_sitter::{Node, Parser};

use super::parser::{method_from_name, named_children, node_text, string_literal_value};
use super::{DiscoveredEndpoint, EndpointExtractor, Framework, Language, ParseError};
use crate::types::{HttpMethod, SourceLocation};

pub struct RustExtractor {
    parser: Parser,
}

impl std::fmt::Debug for RustExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RustExtractor")
            .field("language", &"Rust")
            .finish()
    }
}

impl RustExtractor {
    pub fn new() -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_rust::LANGUAGE.into())
            .map_err(|e| ParseError::ParserInit {
                language: Language::Rust,
                reason: e.to_string(),
            })?;
        Ok(Self { parser })
    }

    fn visit(&self, node: Node, code: &str, file: &Path, out: &mut Vec<DiscoveredEndpoint>) {
        match node.kind() {
            "attribute_item" => {
                if let Some(attr) = named_children(node)
                    .into_iter()
                    .find(|c| c.kind() == "attribute")
                {
                    extract_attribute(node, attr, code, file, out);
                }
            }
            "call_expression" => extract_route_call(node, code, file, out),
            _ => {}
        }

        for child in named_children(node) {
            self.visit(child, code, file, out);
        }
    }
}

impl EndpointExtractor for RustExtractor {
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
        Language::Rust
    }
}

/// Last path segment of an identifier or `a::b::c` path.
fn last_segment<'a>(node: Node, code: &'a str) -> Option<&'a str> {
    match node.kind() {
        "identifier" | "field_identifier" => Some(node_text(node, code)),
        "scoped_identifier" => node.child_by_field_name("name").map(|n| node_text(n, code)),
        _ => None,
    }
}

/// `#[get("/x")]`, `#[actix_web::post("/x")]`,
/// `#[route("/x", method = "GET", method = "HEAD")]`
fn extract_attribute(
    item: Node,
    attr: Node,
    code: &str,
    file: &Path,
    out: &mut Vec<DiscoveredEndpoint>,
) {
    let Some(name) = attr.named_child(0).and_then(|n| last_segment(n, code)) else {
        return;
    };
    let is_route = name == "route";
    let method = if is_route {
        None
    } else if name.chars().all(|c| c.is_ascii_lowercase()) {
        match method_from_name(name) {
            Some(method) => Some(method),
            None => return,
        }
    } else {
        return;
    };

    let Some(tokens) = attr.child_by_field_name("arguments") else {
        return;
    };
    let tokens = named_children(tokens);
    let Some(path) = tokens
        .first()
        .and_then(|t| string_literal_value(*t, code))
    else {
        return;
    };

    let location = SourceLocation::from_point(file, item.start_position());

    if !is_route {
        out.push(DiscoveredEndpoint::new(path, method, Framework::Actix, location));
        return;
    }

    // method = "GET" pairs inside the token tree
    let mut methods = Vec::new();
    for pair in tokens.windows(2) {
        if pair[0].kind() == "identifier" && node_text(pair[0], code) == "method" {
            if let Some(m) =
                string_literal_value(pair[1], code).and_then(|s| method_from_name(&s))
            {
                methods.push(m);
            }
        }
    }

    if methods.is_empty() {
        out.push(DiscoveredEndpoint::new(path, None, Framework::Actix, location));
    } else {
        for m in methods {
            out.push(DiscoveredEndpoint::new(
                path.clone(),
                Some(m),
                Framework::Actix,
                location.clone(),
            ));
        }
    }
}

/// Methods collected from the second argument of a `.route(path, ...)` call.
#[derive(Default)]
struct MethodRouter {
    methods: Vec<HttpMethod>,
    any: bool,
    /// Built from `web::<verb>()`, so the router is actix-web's
    actix: bool,
}

/// `Router::new().route("/x", get(list).post(create))` (axum) and
/// `App::new().route("/x", web::get().to(handler))` (actix-web)
fn extract_route_call(call: Node, code: &str, file: &Path, out: &mut Vec<DiscoveredEndpoint>) {
    let Some(function) = call.child_by_field_name("function") else {
        return;
    };
    if function.kind() != "field_expression" {
        return;
    }
    let Some(field) = function.child_by_field_name("field") else {
        return;
    };
    if node_text(field, code) != "route" {
        return;
    }
    let Some(args) = call.child_by_field_name("arguments").map(named_children) else {
        return;
    };
    if args.len() != 2 {
        return;
    }
    let Some(path) = string_literal_value(args[0], code) else {
        return;
    };

    let mut router = MethodRouter::default();
    collect_method_router(args[1], code, &mut router);

    let framework = if router.actix {
        Framework::Actix
    } else {
        Framework::Axum
    };
    let location = SourceLocation::from_point(file, field.start_position());
    if router.any || router.methods.is_empty() {
        out.push(DiscoveredEndpoint::new(
            path.clone(),
            None,
            framework,
            location.clone(),
        ));
    }
    for method in router.methods {
        out.push(DiscoveredEndpoint::new(
            path.clone(),
            Some(method),
            framework,
            location.clone(),
        ));
    }
}

/// Walk a method-router chain like `get(a).post(b)`, `routing::get_service(svc)`
/// or `web::post().to(h)`.
fn collect_method_router(node: Node, code: &str, router: &mut MethodRouter) {
    if node.kind() != "call_expression" {
        return;
    }
    let Some(function) = node.child_by_field_name("function") else {
        return;
    };

    let name = match function.kind() {
        "field_expression" => {
            if let Some(receiver) = function.child_by_field_name("value") {
                collect_method_router(receiver, code, router);
            }
            function
                .child_by_field_name("field")
                .map(|f| node_text(f, code))
        }
        "scoped_identifier" => {
            if function
                .child_by_field_name("path")
                .is_some_and(|p| last_segment(p, code) == Some("web"))
            {
                router.actix = true;
            }
            last_segment(function, code)
        }
        _ => last_segment(function, code),
    };
    let Some(name) = name else {
        return;
    };

    let name = name.strip_suffix("_service").unwrap_or(name);
    if name == "any" {
        router.any = true;
    } else if let Some(method) = method_from_name(name) {
        if !router.methods.contains(&method) {
            router.methods.push(method);
        }
    }
}
