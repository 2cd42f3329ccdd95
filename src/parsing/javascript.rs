//! JavaScript and TypeScript route extraction (Express, NestJS).
//!
//! The two grammars share the node kinds used here, so one extractor
//! serves both; TypeScript files ending in `.tsx` use the TSX grammar.
//!
//! Recognized constructs:
//! - `app.get('/path', handler)` and friends, `router.all(...)` (any method)
//! - `app.route('/path').get(handler).post(handler)`
//! - `@Controller('prefix')` classes with `@Get(':id')`, `@Post()`, ... methods

use std::path::Path;
use tree_sitter::{Node, Parser};

use super::parser::{method_from_name, named_children, node_text, string_literal_value};
use super::{DiscoveredEndpoint, EndpointExtractor, Framework, Language, ParseError};
use crate::routes::RouteTemplate;
use crate::types::{HttpMethod, SourceLocation};

/// Receivers that are HTTP clients rather than routers.
const CLIENT_OBJECTS: &[&str] = &[
    "axios",
    "http",
    "https",
    "fetch",
    "got",
    "ky",
    "superagent",
    "request",
    "client",
    "$http",
];

pub struct JavaScriptExtractor {
    language: Language,
    parser: Parser,
    /// TSX grammar, only for TypeScript
    tsx_parser: Option<Parser>,
}

impl std::fmt::Debug for JavaScriptExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JavaScriptExtractor")
            .field("language", &self.language)
            .finish()
    }
}

struct FileContext<'a> {
    code: &'a str,
    file: &'a Path,
}

/// How a route call spells its method.
enum RouteVerb {
    Method(HttpMethod),
    Any,
}

impl JavaScriptExtractor {
    pub fn javascript() -> Result<Self, ParseError> {
        Ok(Self {
            language: Language::JavaScript,
            parser: new_parser(Language::JavaScript, &tree_sitter_javascript::LANGUAGE.into())?,
            tsx_parser: None,
        })
    }

    pub fn typescript() -> Result<Self, ParseError> {
        Ok(Self {
            language: Language::TypeScript,
            parser: new_parser(
                Language::TypeScript,
                &tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            )?,
            tsx_parser: Some(new_parser(
                Language::TypeScript,
                &tree_sitter_typescript::LANGUAGE_TSX.into(),
            )?),
        })
    }

    fn visit(&self, node: Node, ctx: &FileContext, out: &mut Vec<DiscoveredEndpoint>) {
        match node.kind() {
            "call_expression" => self.extract_call(node, ctx, out),
            "class_declaration" | "class" | "abstract_class_declaration" => {
                self.extract_controller(node, ctx, out)
            }
            _ => {}
        }

        for child in named_children(node) {
            self.visit(child, ctx, out);
        }
    }

    /// `router.get('/x', handler)` or a `.route('/x').get(handler)` chain link.
    fn extract_call(&self, call: Node, ctx: &FileContext, out: &mut Vec<DiscoveredEndpoint>) {
        let Some(function) = call.child_by_field_name("function") else {
            return;
        };
        if function.kind() != "member_expression" {
            return;
        }
        let (Some(object), Some(property)) = (
            function.child_by_field_name("object"),
            function.child_by_field_name("property"),
        ) else {
            return;
        };
        let Some(verb) = route_verb(node_text(property, ctx.code)) else {
            return;
        };
        let args = call
            .child_by_field_name("arguments")
            .map(named_children)
            .unwrap_or_default();

        let location = SourceLocation::from_point(ctx.file, property.start_position());

        // app.route('/x').get(h)
        if let Some(path) = route_chain_path(object, ctx.code) {
            if !args.is_empty() {
                out.push(endpoint(path, verb, Framework::Express, location));
            }
            return;
        }

        if CLIENT_OBJECTS.contains(&node_text(object, ctx.code)) || args.len() < 2 {
            return;
        }
        let Some(path) = string_literal_value(args[0], ctx.code) else {
            return;
        };
        if !(path.starts_with('/') || path == "*") {
            return;
        }
        // Handlers are functions or references, never plain data
        let last = args[args.len() - 1];
        if matches!(
            last.kind(),
            "object" | "string" | "template_string" | "number" | "array"
        ) {
            return;
        }

        out.push(endpoint(path, verb, Framework::Express, location));
    }

    fn extract_controller(
        &self,
        class: Node,
        ctx: &FileContext,
        out: &mut Vec<DiscoveredEndpoint>,
    ) {
        let mut class_decorators = decorators_of(class);
        if let Some(parent) = class.parent().filter(|p| p.kind() == "export_statement") {
            class_decorators.extend(decorators_of(parent));
        }

        let Some(prefix) = class_decorators
            .iter()
            .find_map(|d| controller_prefix(*d, ctx.code))
        else {
            return;
        };
        let prefix = RouteTemplate::parse(&prefix);

        let Some(body) = class.child_by_field_name("body") else {
            return;
        };

        let mut pending: Vec<Node> = Vec::new();
        for member in named_children(body) {
            match member.kind() {
                "decorator" => pending.push(member),
                "method_definition" => {
                    let mut decorators = std::mem::take(&mut pending);
                    decorators.extend(decorators_of(member));
                    for decorator in decorators {
                        if let Some((verb, path)) = nest_route(decorator, ctx.code) {
                            let full = RouteTemplate::parse(&path).join(&prefix).to_string();
                            let location =
                                SourceLocation::from_point(ctx.file, decorator.start_position());
                            out.push(endpoint(full, verb, Framework::NestJs, location));
                        }
                    }
                }
                _ => pending.clear(),
            }
        }
    }
}

impl EndpointExtractor for JavaScriptExtractor {
    fn extract(&mut self, code: &str, file: &Path) -> Vec<DiscoveredEndpoint> {
        let is_tsx = file
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("tsx"));
        let parser = match (&mut self.tsx_parser, is_tsx) {
            (Some(tsx), true) => tsx,
            _ => &mut self.parser,
        };

        let Some(tree) = parser.parse(code, None) else {
            tracing::warn!(target: "parse", "Failed to parse {}", file.display());
            return Vec::new();
        };

        let ctx = FileContext { code, file };
        let mut endpoints = Vec::new();
        self.visit(tree.root_node(), &ctx, &mut endpoints);
        endpoints
    }

    fn language(&self) -> Language {
        self.language
    }
}

fn new_parser(language: Language, grammar: &tree_sitter::Language) -> Result<Parser, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(grammar)
        .map_err(|e| ParseError::ParserInit {
            language,
            reason: e.to_string(),
        })?;
    Ok(parser)
}

fn endpoint(
    path: String,
    verb: RouteVerb,
    framework: Framework,
    location: SourceLocation,
) -> DiscoveredEndpoint {
    let method = match verb {
        RouteVerb::Method(m) => Some(m),
        RouteVerb::Any => None,
    };
    DiscoveredEndpoint::new(path, method, framework, location)
}

/// Express router method names; `del` is the legacy alias of `delete`.
fn route_verb(name: &str) -> Option<RouteVerb> {
    match name {
        "all" => Some(RouteVerb::Any),
        "del" => Some(RouteVerb::Method(HttpMethod::Delete)),
        _ if name.chars().all(|c| c.is_ascii_lowercase()) => {
            method_from_name(name).map(RouteVerb::Method)
        }
        _ => None,
    }
}

/// Path of the `.route('/x')` call at the bottom of a method chain.
fn route_chain_path(object: Node, code: &str) -> Option<String> {
    if object.kind() != "call_expression" {
        return None;
    }
    let function = object.child_by_field_name("function")?;
    if function.kind() != "member_expression" {
        return None;
    }
    let property = node_text(function.child_by_field_name("property")?, code);

    if property == "route" {
        let args = named_children(object.child_by_field_name("arguments")?);
        return args.first().and_then(|a| string_literal_value(*a, code));
    }
    if route_verb(property).is_some() {
        return route_chain_path(function.child_by_field_name("object")?, code);
    }
    None
}

fn decorators_of(node: Node) -> Vec<Node> {
    named_children(node)
        .into_iter()
        .filter(|c| c.kind() == "decorator")
        .collect()
}

/// Decorator name and its call arguments: `@Get(':id')` -> ("Get", [':id']).
fn decorator_call<'a>(decorator: Node<'a>, code: &str) -> Option<(String, Vec<Node<'a>>)> {
    let expr = decorator.named_child(0)?;
    match expr.kind() {
        "identifier" => Some((node_text(expr, code).to_string(), Vec::new())),
        "call_expression" => {
            let function = expr.child_by_field_name("function")?;
            if function.kind() != "identifier" {
                return None;
            }
            let args = expr
                .child_by_field_name("arguments")
                .map(named_children)
                .unwrap_or_default();
            Some((node_text(function, code).to_string(), args))
        }
        _ => None,
    }
}

/// `@Controller()`, `@Controller('users')`, `@Controller({ path: 'users' })`
fn controller_prefix(decorator: Node, code: &str) -> Option<String> {
    let (name, args) = decorator_call(decorator, code)?;
    if name != "Controller" {
        return None;
    }
    let Some(first) = args.first() else {
        return Some(String::new());
    };
    if let Some(path) = string_literal_value(*first, code) {
        return Some(path);
    }
    if first.kind() == "object" {
        for pair in named_children(*first).into_iter().filter(|p| p.kind() == "pair") {
            let key = pair.child_by_field_name("key").map(|k| node_text(k, code));
            if matches!(key, Some("path") | Some("'path'") | Some("\"path\"")) {
                return pair
                    .child_by_field_name("value")
                    .and_then(|v| string_literal_value(v, code));
            }
        }
    }
    Some(String::new())
}

/// `@Get(':id')` -> (GET, ":id"), `@All()` -> (ANY, "")
fn nest_route(decorator: Node, code: &str) -> Option<(RouteVerb, String)> {
    let (name, args) = decorator_call(decorator, code)?;
    let verb = if name == "All" {
        RouteVerb::Any
    } else if name.starts_with(|c: char| c.is_ascii_uppercase()) {
        RouteVerb::Method(method_from_name(&name)?)
    } else {
        return None;
    };
    let path = match args.first() {
        Some(arg) => string_literal_value(*arg, code)?,
        None => String::new(),
    };
    Some((verb, path))
}
