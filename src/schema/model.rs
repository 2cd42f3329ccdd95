//! In-memory view of an OpenAPI 3.x / Swagger 2.0 document.
//!
//! Only the parts the validator inspects are modelled: paths, operations,
//! parameters, servers and security.

use indexmap::IndexMap;
use serde::Serialize;
use std::path::PathBuf;

use crate::routes::RouteTemplate;
use crate::types::HttpMethod;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaFormat {
    Json,
    Yaml,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "version", rename_all = "snake_case")]
pub enum SpecVersion {
    OpenApi3(String),
    Swagger2(String),
    Unknown,
}

#[derive(Debug, Clone)]
pub struct ApiSchema {
    pub source: PathBuf,
    pub format: SchemaFormat,
    pub version: SpecVersion,
    /// Path every documented route is served under (`basePath` or server URL path).
    pub base_path: Option<RouteTemplate>,
    pub servers: Vec<String>,
    /// `None` when the document has no `paths` key at all.
    pub paths: Option<IndexMap<String, PathItem>>,
    pub security_schemes: IndexMap<String, SecurityScheme>,
    pub global_security: Option<Vec<SecurityRequirement>>,
}

impl ApiSchema {
    /// Iterate path items, empty when `paths` is missing.
    pub fn path_items(&self) -> impl Iterator<Item = &PathItem> {
        self.paths.iter().flat_map(|paths| paths.values())
    }

    pub fn operation_count(&self) -> usize {
        self.path_items().map(|item| item.operations.len()).sum()
    }

    /// Security that applies to `operation`: its own block, else the global one.
    pub fn effective_security<'a>(
        &'a self,
        operation: &'a Operation,
    ) -> Option<&'a [SecurityRequirement]> {
        operation
            .security
            .as_deref()
            .or(self.global_security.as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct PathItem {
    pub path: String,
    pub template: RouteTemplate,
    pub operations: IndexMap<HttpMethod, Operation>,
    pub parameters: Vec<Parameter>,
    /// Keys that are not HTTP methods (`summary`, `parameters`, `x-*`, ...).
    pub other_keys: Vec<String>,
}

impl PathItem {
    pub fn has_standard_method(&self) -> bool {
        self.operations.keys().any(HttpMethod::is_standard)
    }

    /// Path parameters declared at path level or on `operation`.
    pub fn declared_path_params<'a>(
        &'a self,
        operation: &'a Operation,
    ) -> impl Iterator<Item = &'a str> {
        self.parameters
            .iter()
            .chain(operation.parameters.iter())
            .filter(|p| p.location == ParameterLocation::Path)
            .map(|p| p.name.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Operation {
    pub operation_id: Option<String>,
    /// `None` inherits global security; `Some(vec![])` opts out explicitly.
    pub security: Option<Vec<SecurityRequirement>>,
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub location: ParameterLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
    Body,
    FormData,
}

impl ParameterLocation {
    pub fn from_openapi(value: &str) -> Option<Self> {
        match value {
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            "path" => Some(Self::Path),
            "cookie" => Some(Self::Cookie),
            "body" => Some(Self::Body),
            "formData" => Some(Self::FormData),
            _ => None,
        }
    }
}

/// One alternative of a security block; all listed schemes apply together.
///
/// An empty requirement (`{}`) marks authentication as optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityRequirement {
    pub schemes: IndexMap<String, Vec<String>>,
}

impl SecurityRequirement {
    pub fn is_anonymous(&self) -> bool {
        self.schemes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityScheme {
    pub name: String,
    pub kind: SecuritySchemeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecuritySchemeKind {
    ApiKey { location: String, name: String },
    Http { scheme: String },
    /// Swagger 2.0 `type: basic`.
    Basic,
    OAuth2 { flows: Vec<String> },
    OpenIdConnect { url: String },
    MutualTls,
}

impl SecuritySchemeKind {
    pub fn is_basic_auth(&self) -> bool {
        match self {
            Self::Basic => true,
            Self::Http { scheme } => scheme.eq_ignore_ascii_case("basic"),
            _ => false,
        }
    }
}
