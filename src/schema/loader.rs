//! OpenAPI 3.x and Swagger 2.0 loader.
//!
//! Documents are decoded into a `serde_json::Value` first and then walked
//! by hand, so partially valid or vendor-extended schemas still load.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info, warn};

use super::error::{SchemaError, SchemaResult};
use super::model::*;
use crate::routes::RouteTemplate;
use crate::types::HttpMethod;

impl SchemaFormat {
    /// Pick a decoder from the file extension.
    pub fn from_path(path: &Path) -> SchemaResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(SchemaError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Load and parse a schema file.
pub fn load_schema(path: &Path) -> SchemaResult<ApiSchema> {
    let format = SchemaFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_schema(&content, format, path)
}

/// Parse schema content already in memory. `source` is used for messages only.
pub fn parse_schema(content: &str, format: SchemaFormat, source: &Path) -> SchemaResult<ApiSchema> {
    info!(target: "schema", "Loading API schema from {}", source.display());

    let raw: Value = match format {
        SchemaFormat::Json => serde_json::from_str(content).map_err(|e| SchemaError::Json {
            path: source.to_path_buf(),
            source: e,
        })?,
        SchemaFormat::Yaml => serde_yml::from_str(content).map_err(|e| SchemaError::Yaml {
            path: source.to_path_buf(),
            message: e.to_string(),
        })?,
    };

    let root = raw.as_object().ok_or_else(|| SchemaError::NotAnObject {
        path: source.to_path_buf(),
    })?;

    let version = detect_version(root);
    if version == SpecVersion::Unknown {
        warn!(
            target: "schema",
            "Could not determine OpenAPI/Swagger version of {}",
            source.display()
        );
    }

    let (base_path, servers) = extract_servers(root, &version);

    let paths = match root.get("paths") {
        None => None,
        Some(Value::Object(paths)) => Some(parse_paths(paths, &raw)),
        Some(other) => {
            warn!(
                target: "schema",
                "'paths' is not a mapping (found {}), treating as empty",
                type_name(other)
            );
            Some(IndexMap::new())
        }
    };

    let security_schemes = parse_security_schemes(root, &version);
    let global_security = root.get("security").map(parse_security_requirements);

    let schema = ApiSchema {
        source: source.to_path_buf(),
        format,
        version,
        base_path,
        servers,
        paths,
        security_schemes,
        global_security,
    };

    debug!(
        target: "schema",
        "Parsed schema: {} paths, {} operations, {} security schemes",
        schema.paths.as_ref().map_or(0, |p| p.len()),
        schema.operation_count(),
        schema.security_schemes.len()
    );

    Ok(schema)
}

fn detect_version(root: &Map<String, Value>) -> SpecVersion {
    if let Some(v) = root.get("openapi").and_then(scalar_to_string) {
        if v.starts_with('3') {
            return SpecVersion::OpenApi3(v);
        }
        warn!(target: "schema", "Unrecognized OpenAPI version '{v}'");
        return SpecVersion::Unknown;
    }
    if let Some(v) = root.get("swagger").and_then(scalar_to_string) {
        return SpecVersion::Swagger2(v);
    }
    SpecVersion::Unknown
}

/// Base path and absolute server URLs.
fn extract_servers(
    root: &Map<String, Value>,
    version: &SpecVersion,
) -> (Option<RouteTemplate>, Vec<String>) {
    let mut servers = Vec::new();
    let base;

    if matches!(version, SpecVersion::Swagger2(_)) {
        let base_path = root.get("basePath").and_then(Value::as_str).unwrap_or("");
        base = non_root(RouteTemplate::parse(base_path));

        if let Some(host) = root.get("host").and_then(Value::as_str) {
            let schemes: Vec<&str> = root
                .get("schemes")
                .and_then(Value::as_array)
                .map(|s| s.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();
            for scheme in schemes {
                servers.push(format!("{scheme}://{host}{base_path}"));
            }
        }
    } else {
        for server in root
            .get("servers")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            if let Some(url) = server.get("url").and_then(Value::as_str) {
                servers.push(url.to_string());
            }
        }
        base = servers.first().and_then(|url| server_path(url));
    }

    (base, servers)
}

/// Path component of a server URL; relative URLs are used as-is.
fn server_path(server_url: &str) -> Option<RouteTemplate> {
    match url::Url::parse(server_url) {
        Ok(parsed) => non_root(RouteTemplate::parse(parsed.path())),
        Err(url::ParseError::RelativeUrlWithoutBase) if server_url.starts_with('/') => {
            non_root(RouteTemplate::parse(server_url))
        }
        Err(e) => {
            debug!(target: "schema", "Ignoring server URL '{server_url}': {e}");
            None
        }
    }
}

fn non_root(template: RouteTemplate) -> Option<RouteTemplate> {
    (!template.is_root()).then_some(template)
}

fn parse_paths(paths: &Map<String, Value>, root: &Value) -> IndexMap<String, PathItem> {
    let mut items = IndexMap::new();

    for (path, value) in paths {
        let mut item = PathItem {
            path: path.clone(),
            template: RouteTemplate::parse(path),
            operations: IndexMap::new(),
            parameters: Vec::new(),
            other_keys: Vec::new(),
        };

        let Some(entries) = value.as_object() else {
            warn!(target: "schema", "Path '{path}' is not a mapping");
            items.insert(path.clone(), item);
            continue;
        };

        for (key, entry) in entries {
            if let Some(method) = HttpMethod::from_schema_key(key) {
                item.operations.insert(method, parse_operation(entry, root));
            } else if key == "parameters" {
                item.parameters = parse_parameters(entry, root);
                item.other_keys.push(key.clone());
            } else {
                item.other_keys.push(key.clone());
            }
        }

        items.insert(path.clone(), item);
    }

    items
}

fn parse_operation(value: &Value, root: &Value) -> Operation {
    let Some(op) = value.as_object() else {
        return Operation::default();
    };

    Operation {
        operation_id: op
            .get("operationId")
            .and_then(Value::as_str)
            .map(str::to_string),
        security: op.get("security").map(parse_security_requirements),
        parameters: op
            .get("parameters")
            .map(|p| parse_parameters(p, root))
            .unwrap_or_default(),
    }
}

fn parse_parameters(value: &Value, root: &Value) -> Vec<Parameter> {
    let Some(list) = value.as_array() else {
        return Vec::new();
    };

    list.iter()
        .filter_map(|entry| {
            let resolved = resolve_local_ref(entry, root)?;
            let name = resolved.get("name").and_then(Value::as_str)?;
            let location_raw = resolved.get("in").and_then(Value::as_str)?;
            let Some(location) = ParameterLocation::from_openapi(location_raw) else {
                warn!(target: "schema", "Parameter '{name}' has unknown location '{location_raw}'");
                return None;
            };
            Some(Parameter {
                name: name.to_string(),
                location,
            })
        })
        .collect()
}

/// Follow a `#/...` reference one level deep.
fn resolve_local_ref<'a>(value: &'a Value, root: &'a Value) -> Option<&'a Value> {
    match value.get("$ref").and_then(Value::as_str) {
        Some(reference) => {
            let pointer = reference.strip_prefix('#')?;
            let target = root.pointer(pointer);
            if target.is_none() {
                warn!(target: "schema", "Unresolved reference '{reference}'");
            }
            target
        }
        None => Some(value),
    }
}

fn parse_security_requirements(value: &Value) -> Vec<SecurityRequirement> {
    value
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(Value::as_object)
                .map(|req| SecurityRequirement {
                    schemes: req
                        .iter()
                        .map(|(name, scopes)| {
                            let scopes = scopes
                                .as_array()
                                .map(|s| s.iter().filter_map(scalar_to_string).collect())
                                .unwrap_or_default();
                            (name.clone(), scopes)
                        })
                        .collect(),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_security_schemes(
    root: &Map<String, Value>,
    version: &SpecVersion,
) -> IndexMap<String, SecurityScheme> {
    let definitions = if matches!(version, SpecVersion::Swagger2(_)) {
        root.get("securityDefinitions")
    } else {
        root.get("components").and_then(|c| c.get("securitySchemes"))
    };

    let mut schemes = IndexMap::new();
    let Some(definitions) = definitions.and_then(Value::as_object) else {
        return schemes;
    };

    for (name, def) in definitions {
        let str_field = |field: &str| {
            def.get(field)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let kind = match def.get("type").and_then(Value::as_str) {
            Some("apiKey") => SecuritySchemeKind::ApiKey {
                location: str_field("in"),
                name: str_field("name"),
            },
            Some("http") => SecuritySchemeKind::Http {
                scheme: str_field("scheme").to_ascii_lowercase(),
            },
            Some("basic") => SecuritySchemeKind::Basic,
            Some("oauth2") => {
                let flows = match def.get("flows").and_then(Value::as_object) {
                    Some(flows) => flows.keys().cloned().collect(),
                    None => def
                        .get("flow")
                        .and_then(Value::as_str)
                        .map(|f| vec![f.to_string()])
                        .unwrap_or_default(),
                };
                SecuritySchemeKind::OAuth2 { flows }
            }
            Some("openIdConnect") => SecuritySchemeKind::OpenIdConnect {
                url: str_field("openIdConnectUrl"),
            },
            Some("mutualTLS") => SecuritySchemeKind::MutualTls,
            other => {
                warn!(target: "schema", "Security scheme '{name}' has unsupported type {other:?}");
                continue;
            }
        };

        schemes.insert(
            name.clone(),
            SecurityScheme {
                name: name.clone(),
                kind,
            },
        );
    }

    schemes
}

/// YAML happily turns `2.0` or `3.1` into numbers.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn yaml(content: &str) -> ApiSchema {
        parse_schema(content, SchemaFormat::Yaml, Path::new("openapi.yaml")).unwrap()
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(SchemaFormat::from_path(Path::new("a.yaml")).unwrap(), SchemaFormat::Yaml);
        assert_eq!(SchemaFormat::from_path(Path::new("a.YML")).unwrap(), SchemaFormat::Yaml);
        assert_eq!(SchemaFormat::from_path(Path::new("a.json")).unwrap(), SchemaFormat::Json);
        assert!(matches!(
            SchemaFormat::from_path(Path::new("a.txt")),
            Err(SchemaError::UnsupportedFormat { .. })
        ));
        assert!(SchemaFormat::from_path(Path::new("schema")).is_err());
    }

    #[test]
    fn test_parse_openapi3_paths_and_methods() {
        let schema = yaml(
            r#"
openapi: 3.0.3
servers:
  - url: https://api.example.com/v1
paths:
  /users:
    summary: Users
    get:
      operationId: listUsers
    post:
      security: []
  /items/{item_id}:
    parameters:
      - name: item_id
        in: path
        required: true
    get:
      summary: Get a specific item
"#,
        );

        assert_eq!(schema.version, SpecVersion::OpenApi3("3.0.3".to_string()));
        assert_eq!(schema.base_path.as_ref().unwrap().to_string(), "/v1");
        let paths = schema.paths.as_ref().unwrap();
        assert_eq!(paths.len(), 2);

        let users = &paths["/users"];
        assert_eq!(users.operations.len(), 2);
        assert_eq!(
            users.operations[&HttpMethod::Get].operation_id.as_deref(),
            Some("listUsers")
        );
        assert_eq!(users.operations[&HttpMethod::Post].security, Some(vec![]));
        assert_eq!(users.other_keys, vec!["summary"]);

        let item = &paths["/items/{item_id}"];
        assert_eq!(item.parameters.len(), 1);
        assert_eq!(item.parameters[0].location, ParameterLocation::Path);
        assert_eq!(schema.operation_count(), 3);
    }

    #[test]
    fn test_method_keys_are_case_sensitive() {
        let schema = yaml("openapi: 3.0.0\npaths:\n  /users:\n    GET: {}\n    post: {}\n");
        let users = &schema.paths.as_ref().unwrap()["/users"];

        assert_eq!(users.operations.keys().copied().collect::<Vec<_>>(), vec![HttpMethod::Post]);
        assert_eq!(users.other_keys, vec!["GET"]);
    }

    #[test]
    fn test_missing_paths_is_none() {
        let schema = yaml("openapi: 3.0.0\ninfo:\n  title: Empty\n");
        assert!(schema.paths.is_none());
        assert_eq!(schema.operation_count(), 0);
    }

    #[test]
    fn test_swagger2_json_with_refs_and_security() {
        let content = r##"{
            "swagger": "2.0",
            "host": "api.example.com",
            "basePath": "/api",
            "schemes": ["http", "https"],
            "securityDefinitions": {
                "basicAuth": {"type": "basic"},
                "key": {"type": "apiKey", "in": "header", "name": "X-Key"}
            },
            "security": [{"key": []}],
            "parameters": {
                "Id": {"name": "id", "in": "path", "required": true}
            },
            "paths": {
                "/things/{id}": {
                    "delete": {"parameters": [{"$ref": "#/parameters/Id"}]}
                }
            }
        }"##;
        let schema = parse_schema(content, SchemaFormat::Json, Path::new("swagger.json")).unwrap();

        assert_eq!(schema.version, SpecVersion::Swagger2("2.0".to_string()));
        assert_eq!(schema.base_path.as_ref().unwrap().to_string(), "/api");
        assert_eq!(
            schema.servers,
            vec!["http://api.example.com/api", "https://api.example.com/api"]
        );
        assert_eq!(schema.security_schemes["basicAuth"].kind, SecuritySchemeKind::Basic);
        assert_eq!(schema.global_security.as_ref().unwrap().len(), 1);

        let op = &schema.paths.as_ref().unwrap()["/things/{id}"].operations[&HttpMethod::Delete];
        assert_eq!(op.parameters[0].name, "id");
        assert!(schema.effective_security(op).is_some());
    }

    #[test]
    fn test_non_mapping_root_is_rejected() {
        let err = parse_schema("- a\n- b\n", SchemaFormat::Yaml, Path::new("x.yaml")).unwrap_err();
        assert!(matches!(err, SchemaError::NotAnObject { .. }));
    }

    #[test]
    fn test_malformed_json_reports_path() {
        let err = parse_schema("{", SchemaFormat::Json, Path::new("broken.json")).unwrap_err();
        match err {
            SchemaError::Json { path, .. } => assert_eq!(path, PathBuf::from("broken.json")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_schema(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, SchemaError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.yaml"));
    }
}
