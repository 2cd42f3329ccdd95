//! Security posture checks run against the schema alone.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use super::{Finding, RuleId, Severity};
use crate::schema::{
    ApiSchema, Operation, Parameter, ParameterLocation, PathItem, SecurityRequirement,
};
use crate::types::HttpMethod;

fn sensitive_param_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)password|passwd|token|secret|api_?key").ok())
        .as_ref()
}

const LOCAL_HOSTS: &[&str] = &["localhost", "127.0.0.1", "::1", "[::1]", "0.0.0.0"];

pub fn check(schema: &ApiSchema) -> Vec<Finding> {
    let mut findings = Vec::new();

    check_transport(schema, &mut findings);

    if let Some(global) = &schema.global_security {
        check_scheme_references(schema, global, None, None, &mut findings);
    }

    for item in schema.path_items() {
        for (method, operation) in &item.operations {
            check_operation(schema, item, *method, operation, &mut findings);
        }
    }

    findings
}

fn check_operation(
    schema: &ApiSchema,
    item: &PathItem,
    method: HttpMethod,
    operation: &Operation,
    findings: &mut Vec<Finding>,
) {
    let label = format!("{} {}", method, item.path);

    if method == HttpMethod::Trace {
        findings.push(
            Finding::new(
                RuleId::DangerousMethod,
                Severity::Warning,
                format!("Dangerous HTTP method TRACE defined for {}", item.path),
            )
            .at_path(&item.path)
            .with_method(Some(method)),
        );
    }

    if let Some(own) = &operation.security {
        check_scheme_references(schema, own, Some(item), Some(method), findings);
    }

    match schema.effective_security(operation) {
        None | Some([]) => {
            let severity = if method.is_mutating() {
                Severity::Warning
            } else {
                Severity::Info
            };
            findings.push(
                Finding::new(
                    RuleId::MissingAuthentication,
                    severity,
                    format!("Operation {label} has no authentication requirement"),
                )
                .at_path(&item.path)
                .with_method(Some(method)),
            );
        }
        Some(requirements) => {
            let basic = requirements
                .iter()
                .flat_map(|req| req.schemes.keys())
                .find(|name| {
                    schema
                        .security_schemes
                        .get(name.as_str())
                        .is_some_and(|scheme| scheme.kind.is_basic_auth())
                });
            if let Some(name) = basic {
                findings.push(
                    Finding::new(
                        RuleId::WeakAuthentication,
                        Severity::Warning,
                        format!("Operation {label} relies on HTTP basic authentication ('{name}')"),
                    )
                    .at_path(&item.path)
                    .with_method(Some(method)),
                );
            }
        }
    }

    let query_params = item
        .parameters
        .iter()
        .chain(operation.parameters.iter())
        .filter(|p| p.location == ParameterLocation::Query);
    let mut seen = HashSet::new();
    for param in query_params {
        if is_sensitive(param) && seen.insert(param.name.as_str()) {
            findings.push(
                Finding::new(
                    RuleId::SensitiveQueryParameter,
                    Severity::Warning,
                    format!(
                        "Sensitive parameter '{}' is exposed in the query string of {label}",
                        param.name
                    ),
                )
                .at_path(&item.path)
                .with_method(Some(method)),
            );
        }
    }
}

fn is_sensitive(param: &Parameter) -> bool {
    sensitive_param_pattern().is_some_and(|re| re.is_match(&param.name))
}

fn check_scheme_references(
    schema: &ApiSchema,
    requirements: &[SecurityRequirement],
    item: Option<&PathItem>,
    method: Option<HttpMethod>,
    findings: &mut Vec<Finding>,
) {
    for name in requirements.iter().flat_map(|req| req.schemes.keys()) {
        if schema.security_schemes.contains_key(name.as_str()) {
            continue;
        }
        let mut finding = match (item, method) {
            (Some(item), Some(method)) => Finding::new(
                RuleId::UndefinedSecurityScheme,
                Severity::Error,
                format!(
                    "Operation {method} {} references undefined security scheme '{name}'",
                    item.path
                ),
            )
            .at_path(&item.path),
            _ => Finding::new(
                RuleId::UndefinedSecurityScheme,
                Severity::Error,
                format!("Global security references undefined security scheme '{name}'"),
            ),
        };
        finding.method = method;
        findings.push(finding);
    }
}

fn check_transport(schema: &ApiSchema, findings: &mut Vec<Finding>) {
    for server in &schema.servers {
        let Ok(parsed) = url::Url::parse(server) else {
            continue;
        };
        if parsed.scheme() != "http" {
            continue;
        }
        let local = parsed
            .host_str()
            .is_some_and(|host| LOCAL_HOSTS.contains(&host) || host.ends_with(".localhost"));
        if !local {
            findings.push(Finding::new(
                RuleId::InsecureTransport,
                Severity::Warning,
                format!("Server '{server}' uses plain HTTP"),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SchemaFormat, parse_schema};
    use std::path::Path;

    fn check_yaml(content: &str) -> Vec<Finding> {
        let schema = parse_schema(content, SchemaFormat::Yaml, Path::new("openapi.yaml")).unwrap();
        check(&schema)
    }

    fn rules(findings: &[Finding]) -> Vec<(&'static str, Severity)> {
        findings.iter().map(|f| (f.rule.as_str(), f.severity)).collect()
    }

    #[test]
    fn test_missing_authentication_severity() {
        let findings = check_yaml(
            r#"
openapi: 3.0.0
paths:
  /items:
    get: {}
    post: {}
"#,
        );
        assert_eq!(
            rules(&findings),
            vec![
                ("missing-authentication", Severity::Info),
                ("missing-authentication", Severity::Warning),
            ]
        );
    }

    #[test]
    fn test_global_security_and_explicit_opt_out() {
        let findings = check_yaml(
            r#"
openapi: 3.0.0
components:
  securitySchemes:
    bearer:
      type: http
      scheme: bearer
security:
  - bearer: []
paths:
  /items:
    get: {}
    delete:
      security: []
"#,
        );
        assert_eq!(rules(&findings), vec![("missing-authentication", Severity::Warning)]);
        assert_eq!(findings[0].method, Some(HttpMethod::Delete));
    }

    #[test]
    fn test_basic_auth_and_undefined_scheme() {
        let findings = check_yaml(
            r#"
swagger: "2.0"
securityDefinitions:
  legacy:
    type: basic
paths:
  /login:
    post:
      security:
        - legacy: []
  /admin:
    get:
      security:
        - ghost: []
"#,
        );
        assert_eq!(
            rules(&findings),
            vec![
                ("weak-authentication", Severity::Warning),
                ("undefined-security-scheme", Severity::Error),
            ]
        );
        assert!(findings[1].message.contains("'ghost'"));
    }

    #[test]
    fn test_transport_query_params_and_trace() {
        let findings = check_yaml(
            r#"
openapi: 3.0.0
servers:
  - url: http://api.example.com/v1
  - url: http://localhost:8080
  - url: https://secure.example.com
components:
  securitySchemes:
    key:
      type: apiKey
      in: header
      name: X-Key
security:
  - key: []
paths:
  /search:
    parameters:
      - name: access_token
        in: query
    get:
      parameters:
        - name: q
          in: query
        - name: Password
          in: query
    trace: {}
"#,
        );
        assert_eq!(
            rules(&findings),
            vec![
                ("insecure-transport", Severity::Warning),
                ("sensitive-query-parameter", Severity::Warning),
                ("sensitive-query-parameter", Severity::Warning),
                ("dangerous-method", Severity::Warning),
                ("sensitive-query-parameter", Severity::Warning),
            ]
        );
        assert!(findings[0].message.contains("api.example.com"));
    }
}
