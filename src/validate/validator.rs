//! Cross-checks endpoints discovered in code against the schema inventory.

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

use super::{Finding, RuleId, Severity, security};
use crate::config::ValidationConfig;
use crate::parsing::DiscoveredEndpoint;
use crate::routes::RouteTemplate;
use crate::schema::{ApiSchema, PathItem};
use crate::types::HttpMethod;

pub struct Validator<'a> {
    schema: &'a ApiSchema,
    config: &'a ValidationConfig,
    strip_prefixes: Vec<RouteTemplate>,
}

/// A schema path an endpoint resolved to, and the form of the endpoint
/// route that matched it.
struct Resolution<'s> {
    item: &'s PathItem,
    matched: RouteTemplate,
    compared: RouteTemplate,
}

impl<'a> Validator<'a> {
    pub fn new(schema: &'a ApiSchema, config: &'a ValidationConfig) -> Self {
        let strip_prefixes = config
            .strip_prefixes
            .iter()
            .map(|p| RouteTemplate::parse(p))
            .filter(|p| !p.is_root())
            .collect();
        Self {
            schema,
            config,
            strip_prefixes,
        }
    }

    /// Run every enabled rule. Findings come back sorted by severity (errors
    /// first), then by source location, then by path.
    pub fn validate(&self, endpoints: &[DiscoveredEndpoint]) -> Vec<Finding> {
        let mut findings = Vec::new();

        match &self.schema.paths {
            None => {
                tracing::warn!(
                    target: "validate",
                    "No 'paths' defined in the schema. Cannot validate endpoints."
                );
                findings.push(Finding::new(
                    RuleId::SchemaMissingPaths,
                    Severity::Error,
                    "No paths defined in schema",
                ));
            }
            Some(paths) => {
                self.check_schema_paths(paths, &mut findings);
                self.check_endpoints(paths, endpoints, &mut findings);
                check_duplicates(endpoints, &mut findings);
            }
        }

        if self.config.security_checks {
            findings.extend(security::check(self.schema));
        }

        findings.retain(|f| {
            let disabled = self.config.disabled_rules.iter().any(|r| r == f.rule.as_str());
            let unimplemented_off =
                f.rule == RuleId::UnimplementedOperation && !self.config.report_unimplemented;
            !disabled && !unimplemented_off
        });

        findings.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| a.location.is_none().cmp(&b.location.is_none()))
                .then_with(|| a.location.cmp(&b.location))
                .then_with(|| a.path.cmp(&b.path))
        });
        findings
    }

    fn check_schema_paths(&self, paths: &IndexMap<String, PathItem>, findings: &mut Vec<Finding>) {
        for item in paths.values() {
            if !item.has_standard_method() {
                findings.push(
                    Finding::new(
                        RuleId::NoValidMethods,
                        Severity::Error,
                        format!(
                            "Endpoint '{}' in schema does not define valid HTTP methods.",
                            item.path
                        ),
                    )
                    .at_path(&item.path),
                );
            }

            for (method, operation) in &item.operations {
                let declared: HashSet<&str> = item.declared_path_params(operation).collect();
                for name in item.template.param_names() {
                    if !declared.contains(name) {
                        findings.push(
                            Finding::new(
                                RuleId::UndeclaredPathParameter,
                                Severity::Warning,
                                format!(
                                    "Path parameter '{name}' of {method} {} has no 'in: path' declaration",
                                    item.path
                                ),
                            )
                            .at_path(&item.path)
                            .with_method(Some(*method)),
                        );
                    }
                }
            }
        }
    }

    fn check_endpoints(
        &self,
        paths: &IndexMap<String, PathItem>,
        endpoints: &[DiscoveredEndpoint],
        findings: &mut Vec<Finding>,
    ) {
        let mut implemented: HashSet<(&str, HttpMethod)> = HashSet::new();

        for endpoint in endpoints {
            let resolutions = self.resolve(paths, endpoint);
            let location = endpoint.location.clone();

            if resolutions.is_empty() {
                findings.push(
                    Finding::new(
                        RuleId::UndocumentedEndpoint,
                        Severity::Error,
                        format!(
                            "Endpoint '{}' (defined in {}) not found in schema.",
                            endpoint.path,
                            endpoint.location.file.display()
                        ),
                    )
                    .at_path(&endpoint.path)
                    .with_method(endpoint.method)
                    .located(location),
                );
                continue;
            }

            let chosen = match endpoint.method {
                None => {
                    for r in &resolutions {
                        for method in r.item.operations.keys() {
                            implemented.insert((r.item.path.as_str(), *method));
                        }
                    }
                    &resolutions[0]
                }
                Some(method) => {
                    let with_method: Vec<&Resolution> = resolutions
                        .iter()
                        .filter(|r| r.item.operations.contains_key(&method))
                        .collect();
                    let Some(first) = with_method.first() else {
                        findings.push(
                            Finding::new(
                                RuleId::UndocumentedMethod,
                                Severity::Error,
                                format!(
                                    "Endpoint '{}' (defined in {}) is documented in the schema, but not for method {method}.",
                                    endpoint.path,
                                    endpoint.location.file.display()
                                ),
                            )
                            .at_path(&resolutions[0].item.path)
                            .with_method(Some(method))
                            .located(location),
                        );
                        continue;
                    };
                    for r in &with_method {
                        implemented.insert((r.item.path.as_str(), method));
                    }
                    *first
                }
            };

            tracing::debug!(
                target: "validate",
                "Endpoint '{}' found in schema as '{}'.",
                endpoint.path,
                chosen.item.path
            );

            let code_names = chosen.matched.param_names();
            let schema_names = chosen.compared.param_names();
            let comparable = !chosen.matched.has_wildcard() && !chosen.compared.has_wildcard();
            if comparable && code_names != schema_names {
                findings.push(
                    Finding::new(
                        RuleId::PathParameterMismatch,
                        Severity::Warning,
                        format!(
                            "Endpoint '{}' names its path parameters [{}] but the schema path '{}' uses [{}]",
                            endpoint.path,
                            code_names.join(", "),
                            chosen.item.path,
                            schema_names.join(", ")
                        ),
                    )
                    .at_path(&chosen.item.path)
                    .with_method(endpoint.method)
                    .located(location),
                );
            }
        }

        for item in paths.values() {
            for method in item.operations.keys() {
                if !implemented.contains(&(item.path.as_str(), *method)) {
                    findings.push(
                        Finding::new(
                            RuleId::UnimplementedOperation,
                            Severity::Warning,
                            format!(
                                "Operation {method} {} is documented in the schema but not implemented",
                                item.path
                            ),
                        )
                        .at_path(&item.path)
                        .with_method(Some(*method)),
                    );
                }
            }
        }
    }

    /// Schema paths an endpoint matches, most shared literals first.
    fn resolve<'s>(
        &self,
        paths: &'s IndexMap<String, PathItem>,
        endpoint: &DiscoveredEndpoint,
    ) -> Vec<Resolution<'s>> {
        let mut candidates = vec![endpoint.template.clone()];
        for prefix in &self.strip_prefixes {
            if let Some(stripped) = endpoint.template.strip_prefix(prefix) {
                candidates.push(stripped);
            }
        }

        let mut resolutions: Vec<Resolution<'s>> = Vec::new();
        for item in paths.values() {
            let mut targets = vec![item.template.clone()];
            if let Some(base) = &self.schema.base_path {
                targets.push(item.template.join(base));
            }

            let hit = candidates.iter().find_map(|candidate| {
                targets
                    .iter()
                    .find(|target| candidate.matches(target))
                    .map(|target| (candidate.clone(), target.clone()))
            });
            if let Some((matched, compared)) = hit {
                resolutions.push(Resolution {
                    item,
                    matched,
                    compared,
                });
            }
        }

        // a wildcard route can span several schema paths; prefer the closest
        resolutions.sort_by_key(|r| std::cmp::Reverse(literal_agreement(&r.matched, &r.compared)));
        resolutions
    }
}

/// Number of segments where both routes carry the same literal.
fn literal_agreement(code: &RouteTemplate, schema: &RouteTemplate) -> usize {
    code.segments()
        .iter()
        .zip(schema.segments())
        .filter(|(a, b)| matches!(a, crate::routes::Segment::Literal(_)) && a == b)
        .count()
}

fn check_duplicates(endpoints: &[DiscoveredEndpoint], findings: &mut Vec<Finding>) {
    let mut first_seen: HashMap<(String, Option<HttpMethod>), &DiscoveredEndpoint> = HashMap::new();

    for endpoint in endpoints {
        let key = (endpoint.template.shape_key(), endpoint.method);
        match first_seen.get(&key) {
            Some(original) => findings.push(
                Finding::new(
                    RuleId::DuplicateEndpoint,
                    Severity::Warning,
                    format!(
                        "Endpoint '{endpoint}' is defined more than once (first at {})",
                        original.location
                    ),
                )
                .at_path(&endpoint.path)
                .with_method(endpoint.method)
                .located(endpoint.location.clone()),
            ),
            None => {
                first_seen.insert(key, endpoint);
            }
        }
    }
}
