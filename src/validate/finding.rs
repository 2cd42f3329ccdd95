use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{HttpMethod, SourceLocation};

/// Finding severity. Ordered so that `Error > Warning > Info`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleId {
    SchemaMissingPaths,
    NoValidMethods,
    UndocumentedEndpoint,
    UndocumentedMethod,
    UnimplementedOperation,
    PathParameterMismatch,
    UndeclaredPathParameter,
    DuplicateEndpoint,
    MissingAuthentication,
    WeakAuthentication,
    UndefinedSecurityScheme,
    InsecureTransport,
    SensitiveQueryParameter,
    DangerousMethod,
}

impl RuleId {
    pub const ALL: [RuleId; 14] = [
        RuleId::SchemaMissingPaths,
        RuleId::NoValidMethods,
        RuleId::UndocumentedEndpoint,
        RuleId::UndocumentedMethod,
        RuleId::UnimplementedOperation,
        RuleId::PathParameterMismatch,
        RuleId::UndeclaredPathParameter,
        RuleId::DuplicateEndpoint,
        RuleId::MissingAuthentication,
        RuleId::WeakAuthentication,
        RuleId::UndefinedSecurityScheme,
        RuleId::InsecureTransport,
        RuleId::SensitiveQueryParameter,
        RuleId::DangerousMethod,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::SchemaMissingPaths => "schema-missing-paths",
            RuleId::NoValidMethods => "no-valid-methods",
            RuleId::UndocumentedEndpoint => "undocumented-endpoint",
            RuleId::UndocumentedMethod => "undocumented-method",
            RuleId::UnimplementedOperation => "unimplemented-operation",
            RuleId::PathParameterMismatch => "path-parameter-mismatch",
            RuleId::UndeclaredPathParameter => "undeclared-path-parameter",
            RuleId::DuplicateEndpoint => "duplicate-endpoint",
            RuleId::MissingAuthentication => "missing-authentication",
            RuleId::WeakAuthentication => "weak-authentication",
            RuleId::UndefinedSecurityScheme => "undefined-security-scheme",
            RuleId::InsecureTransport => "insecure-transport",
            RuleId::SensitiveQueryParameter => "sensitive-query-parameter",
            RuleId::DangerousMethod => "dangerous-method",
        }
    }

    /// Rules that inspect only the schema's security posture.
    pub fn is_security(&self) -> bool {
        matches!(
            self,
            RuleId::MissingAuthentication
                | RuleId::WeakAuthentication
                | RuleId::UndefinedSecurityScheme
                | RuleId::InsecureTransport
                | RuleId::SensitiveQueryParameter
                | RuleId::DangerousMethod
        )
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub rule: RuleId,
    pub severity: Severity,
    pub message: String,
    /// Schema or code path the finding is about
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl Finding {
    pub fn new(rule: RuleId, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule,
            severity,
            message: message.into(),
            path: None,
            method: None,
            location: None,
        }
    }

    pub fn at_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_method(mut self, method: Option<HttpMethod>) -> Self {
        self.method = method;
        self
    }

    pub fn located(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.rule, self.message)
    }
}
