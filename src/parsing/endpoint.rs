//! Endpoints discovered in source code.

use serde::Serialize;
use std::fmt;

use crate::routes::RouteTemplate;
use crate::types::{HttpMethod, SourceLocation};

/// Web framework whose routing construct produced an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Framework {
    Flask,
    #[serde(rename = "fastapi")]
    FastApi,
    Express,
    #[serde(rename = "nestjs")]
    NestJs,
    Axum,
    Actix,
    NetHttp,
    Gorilla,
    Gin,
    Chi,
}

impl Framework {
    pub fn name(&self) -> &'static str {
        match self {
            Framework::Flask => "flask",
            Framework::FastApi => "fastapi",
            Framework::Express => "express",
            Framework::NestJs => "nestjs",
            Framework::Axum => "axum",
            Framework::Actix => "actix",
            Framework::NetHttp => "net/http",
            Framework::Gorilla => "gorilla/mux",
            Framework::Gin => "gin",
            Framework::Chi => "chi",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredEndpoint {
    /// Route exactly as written in source
    pub path: String,
    pub template: RouteTemplate,
    /// `None` when the route accepts any method
    pub method: Option<HttpMethod>,
    pub framework: Framework,
    pub location: SourceLocation,
}

impl DiscoveredEndpoint {
    pub fn new(
        path: impl Into<String>,
        method: Option<HttpMethod>,
        framework: Framework,
        location: SourceLocation,
    ) -> Self {
        let path = path.into();
        Self {
            template: RouteTemplate::parse(&path),
            path,
            method,
            framework,
            location,
        }
    }

    /// `GET`, `POST`, ... or `ANY`
    pub fn method_label(&self) -> String {
        self.method
            .map(|m| m.to_string())
            .unwrap_or_else(|| "ANY".to_string())
    }
}

impl fmt::Display for DiscoveredEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method_label(), self.template)
    }
}
