//! Route template normalization and matching.
//!
//! Web frameworks spell path parameters in many ways (`{id}`, `<int:id>`,
//! `:id`, `*rest`, ...). Everything is folded into a [`RouteTemplate`] so
//! routes found in code can be compared against OpenAPI path templates.

use serde::{Serialize, Serializer};
use std::fmt;

/// One `/`-separated piece of a route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Literal(String),
    Param(String),
    /// Catch-all matching one or more trailing segments.
    Wildcard(String),
}

impl Segment {
    fn parse(raw: &str) -> Option<Segment> {
        // Go 1.22 end-of-path anchor
        if raw == "{$}" {
            return None;
        }

        if let Some(inner) = raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            if let Some(name) = inner.strip_prefix('*') {
                return Some(Segment::Wildcard(name.to_string()));
            }
            if let Some(name) = inner.strip_suffix("...") {
                return Some(Segment::Wildcard(name.to_string()));
            }
            // gorilla/chi regex constraints: {id:[0-9]+}
            let name = inner.split(':').next().unwrap_or(inner).trim();
            return Some(Segment::Param(name.to_string()));
        }

        if let Some(inner) = raw.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
            // Rocket multi-segment: <path..>
            if let Some(name) = inner.strip_suffix("..") {
                return Some(Segment::Wildcard(name.to_string()));
            }
            return Some(match inner.split_once(':') {
                Some(("path", name)) => Segment::Wildcard(name.to_string()),
                Some((_, name)) => Segment::Param(name.to_string()),
                None => Segment::Param(inner.to_string()),
            });
        }

        if let Some(rest) = raw.strip_prefix(':') {
            // Express: :id?, :id(\d+)
            let name = rest.split('(').next().unwrap_or(rest).trim_end_matches('?');
            return Some(Segment::Param(name.to_string()));
        }

        if let Some(name) = raw.strip_prefix('*') {
            return Some(Segment::Wildcard(name.to_string()));
        }

        Some(Segment::Literal(raw.to_string()))
    }

    fn matches(&self, other: &Segment) -> bool {
        match (self, other) {
            (Segment::Literal(a), Segment::Literal(b)) => a == b,
            (Segment::Param(_), Segment::Param(_)) => true,
            _ => false,
        }
    }

    fn is_wildcard(&self) -> bool {
        matches!(self, Segment::Wildcard(_))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(s) => f.write_str(s),
            Segment::Param(name) => write!(f, "{{{name}}}"),
            Segment::Wildcard(name) => write!(f, "{{*{name}}}"),
        }
    }
}

/// A normalized HTTP route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RouteTemplate {
    segments: Vec<Segment>,
}

impl RouteTemplate {
    /// Normalize a route written in any supported framework syntax.
    ///
    /// Empty segments are dropped, which collapses duplicate slashes and
    /// removes trailing slashes.
    pub fn parse(raw: &str) -> Self {
        let segments = raw
            .trim()
            .split('/')
            .filter(|s| !s.is_empty())
            .filter_map(Segment::parse)
            .collect();
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Template with parameter names erased, usable as a lookup key.
    pub fn shape_key(&self) -> String {
        if self.segments.is_empty() {
            return "/".to_string();
        }
        let mut key = String::new();
        for segment in &self.segments {
            key.push('/');
            match segment {
                Segment::Literal(s) => key.push_str(s),
                Segment::Param(_) => key.push_str("{}"),
                Segment::Wildcard(_) => key.push_str("{*}"),
            }
        }
        key
    }

    /// Names of parameters and wildcards, in order.
    pub fn param_names(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Param(name) | Segment::Wildcard(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    pub fn has_wildcard(&self) -> bool {
        self.segments.iter().any(Segment::is_wildcard)
    }

    /// Structural comparison ignoring parameter names.
    ///
    /// A wildcard on either side absorbs one or more remaining segments.
    pub fn matches(&self, other: &RouteTemplate) -> bool {
        let (a, b) = (&self.segments, &other.segments);
        let mut i = 0;
        loop {
            match (a.get(i), b.get(i)) {
                (None, None) => return true,
                (Some(sa), Some(sb)) => {
                    if sa.is_wildcard() || sb.is_wildcard() {
                        return true;
                    }
                    if !sa.matches(sb) {
                        return false;
                    }
                }
                _ => return false,
            }
            i += 1;
        }
    }

    /// Remove a literal leading prefix, e.g. `/api` from `/api/users`.
    pub fn strip_prefix(&self, prefix: &RouteTemplate) -> Option<RouteTemplate> {
        if prefix.segments.len() > self.segments.len() {
            return None;
        }
        let head = &self.segments[..prefix.segments.len()];
        if head == prefix.segments.as_slice() {
            Some(RouteTemplate {
                segments: self.segments[prefix.segments.len()..].to_vec(),
            })
        } else {
            None
        }
    }

    /// Prepend `prefix` to this route.
    pub fn join(&self, prefix: &RouteTemplate) -> RouteTemplate {
        let mut segments = prefix.segments.clone();
        segments.extend(self.segments.iter().cloned());
        RouteTemplate { segments }
    }
}

impl fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl Serialize for RouteTemplate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_syntaxes_normalize() {
        let cases = [
            ("/items/{item_id}", "/items/{item_id}"),
            ("/items/<item_id>", "/items/{item_id}"),
            ("/items/<int:item_id>", "/items/{item_id}"),
            ("/items/:item_id", "/items/{item_id}"),
            ("/items/:item_id?", "/items/{item_id}"),
            ("/items/:item_id(\\d+)", "/items/{item_id}"),
            ("/items/{item_id:[0-9]+}", "/items/{item_id}"),
            ("/files/{*rest}", "/files/{*rest}"),
            ("/files/{rest...}", "/files/{*rest}"),
            ("/files/<path:rest>", "/files/{*rest}"),
            ("/files/<rest..>", "/files/{*rest}"),
            ("/files/*rest", "/files/{*rest}"),
        ];
        for (raw, expected) in cases {
            assert_eq!(RouteTemplate::parse(raw).to_string(), expected, "input: {raw}");
        }
    }

    #[test]
    fn test_slashes_are_collapsed() {
        assert_eq!(RouteTemplate::parse("").to_string(), "/");
        assert_eq!(RouteTemplate::parse("/").to_string(), "/");
        assert_eq!(RouteTemplate::parse("users/").to_string(), "/users");
        assert_eq!(RouteTemplate::parse("//users//list/").to_string(), "/users/list");
        assert_eq!(RouteTemplate::parse("/posts/{$}").to_string(), "/posts");
    }

    #[test]
    fn test_matching_ignores_param_names() {
        let code = RouteTemplate::parse("/items/<int:id>");
        let schema = RouteTemplate::parse("/items/{item_id}");
        assert!(code.matches(&schema));
        assert_eq!(code.shape_key(), schema.shape_key());
        assert_eq!(code.param_names(), vec!["id"]);
    }

    #[test]
    fn test_literal_does_not_match_param() {
        let code = RouteTemplate::parse("/users/me");
        let schema = RouteTemplate::parse("/users/{id}");
        assert!(!code.matches(&schema));
        assert!(!RouteTemplate::parse("/users").matches(&schema));
    }

    #[test]
    fn test_wildcard_absorbs_tail() {
        let code = RouteTemplate::parse("/static/*path");
        assert!(code.matches(&RouteTemplate::parse("/static/css/site.css")));
        assert!(code.matches(&RouteTemplate::parse("/static/{file}")));
        assert!(!code.matches(&RouteTemplate::parse("/static")));
        assert!(code.has_wildcard());
    }

    #[test]
    fn test_prefix_strip_and_join() {
        let route = RouteTemplate::parse("/api/v1/users/{id}");
        let prefix = RouteTemplate::parse("/api/v1");
        let stripped = route.strip_prefix(&prefix).unwrap();
        assert_eq!(stripped.to_string(), "/users/{id}");
        assert_eq!(stripped.join(&prefix), route);
        assert!(route.strip_prefix(&RouteTemplate::parse("/v2")).is_none());
    }
}
