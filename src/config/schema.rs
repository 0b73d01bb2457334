//! Configuration schema definitions.
//!
//! This module defines the wire shape of a cache policy descriptor, exactly as
//! it is handed to the edge caching platform. All types derive Serde traits and
//! use the platform's camelCase keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Root of a descriptor document: `{ "config": { ... } }`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigDocument {
    pub config: ServiceConfig,
}

/// Cache policy for one GraphQL service fronted by the edge cache.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ServiceConfig {
    /// Logical service identifier on the caching platform.
    pub name: String,

    /// Upstream GraphQL endpoint being fronted.
    pub origin_url: String,

    /// Caching of sub-portions of a response.
    #[serde(default)]
    pub partial_query_caching: PartialQueryCaching,

    /// `Type.field` paths or bare type names that are never cached.
    #[serde(default)]
    pub non_cacheable: Vec<String>,

    /// Cache buckets, in declaration order.
    pub rules: Vec<CacheRule>,
}

/// Partial query caching toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PartialQueryCaching {
    pub enabled: bool,
}

/// A bucket of GraphQL types sharing one max-age / SWR pair.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CacheRule {
    /// Type names governed by this rule. A type may appear in at most one rule.
    pub types: Vec<String>,

    /// Seconds a response is served from cache before revalidation.
    pub max_age: Seconds,

    /// Seconds a stale response may be served while revalidating in the background.
    pub swr: Seconds,

    /// Human-readable rationale. Not consumed by the platform.
    #[serde(default)]
    pub description: String,
}

impl CacheRule {
    pub fn new<I, S>(types: I, max_age: u32, swr: u32, description: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
            max_age: Seconds::from(max_age),
            swr: Seconds::from(swr),
            description: description.into(),
        }
    }
}

/// A duration as written in the document.
///
/// Anything that does not fit an `i64` is kept verbatim so validation can
/// report it and serialization reproduces it unchanged.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Seconds {
    Count(i64),
    Other(serde_json::Value),
}

impl Seconds {
    /// The duration in seconds, or `None` if it is negative or non-numeric.
    pub fn as_secs(&self) -> Option<u64> {
        match self {
            Seconds::Count(n) => u64::try_from(*n).ok(),
            // integers above i64::MAX land here
            Seconds::Other(value) => value.as_u64(),
        }
    }
}

impl From<u32> for Seconds {
    fn from(secs: u32) -> Self {
        Seconds::Count(i64::from(secs))
    }
}

impl fmt::Display for Seconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seconds::Count(n) => write!(f, "{}", n),
            Seconds::Other(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_keys() {
        let doc = ConfigDocument {
            config: ServiceConfig {
                name: "svc".into(),
                origin_url: "https://example.com/graphql".into(),
                partial_query_caching: PartialQueryCaching { enabled: true },
                non_cacheable: vec!["Query.me".into()],
                rules: vec![CacheRule::new(["User"], 60, 120, "users")],
            },
        };

        let value = serde_json::to_value(&doc).unwrap();
        let config = &value["config"];
        assert_eq!(config["originUrl"], "https://example.com/graphql");
        assert_eq!(config["partialQueryCaching"]["enabled"], true);
        assert_eq!(config["nonCacheable"][0], "Query.me");
        assert_eq!(config["rules"][0]["maxAge"], 60);
        assert_eq!(config["rules"][0]["swr"], 120);
    }

    #[test]
    fn test_optional_fields_default() {
        let json = r#"{
            "config": {
                "name": "svc",
                "originUrl": "https://example.com/graphql",
                "rules": [{ "types": ["User"], "maxAge": 1, "swr": 2 }]
            }
        }"#;

        let doc: ConfigDocument = serde_json::from_str(json).unwrap();
        assert!(!doc.config.partial_query_caching.enabled);
        assert!(doc.config.non_cacheable.is_empty());
        assert_eq!(doc.config.rules[0].description, "");
    }

    #[test]
    fn test_seconds_keeps_invalid_values() {
        let negative: Seconds = serde_json::from_str("-5").unwrap();
        assert_eq!(negative, Seconds::Count(-5));
        assert_eq!(negative.as_secs(), None);

        let text: Seconds = serde_json::from_str(r#""300""#).unwrap();
        assert_eq!(text, Seconds::Other(serde_json::Value::from("300")));
        assert_eq!(text.as_secs(), None);
        assert_eq!(serde_json::to_string(&text).unwrap(), r#""300""#);

        let valid: Seconds = serde_json::from_str("300").unwrap();
        assert_eq!(valid.as_secs(), Some(300));
    }

    #[test]
    fn test_seconds_above_i64_range() {
        let huge: Seconds = serde_json::from_str("10000000000000000000").unwrap();
        assert_eq!(huge.as_secs(), Some(10_000_000_000_000_000_000));
        assert_eq!(huge.to_string(), "10000000000000000000");

        let fractional: Seconds = serde_json::from_str("1.5").unwrap();
        assert_eq!(fractional.as_secs(), None);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let json = r#"{
            "config": {
                "name": "svc",
                "originUrl": "https://example.com/graphql",
                "rules": [{ "types": ["User"], "maxage": 1, "swr": 2 }]
            }
        }"#;

        assert!(serde_json::from_str::<ConfigDocument>(json).is_err());
    }
}
