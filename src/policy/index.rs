//! Type → policy lookup.
//!
//! # Responsibilities
//! - Invert the rule list into a type name → rule map
//! - Hold the non-cacheable set, checked before any rule
//! - Return the governing policy or an explicit no-match
//!
//! # Design Decisions
//! - Compiled once from a validated config, immutable afterwards
//! - O(1) lookups via HashMap/HashSet
//! - Explicit Unmatched rather than a silent default

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Freshness and stale-while-revalidate window for cached responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CachePolicy {
    /// Seconds a cached response is fresh.
    pub max_age: u64,
    /// Seconds a stale response may still be served while revalidating.
    pub swr: u64,
}

impl CachePolicy {
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age)
    }

    pub fn stale_while_revalidate(&self) -> Duration {
        Duration::from_secs(self.swr)
    }

    /// Render as a `Cache-Control` header value.
    pub fn cache_control(&self) -> String {
        if self.swr == 0 {
            format!("public, max-age={}", self.max_age)
        } else {
            format!(
                "public, max-age={}, stale-while-revalidate={}",
                self.max_age, self.swr
            )
        }
    }
}

/// A compiled rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulePolicy {
    /// Position of the rule in the descriptor's `rules`.
    pub rule: usize,
    pub policy: CachePolicy,
    pub description: String,
}

/// Outcome of a policy lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyResolution<'a> {
    /// Listed in `nonCacheable`, directly or through its owning type.
    NonCacheable,
    /// Governed by a rule.
    Cached(&'a RulePolicy),
    /// No explicit policy; the platform default applies.
    Unmatched,
}

impl<'a> PolicyResolution<'a> {
    pub fn policy(&self) -> Option<CachePolicy> {
        match self {
            PolicyResolution::Cached(rule) => Some(rule.policy),
            _ => None,
        }
    }

    pub fn is_cacheable(&self) -> bool {
        matches!(self, PolicyResolution::Cached(_))
    }
}

impl fmt::Display for PolicyResolution<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyResolution::NonCacheable => f.write_str("not cacheable"),
            PolicyResolution::Cached(rule) => write!(
                f,
                "maxAge={}s swr={}s (rules[{}])",
                rule.policy.max_age, rule.policy.swr, rule.rule
            ),
            PolicyResolution::Unmatched => f.write_str("no explicit policy"),
        }
    }
}

/// Immutable lookup table compiled from a [`ServiceConfig`].
#[derive(Debug, Clone)]
pub struct PolicyIndex {
    rules: Vec<RulePolicy>,
    by_type: HashMap<String, usize>,
    non_cacheable: HashSet<String>,
}

impl PolicyIndex {
    /// Validate `config` and compile its lookup table.
    pub fn compile(config: &ServiceConfig) -> Result<Self, Vec<ValidationError>> {
        validate_config(config)?;

        let mut index = PolicyIndex {
            rules: Vec::with_capacity(config.rules.len()),
            by_type: HashMap::new(),
            non_cacheable: config.non_cacheable.iter().cloned().collect(),
        };

        for (rule_idx, rule) in config.rules.iter().enumerate() {
            // Durations were checked by validate_config.
            index.rules.push(RulePolicy {
                rule: rule_idx,
                policy: CachePolicy {
                    max_age: rule.max_age.as_secs().unwrap_or_default(),
                    swr: rule.swr.as_secs().unwrap_or_default(),
                },
                description: rule.description.clone(),
            });

            for type_name in &rule.types {
                index.by_type.insert(type_name.clone(), rule_idx);
            }
        }

        tracing::debug!(
            rules = index.rules.len(),
            types = index.by_type.len(),
            non_cacheable = index.non_cacheable.len(),
            "Policy index compiled"
        );

        Ok(index)
    }

    /// Resolve a bare type name or a `Type.field` path.
    pub fn resolve(&self, path: &str) -> PolicyResolution<'_> {
        if self.non_cacheable.contains(path) {
            return PolicyResolution::NonCacheable;
        }

        let type_name = match path.split_once('.') {
            Some((type_name, _field)) => {
                if self.non_cacheable.contains(type_name) {
                    return PolicyResolution::NonCacheable;
                }
                type_name
            }
            None => path,
        };

        match self.rule_for(type_name) {
            Some(rule) => PolicyResolution::Cached(rule),
            None => PolicyResolution::Unmatched,
        }
    }

    /// The rule governing `type_name`, ignoring `nonCacheable`.
    pub fn rule_for(&self, type_name: &str) -> Option<&RulePolicy> {
        self.by_type.get(type_name).map(|&idx| &self.rules[idx])
    }

    pub fn is_non_cacheable(&self, path: &str) -> bool {
        matches!(self.resolve(path), PolicyResolution::NonCacheable)
    }

    pub fn rules(&self) -> &[RulePolicy] {
        &self.rules
    }

    /// All type names governed by some rule, in no particular order.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.by_type.keys().map(String::as_str)
    }
}
