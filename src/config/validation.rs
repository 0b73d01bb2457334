//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Enforce the partition invariant: a type is governed by at most one rule
//! - Validate value ranges (durations are whole, non-negative seconds)
//! - Check that names are well-formed GraphQL names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before a descriptor is accepted into the system

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use url::Url;

use crate::config::schema::{Seconds, ServiceConfig};

/// A semantic violation found in a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("service name must not be empty")]
    EmptyServiceName,

    #[error("originUrl `{url}` is invalid: {reason}")]
    InvalidOriginUrl { url: String, reason: String },

    #[error("rules[{rule}] has no types")]
    EmptyRuleTypes { rule: usize },

    #[error("rules[{rule}].{field} must be a non-negative integer, got {value}")]
    InvalidDuration {
        rule: usize,
        field: DurationField,
        value: String,
    },

    #[error("type `{type_name}` is assigned by both rules[{first_rule}] and rules[{rule}]")]
    DuplicateTypeAssignment {
        type_name: String,
        first_rule: usize,
        rule: usize,
    },

    #[error("rules[{rule}] lists `{type_name}`, which is not a valid GraphQL type name")]
    InvalidTypeName { rule: usize, type_name: String },

    #[error("nonCacheable entry `{entry}` is neither `Type` nor `Type.field`")]
    InvalidNonCacheableEntry { entry: String },
}

/// Which duration of a rule a [`ValidationError::InvalidDuration`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationField {
    MaxAge,
    Swr,
}

impl std::fmt::Display for DurationField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DurationField::MaxAge => f.write_str("maxAge"),
            DurationField::Swr => f.write_str("swr"),
        }
    }
}

/// Validate a parsed descriptor, collecting every violation.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.name.trim().is_empty() {
        errors.push(ValidationError::EmptyServiceName);
    }

    if let Err(reason) = check_origin_url(&config.origin_url) {
        errors.push(ValidationError::InvalidOriginUrl {
            url: config.origin_url.clone(),
            reason,
        });
    }

    let mut seen = HashSet::new();
    for entry in &config.non_cacheable {
        if !is_valid_path(entry) {
            errors.push(ValidationError::InvalidNonCacheableEntry {
                entry: entry.clone(),
            });
        } else if !seen.insert(entry.as_str()) {
            tracing::warn!(entry = %entry, "nonCacheable entry listed more than once");
        }
    }

    // type name -> index of the first rule that claimed it
    let mut owners: HashMap<&str, usize> = HashMap::new();

    for (rule_idx, rule) in config.rules.iter().enumerate() {
        if rule.types.is_empty() {
            errors.push(ValidationError::EmptyRuleTypes { rule: rule_idx });
        }

        check_duration(rule_idx, DurationField::MaxAge, &rule.max_age, &mut errors);
        check_duration(rule_idx, DurationField::Swr, &rule.swr, &mut errors);

        let mut listed = HashSet::new();
        for type_name in &rule.types {
            if !listed.insert(type_name.as_str()) {
                tracing::warn!(
                    rule = rule_idx,
                    type_name = %type_name,
                    "type listed more than once in the same rule"
                );
                continue;
            }

            if !is_valid_name(type_name) {
                errors.push(ValidationError::InvalidTypeName {
                    rule: rule_idx,
                    type_name: type_name.clone(),
                });
                continue;
            }

            match owners.get(type_name.as_str()) {
                None => {
                    owners.insert(type_name, rule_idx);
                }
                Some(&first_rule) => {
                    errors.push(ValidationError::DuplicateTypeAssignment {
                        type_name: type_name.clone(),
                        first_rule,
                        rule: rule_idx,
                    });
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_duration(
    rule: usize,
    field: DurationField,
    value: &Seconds,
    errors: &mut Vec<ValidationError>,
) {
    if value.as_secs().is_none() {
        errors.push(ValidationError::InvalidDuration {
            rule,
            field,
            value: value.to_string(),
        });
    }
}

fn check_origin_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme `{}`", other)),
    }

    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }

    Ok(())
}

/// GraphQL `Name`: `[_A-Za-z][_0-9A-Za-z]*`.
pub(crate) fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// `Type` or `Type.field`.
pub(crate) fn is_valid_path(path: &str) -> bool {
    match path.split_once('.') {
        Some((type_name, field)) => is_valid_name(type_name) && is_valid_name(field),
        None => is_valid_name(path),
    }
}
