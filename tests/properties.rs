//! Property-based tests for validation and policy resolution.

use std::collections::HashSet;

use proptest::prelude::*;

use cache_policy::config::{
    validate_config, CacheRule, PartialQueryCaching, Seconds, ServiceConfig, ValidationError,
};
use cache_policy::policy::{CachePolicy, PolicyIndex, PolicyResolution};

fn type_name() -> impl Strategy<Value = String> {
    "[A-Z][a-zA-Z0-9]{0,8}"
}

fn config_from(rules: Vec<CacheRule>, non_cacheable: Vec<String>) -> ServiceConfig {
    ServiceConfig {
        name: "svc".into(),
        origin_url: "https://example.com/graphql".into(),
        partial_query_caching: PartialQueryCaching { enabled: true },
        non_cacheable,
        rules,
    }
}

/// Rules whose type sets are disjoint by construction.
fn partitioned_rules() -> impl Strategy<Value = Vec<CacheRule>> {
    prop::collection::hash_set(type_name(), 1..24)
        .prop_flat_map(|types| {
            let types: Vec<String> = types.into_iter().collect();
            let len = types.len();
            (
                Just(types),
                prop::collection::vec(0..4usize, len),
                prop::collection::vec((0..100_000u32, 0..100_000u32), 4),
            )
        })
        .prop_map(|(types, buckets, durations)| {
            let mut grouped: Vec<Vec<String>> = vec![Vec::new(); 4];
            for (type_name, bucket) in types.into_iter().zip(buckets) {
                grouped[bucket].push(type_name);
            }
            grouped
                .into_iter()
                .zip(durations)
                .filter(|(types, _)| !types.is_empty())
                .map(|(types, (max_age, swr))| CacheRule::new(types, max_age, swr, ""))
                .collect()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Every type of a partitioned rule set resolves to the rule that lists it.
    #[test]
    fn prop_partition_resolves_to_owner(rules in partitioned_rules()) {
        let config = config_from(rules.clone(), Vec::new());
        let index = PolicyIndex::compile(&config).unwrap();

        for (rule_idx, rule) in rules.iter().enumerate() {
            for type_name in &rule.types {
                match index.resolve(type_name) {
                    PolicyResolution::Cached(found) => {
                        prop_assert_eq!(found.rule, rule_idx);
                        prop_assert_eq!(Some(found.policy.max_age), rule.max_age.as_secs());
                        prop_assert_eq!(Some(found.policy.swr), rule.swr.as_secs());
                    }
                    other => prop_assert!(false, "{} resolved to {:?}", type_name, other),
                }
            }
        }
    }

    // Listing an already-governed type in another rule is always reported.
    #[test]
    fn prop_overlap_is_detected(rules in partitioned_rules(), pick in any::<prop::sample::Index>()) {
        let all: Vec<String> = rules.iter().flat_map(|r| r.types.clone()).collect();
        let stolen = pick.get(&all).clone();

        let mut rules = rules;
        rules.push(CacheRule::new([stolen.clone()], 1, 1, "overlap"));
        let errors = validate_config(&config_from(rules, Vec::new())).unwrap_err();

        let is_duplicate = |e: &ValidationError| {
            matches!(e, ValidationError::DuplicateTypeAssignment { type_name, .. } if *type_name == stolen)
        };
        prop_assert!(errors.iter().any(is_duplicate));
    }

    // nonCacheable wins over any rule, for the type and for its fields.
    #[test]
    fn prop_non_cacheable_takes_precedence(
        rules in partitioned_rules(),
        pick in any::<prop::sample::Index>(),
        field in "[a-z][a-zA-Z]{0,6}",
    ) {
        let all: Vec<String> = rules.iter().flat_map(|r| r.types.clone()).collect();
        let excluded = pick.get(&all).clone();

        let config = config_from(rules, vec![excluded.clone()]);
        let index = PolicyIndex::compile(&config).unwrap();

        let field_path = format!("{}.{}", excluded, field);
        prop_assert_eq!(index.resolve(&excluded), PolicyResolution::NonCacheable);
        prop_assert_eq!(index.resolve(&field_path), PolicyResolution::NonCacheable);
        prop_assert!(index.rule_for(&excluded).is_some());
    }

    // Types outside every rule never pick up a policy.
    #[test]
    fn prop_unlisted_types_are_unmatched(rules in partitioned_rules(), probe in "[a-z][a-z0-9]{0,8}") {
        let config = config_from(rules, Vec::new());
        let index = PolicyIndex::compile(&config).unwrap();

        // Rule types start upper-case, probes lower-case.
        prop_assert_eq!(index.resolve(&probe), PolicyResolution::Unmatched);
    }

    // Negative durations are always rejected, whichever field carries them.
    #[test]
    fn prop_negative_durations_rejected(secs in 1..1_000_000i64, on_swr in any::<bool>()) {
        let mut rule = CacheRule::new(["Post"], 60, 60, "");
        if on_swr {
            rule.swr = Seconds::Count(-secs);
        } else {
            rule.max_age = Seconds::Count(-secs);
        }

        let errors = validate_config(&config_from(vec![rule], Vec::new())).unwrap_err();
        prop_assert_eq!(errors.len(), 1);
        let is_invalid_duration = matches!(errors[0], ValidationError::InvalidDuration { rule: 0, .. });
        prop_assert!(is_invalid_duration);
    }

    // Export then re-parse reproduces the document.
    #[test]
    fn prop_json_round_trip(rules in partitioned_rules()) {
        let config = config_from(rules, vec!["Query.me".into()]);
        let doc = cache_policy::ConfigDocument { config };

        let json = serde_json::to_string(&doc).unwrap();
        let reparsed: cache_policy::ConfigDocument = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(reparsed, doc);
    }
}

#[test]
fn test_policy_is_per_rule() {
    let config = config_from(
        vec![
            CacheRule::new(["A"], 10, 20, ""),
            CacheRule::new(["B"], 30, 40, ""),
        ],
        Vec::new(),
    );
    let index = PolicyIndex::compile(&config).unwrap();

    let policies: HashSet<CachePolicy> = ["A", "B"]
        .iter()
        .filter_map(|t| index.resolve(t).policy())
        .collect();
    assert_eq!(policies.len(), 2);
}
