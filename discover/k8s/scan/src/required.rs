use guard_discover_core::{MatchMode, Namespace, Rule, ScanConfig, ViolationType};
use k8s_openapi::api::core::v1 as k8s;
use kube::ResourceExt;
use tracing::{debug, warn};

/// Synthesizes a namespace record for every required namespace that was not
/// discovered.
///
/// Required-entity rules have the form `scope:kind:name`; only rules whose kind
/// field matches `namespace` are considered. A discovered namespace's scope is
/// its `metadata.namespace` or, since namespaces are cluster-scoped, the
/// cluster name. Each unmet rule yields its own record, so duplicate rules
/// yield duplicate records.
pub(crate) fn missing_namespaces(
    config: &ScanConfig,
    namespaces: &[k8s::Namespace],
) -> Vec<Namespace> {
    let mut missing = Vec::new();

    for text in &config.required_entities {
        let Some(rule) = parse_required(text) else {
            continue;
        };
        if !rule.entity.matches(Namespace::ENTITY_TYPE, MatchMode::Exact) {
            continue;
        }
        let Some(name) = rule.value.as_literal() else {
            warn!(rule = %text, "Required entity names must be literals");
            continue;
        };

        let found = namespaces.iter().any(|ns| {
            let scope = ns
                .metadata
                .namespace
                .as_deref()
                .unwrap_or(&config.cluster_name);
            rule.matches(scope, Namespace::ENTITY_TYPE, &ns.name_any(), MatchMode::Exact)
        });
        if found {
            continue;
        }

        debug!(ns = %name, rule = %text, "Required namespace not found");
        if config.is_not_ignored(name, Namespace::ENTITY_TYPE, ViolationType::RequiredNamespaces) {
            let mut ns = Namespace::new(name, &config.cluster_name);
            ns.entity
                .add_violation(name, ViolationType::RequiredNamespaces);
            missing.push(ns);
        }
    }

    missing
}

fn parse_required(text: &str) -> Option<Rule> {
    if text.split(':').count() != 3 {
        warn!(rule = %text, "Required entity rules must have the form `scope:kind:name`");
        return None;
    }
    match text.parse() {
        Ok(rule) => Some(rule),
        Err(error) => {
            warn!(%error, "Skipping malformed required entity rule");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::mk_namespace;
    use maplit::btreemap;

    fn config(rules: &[&str]) -> ScanConfig {
        ScanConfig {
            cluster_name: "clusterX".to_string(),
            required_entities: rules.iter().map(|r| r.to_string()).collect(),
            ..Default::default()
        }
    }

    fn discovered(names: &[&str]) -> Vec<k8s::Namespace> {
        names
            .iter()
            .map(|name| mk_namespace(name, btreemap! {}, btreemap! {}))
            .collect()
    }

    #[test]
    fn synthesizes_missing_namespace() {
        let config = config(&["clusterX:namespace:team-ns"]);

        let missing = missing_namespaces(&config, &discovered(&["default", "kube-system"]));
        assert_eq!(missing.len(), 1);
        let ns = &missing[0];
        assert_eq!(ns.name, "team-ns");
        assert_eq!(ns.namespace, "team-ns");
        assert_eq!(ns.cluster, "clusterX");
        assert_eq!(ns.entity.len(), 1);
        assert_eq!(ns.entity.violations()[0].source, "team-ns");
        assert_eq!(ns.entity.violations()[0].kind, ViolationType::RequiredNamespaces);

        assert!(missing_namespaces(&config, &discovered(&["default", "team-ns"])).is_empty());
    }

    #[test]
    fn scope_must_match() {
        // Another cluster's namespace doesn't satisfy the rule.
        let config = config(&["clusterY:namespace:team-ns"]);
        let missing = missing_namespaces(&config, &discovered(&["team-ns"]));
        assert_eq!(missing.len(), 1);

        let config = self::config(&["*:namespace:team-ns"]);
        assert!(missing_namespaces(&config, &discovered(&["team-ns"])).is_empty());
    }

    #[test]
    fn negated_scope() {
        // Any scope other than clusterY satisfies the rule, including ours.
        let config = config(&["!clusterY:namespace:team-ns"]);
        assert!(missing_namespaces(&config, &discovered(&["team-ns"])).is_empty());

        // Our own scope is excluded, so a local team-ns doesn't count.
        let config = self::config(&["!clusterX:namespace:team-ns"]);
        let missing = missing_namespaces(&config, &discovered(&["team-ns"]));
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].name, "team-ns");
        assert_eq!(
            missing[0].entity.violations()[0].kind,
            ViolationType::RequiredNamespaces
        );
    }

    #[test]
    fn other_kinds_and_malformed_rules_are_skipped() {
        let config = config(&[
            "clusterX:deployment:web",
            "team-ns",
            "clusterX:namespace",
            "clusterX:namespace:!team-ns",
            "clusterX:namespace:*",
        ]);
        assert!(missing_namespaces(&config, &discovered(&[])).is_empty());
    }

    #[test]
    fn duplicate_rules_yield_duplicate_records() {
        let config = config(&["*:namespace:team-ns", "*:namespace:team-ns"]);
        let missing = missing_namespaces(&config, &discovered(&["default"]));
        assert_eq!(missing.len(), 2);
        assert_eq!(missing[0], missing[1]);
    }

    #[test]
    fn missing_namespace_may_be_ignored() {
        let mut config = config(&["*:namespace:team-ns", "*:namespace:infra"]);
        config.ignored_violations.insert(
            ViolationType::RequiredNamespaces,
            ["infra:namespace:*"].into_iter().collect(),
        );
        let missing = missing_namespaces(&config, &discovered(&[]));
        assert_eq!(
            missing.iter().map(|ns| ns.name.as_str()).collect::<Vec<_>>(),
            vec!["team-ns"]
        );
    }
}
