use guard_discover_core::{
    required_field_satisfied, Namespace, Requirement, RuleSet, ScanConfig, ViolatableEntity,
    ViolationType,
};
use k8s_openapi::api::core::v1 as k8s;
use kube::ResourceExt;
use std::collections::BTreeMap;
use tracing::warn;

/// Runs the namespace checks against a single discovered namespace.
pub(crate) fn check_namespace(config: &ScanConfig, ns: &k8s::Namespace) -> Namespace {
    let name = ns.name_any();
    let mut checked = Namespace::new(&name, &config.cluster_name);
    let annotations = ns.annotations();

    if !has_owner_annotation(annotations, &config.owner_annotations)
        && config.is_not_ignored(
            &name,
            Namespace::ENTITY_TYPE,
            ViolationType::NoOwnerAnnotation,
        )
    {
        let source = serde_json::to_string(annotations).unwrap_or_else(|error| {
            warn!(%error, ns = %name, "Failed to serialize annotations");
            String::new()
        });
        checked
            .entity
            .add_violation(source, ViolationType::NoOwnerAnnotation);
    }

    verify_required_fields(
        config,
        &name,
        annotations,
        &config.required_namespace_annotations,
        ViolationType::RequiredNamespaceAnnotations,
        &mut checked.entity,
    );
    verify_required_fields(
        config,
        &name,
        ns.labels(),
        &config.required_namespace_labels,
        ViolationType::RequiredNamespaceLabels,
        &mut checked.entity,
    );

    checked
}

/// Returns true if any of the owner annotations lists at least one owner.
///
/// When no owner annotations are configured, the check is disabled.
fn has_owner_annotation(annotations: &BTreeMap<String, String>, keys: &[String]) -> bool {
    if keys.is_empty() {
        return true;
    }

    keys.iter().any(|key| {
        annotations
            .get(key)
            .is_some_and(|owners| owners.split(',').any(|owner| !owner.trim().is_empty()))
    })
}

/// Records one violation for each required-field rule that the namespace does
/// not satisfy.
fn verify_required_fields(
    config: &ScanConfig,
    namespace: &str,
    fields: &BTreeMap<String, String>,
    rules: &RuleSet,
    kind: ViolationType,
    entity: &mut ViolatableEntity,
) {
    for rule in rules.iter() {
        match required_field_satisfied(namespace, Namespace::ENTITY_TYPE, fields, &[rule]) {
            Ok(Requirement::Satisfied { .. }) => {}
            Ok(Requirement::Unmet) => {
                if config.is_not_ignored(namespace, Namespace::ENTITY_TYPE, kind) {
                    entity.add_violation(rule, kind);
                }
            }
            Err(error) => warn!(%error, %kind, "Skipping malformed required-field rule"),
        }
    }
}
