use crate::ImageSizes;
use guard_discover_core::{ScanConfig, ViolatableEntity, ViolationType};
use k8s_openapi::api::core::v1::{Container, PodSpec};
use tracing::trace;

/// Checks every container in `spec`, recording violations against `entity`.
///
/// Each check runs independently, so a single container may produce one
/// violation of every container type.
pub(crate) fn check_containers(
    config: &ScanConfig,
    sizes: &impl ImageSizes,
    namespace: &str,
    entity_type: &str,
    spec: &PodSpec,
    entity: &mut ViolatableEntity,
) {
    for container in &spec.containers {
        check_container(config, sizes, namespace, entity_type, container, entity);
    }
}

fn check_container(
    config: &ScanConfig,
    sizes: &impl ImageSizes,
    namespace: &str,
    entity_type: &str,
    container: &Container,
    entity: &mut ViolatableEntity,
) {
    let image = container.image.as_deref().unwrap_or_default();
    let mut record = |kind: ViolationType| {
        if config.is_not_ignored(namespace, entity_type, kind) {
            trace!(%namespace, %entity_type, container = %container.name, %image, %kind);
            entity.add_violation(image, kind);
        }
    };

    if !config.is_valid_image_repo(namespace, entity_type, image) {
        record(ViolationType::ImageRepo);
    }

    if let Some(size) = sizes.get(image) {
        if !config.image_size.contains(size) {
            record(ViolationType::ImageSize);
        }
    }

    if let Some(sc) = container.security_context.as_ref() {
        if sc.privileged == Some(true) {
            record(ViolationType::Privileged);
        }

        let adds_capabilities = sc
            .capabilities
            .as_ref()
            .and_then(|caps| caps.add.as_ref())
            .is_some_and(|add| !add.is_empty());
        if adds_capabilities {
            record(ViolationType::Capabilities);
        }
    }
}
