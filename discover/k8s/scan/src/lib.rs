//! Cluster scanning
//!
//! A [`Scanner`] turns the cluster objects listed during a scan into violation
//! records:
//!
//! - Each `Namespace` must carry an owner annotation and satisfy the configured
//!   required-annotation and required-label rules.
//! - Each required namespace must exist; a record is synthesized for every one
//!   that doesn't.
//! - Each container in a `Pod`, `Deployment`, `DaemonSet`, `Job`, or `CronJob`
//!   is checked for an approved image repository, an image size within bounds,
//!   privileged mode, and added capabilities.
//!
//! ```text
//! [ Namespace ] -> owner annotation, required annotations/labels
//! [ Namespace* ] -> required namespaces
//! [ Workload ] -> [ PodSpec ] -> [ Container ] -> repo, size, privileged, capabilities
//! ```
//!
//! A scanner holds an immutable configuration snapshot and a read-only image
//! size cache. Every entity is evaluated on its own, so the results of one
//! entity never depend on another (other than for required namespaces, which
//! are reconciled against the whole namespace list). Only entities with at
//! least one violation are returned.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod container;
mod image_size;
mod namespace;
mod required;
mod workload;

#[cfg(test)]
mod tests;

pub use self::{
    image_size::{ImageSizes, SharedImageSizes},
    workload::PodSpecSource,
};
use guard_discover_core::{Namespace, ScanConfig, ViolatableEntity, Workload};
use k8s_openapi::api::core::v1 as k8s;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Evaluates cluster objects against a configuration snapshot.
#[derive(Clone, Debug)]
pub struct Scanner<I> {
    config: Arc<ScanConfig>,
    image_sizes: I,
}

// === impl Scanner ===

impl<I: ImageSizes> Scanner<I> {
    pub fn new(config: Arc<ScanConfig>, image_sizes: I) -> Self {
        Self {
            config,
            image_sizes,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Returns the namespaces that have violations.
    ///
    /// Records for missing required namespaces come first, followed by the
    /// discovered namespaces in the order they were listed. Ignored namespaces
    /// are not checked.
    #[instrument(skip_all, fields(namespaces = namespaces.len()))]
    pub fn bad_namespaces(&self, namespaces: &[k8s::Namespace]) -> Vec<Namespace> {
        let mut bad = required::missing_namespaces(&self.config, namespaces);

        for ns in namespaces {
            let name = kube::ResourceExt::name_any(ns);
            if self.config.is_ignored_namespace(&name) {
                continue;
            }

            let checked = namespace::check_namespace(&self.config, ns);
            if !checked.entity.is_empty() {
                debug!(ns = %name, violations = checked.entity.len(), "Bad namespace");
                bad.push(checked);
            }
        }

        bad
    }

    /// Returns the workloads of a single kind that have violations.
    ///
    /// Workloads in ignored namespaces are not checked.
    #[instrument(skip_all, fields(kind = %W::KIND, workloads = workloads.len()))]
    pub fn bad_workloads<W: PodSpecSource>(&self, workloads: &[W]) -> Vec<Workload> {
        workloads
            .iter()
            .filter_map(|w| {
                let workload = self.check_workload(w)?;
                if workload.entity.is_empty() {
                    return None;
                }
                debug!(
                    ns = %workload.namespace,
                    name = %workload.name,
                    violations = workload.entity.len(),
                    "Bad workload",
                );
                Some(workload)
            })
            .collect()
    }

    /// Runs the container checks against a single workload, unless it is in an
    /// ignored namespace.
    pub fn check_workload<W: PodSpecSource>(&self, workload: &W) -> Option<Workload> {
        let namespace = workload.namespace().unwrap_or_default();
        if self.config.is_ignored_namespace(&namespace) {
            return None;
        }

        let mut entity = ViolatableEntity::default();
        if let Some(spec) = workload.pod_spec() {
            container::check_containers(
                &self.config,
                &self.image_sizes,
                &namespace,
                W::KIND.as_str(),
                spec,
                &mut entity,
            );
        }

        Some(Workload {
            name: workload.name_any(),
            namespace,
            cluster: self.config.cluster_name.clone(),
            kind: W::KIND,
            entity,
        })
    }
}
