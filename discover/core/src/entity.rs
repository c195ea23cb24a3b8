use crate::violation::ViolatableEntity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A namespace as reported by a scan.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Namespace {
    pub name: String,

    /// Always the namespace's own name, so that every reported entity carries
    /// a namespace.
    pub namespace: String,

    pub cluster: String,

    #[serde(flatten)]
    pub entity: ViolatableEntity,
}

/// A pod-spec-bearing resource as reported by a scan.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Workload {
    pub name: String,
    pub namespace: String,
    pub cluster: String,
    pub kind: WorkloadKind,

    #[serde(flatten)]
    pub entity: ViolatableEntity,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadKind {
    Pod,
    Deployment,
    DaemonSet,
    Job,
    CronJob,
}

// === impl Namespace ===

impl Namespace {
    /// The entity type that rules use to refer to namespaces.
    pub const ENTITY_TYPE: &'static str = "namespace";

    pub fn new(name: impl Into<String>, cluster: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            namespace: name.clone(),
            name,
            cluster: cluster.into(),
            entity: ViolatableEntity::default(),
        }
    }
}

// === impl WorkloadKind ===

impl WorkloadKind {
    /// Returns the entity type that rules use to refer to this kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pod => "pod",
            Self::Deployment => "deployment",
            Self::DaemonSet => "daemonset",
            Self::Job => "job",
            Self::CronJob => "cronjob",
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}
