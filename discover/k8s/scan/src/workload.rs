use guard_discover_core::WorkloadKind;
use k8s_openapi::api::{
    apps::v1::{DaemonSet, Deployment},
    batch::v1::{CronJob, Job},
    core::v1::{Pod, PodSpec},
};
use kube::ResourceExt;

/// A resource that runs containers described by a pod spec.
pub trait PodSpecSource: ResourceExt {
    const KIND: WorkloadKind;

    fn pod_spec(&self) -> Option<&PodSpec>;
}

impl PodSpecSource for Pod {
    const KIND: WorkloadKind = WorkloadKind::Pod;

    fn pod_spec(&self) -> Option<&PodSpec> {
        self.spec.as_ref()
    }
}

impl PodSpecSource for Deployment {
    const KIND: WorkloadKind = WorkloadKind::Deployment;

    fn pod_spec(&self) -> Option<&PodSpec> {
        self.spec.as_ref()?.template.spec.as_ref()
    }
}

impl PodSpecSource for DaemonSet {
    const KIND: WorkloadKind = WorkloadKind::DaemonSet;

    fn pod_spec(&self) -> Option<&PodSpec> {
        self.spec.as_ref()?.template.spec.as_ref()
    }
}

impl PodSpecSource for Job {
    const KIND: WorkloadKind = WorkloadKind::Job;

    fn pod_spec(&self) -> Option<&PodSpec> {
        self.spec.as_ref()?.template.spec.as_ref()
    }
}

impl PodSpecSource for CronJob {
    const KIND: WorkloadKind = WorkloadKind::CronJob;

    fn pod_spec(&self) -> Option<&PodSpec> {
        self.spec
            .as_ref()?
            .job_template
            .spec
            .as_ref()?
            .template
            .spec
            .as_ref()
    }
}
