use crate::{Scanner, SharedImageSizes};
use guard_discover_core::{ScanConfig, ViolationType, WorkloadKind};
use k8s_openapi::{
    api::{
        apps::v1::{DaemonSet, DaemonSetSpec, Deployment, DeploymentSpec},
        batch::v1::{CronJob, CronJobSpec, Job, JobSpec, JobTemplateSpec},
        core::v1::{self as k8s, Container, PodSpec, PodTemplateSpec, SecurityContext},
    },
    apimachinery::pkg::apis::meta::v1::ObjectMeta,
};
use maplit::*;
use std::{collections::BTreeMap, sync::Arc};

pub(crate) fn mk_namespace(
    name: &str,
    annotations: BTreeMap<&str, &str>,
    labels: BTreeMap<&str, &str>,
) -> k8s::Namespace {
    fn to_owned(map: BTreeMap<&str, &str>) -> Option<BTreeMap<String, String>> {
        if map.is_empty() {
            return None;
        }
        Some(
            map.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    k8s::Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            annotations: to_owned(annotations),
            labels: to_owned(labels),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn mk_meta(ns: &str, name: &str) -> ObjectMeta {
    ObjectMeta {
        namespace: Some(ns.to_string()),
        name: Some(name.to_string()),
        ..Default::default()
    }
}

fn mk_pod_spec(image: &str, privileged: bool) -> PodSpec {
    PodSpec {
        containers: vec![Container {
            name: "main".to_string(),
            image: Some(image.to_string()),
            security_context: Some(SecurityContext {
                privileged: Some(privileged),
                ..Default::default()
            }),
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn mk_template(image: &str, privileged: bool) -> PodTemplateSpec {
    PodTemplateSpec {
        metadata: None,
        spec: Some(mk_pod_spec(image, privileged)),
    }
}

fn mk_pod(ns: &str, name: &str, image: &str, privileged: bool) -> k8s::Pod {
    k8s::Pod {
        metadata: mk_meta(ns, name),
        spec: Some(mk_pod_spec(image, privileged)),
        ..Default::default()
    }
}

fn mk_deployment(ns: &str, name: &str, image: &str, privileged: bool) -> Deployment {
    Deployment {
        metadata: mk_meta(ns, name),
        spec: Some(DeploymentSpec {
            template: mk_template(image, privileged),
            ..Default::default()
        }),
        ..Default::default()
    }
}

struct TestConfig {
    scanner: Scanner<SharedImageSizes>,
    sizes: SharedImageSizes,
    _tracing: tracing::subscriber::DefaultGuard,
}

// === impl TestConfig ===

impl TestConfig {
    fn new(config: ScanConfig) -> Self {
        let _tracing = Self::init_tracing();
        let sizes = SharedImageSizes::default();
        let scanner = Scanner::new(Arc::new(config), sizes.clone());
        Self {
            scanner,
            sizes,
            _tracing,
        }
    }

    fn init_tracing() -> tracing::subscriber::DefaultGuard {
        tracing::subscriber::set_default(
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_max_level(tracing::Level::TRACE)
                .finish(),
        )
    }
}

fn base_config() -> ScanConfig {
    ScanConfig {
        cluster_name: "test-cluster".to_string(),
        ignored_namespaces: ["kube-system".to_string()].into_iter().collect(),
        required_entities: vec!["*:namespace:team-ns".to_string()],
        owner_annotations: vec!["team/email".to_string()],
        valid_repos: ["registry.example.com/"].into_iter().collect(),
        ..Default::default()
    }
}

#[test]
fn missing_namespaces_come_first() {
    let test = TestConfig::new(base_config());
    let namespaces = vec![
        mk_namespace("default", btreemap! {}, btreemap! {}),
        mk_namespace(
            "payments",
            btreemap! { "team/email" => "pay@example.com" },
            btreemap! {},
        ),
        mk_namespace("kube-system", btreemap! {}, btreemap! {}),
    ];

    let bad = test.scanner.bad_namespaces(&namespaces);
    let summary = bad
        .iter()
        .map(|ns| (ns.name.as_str(), ns.entity.violations()[0].kind))
        .collect::<Vec<_>>();
    assert_eq!(
        summary,
        vec![
            ("team-ns", ViolationType::RequiredNamespaces),
            ("default", ViolationType::NoOwnerAnnotation),
        ]
    );
    assert!(bad.iter().all(|ns| ns.cluster == "test-cluster"));
}

#[test]
fn ignored_namespaces_still_satisfy_requirements() {
    let mut config = base_config();
    config.required_entities = vec!["*:namespace:kube-system".to_string()];
    let test = TestConfig::new(config);

    let namespaces = vec![mk_namespace("kube-system", btreemap! {}, btreemap! {})];
    assert!(test.scanner.bad_namespaces(&namespaces).is_empty());
}

#[test]
fn compliant_namespaces_are_not_reported() {
    let test = TestConfig::new(ScanConfig::default());
    let namespaces = vec![
        mk_namespace("a", btreemap! {}, btreemap! {}),
        mk_namespace("b", btreemap! {}, btreemap! {}),
    ];
    assert!(test.scanner.bad_namespaces(&namespaces).is_empty());
}

#[test]
fn bad_pods() {
    let test = TestConfig::new(base_config());
    let pods = vec![
        mk_pod("default", "good", "registry.example.com/app:1", false),
        mk_pod("default", "bad", "docker.io/nginx", true),
        mk_pod("kube-system", "skipped", "docker.io/nginx", true),
    ];

    let bad = test.scanner.bad_workloads(&pods);
    assert_eq!(bad.len(), 1);
    let pod = &bad[0];
    assert_eq!(pod.name, "bad");
    assert_eq!(pod.namespace, "default");
    assert_eq!(pod.cluster, "test-cluster");
    assert_eq!(pod.kind, WorkloadKind::Pod);
    assert_eq!(pod.entity.count(ViolationType::ImageRepo), 1);
    assert_eq!(pod.entity.count(ViolationType::Privileged), 1);
    assert_eq!(pod.entity.len(), 2);
}

#[test]
fn every_workload_kind_is_checked() {
    let test = TestConfig::new(base_config());
    let image = "docker.io/nginx";

    let deployments = vec![mk_deployment("web", "deploy", image, false)];
    let daemonsets = vec![DaemonSet {
        metadata: mk_meta("web", "ds"),
        spec: Some(DaemonSetSpec {
            template: mk_template(image, false),
            ..Default::default()
        }),
        ..Default::default()
    }];
    let jobs = vec![Job {
        metadata: mk_meta("web", "job"),
        spec: Some(JobSpec {
            template: mk_template(image, false),
            ..Default::default()
        }),
        ..Default::default()
    }];
    let cronjobs = vec![CronJob {
        metadata: mk_meta("web", "cron"),
        spec: Some(CronJobSpec {
            schedule: "*/5 * * * *".to_string(),
            job_template: JobTemplateSpec {
                metadata: None,
                spec: Some(JobSpec {
                    template: mk_template(image, false),
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }];

    let kinds = [
        test.scanner.bad_workloads(&deployments),
        test.scanner.bad_workloads(&daemonsets),
        test.scanner.bad_workloads(&jobs),
        test.scanner.bad_workloads(&cronjobs),
    ]
    .into_iter()
    .flatten()
    .map(|w| (w.kind, w.name))
    .collect::<Vec<_>>();
    assert_eq!(
        kinds,
        vec![
            (WorkloadKind::Deployment, "deploy".to_string()),
            (WorkloadKind::DaemonSet, "ds".to_string()),
            (WorkloadKind::Job, "job".to_string()),
            (WorkloadKind::CronJob, "cron".to_string()),
        ]
    );
}

#[test]
fn workload_without_spec_is_clean() {
    let test = TestConfig::new(base_config());
    let deployment = Deployment {
        metadata: mk_meta("web", "empty"),
        ..Default::default()
    };
    let checked = test
        .scanner
        .check_workload(&deployment)
        .expect("namespace must not be ignored");
    assert!(checked.entity.is_empty());
    assert!(test
        .scanner
        .bad_workloads(std::slice::from_ref(&deployment))
        .is_empty());
}

#[test]
fn image_sizes_are_read_at_scan_time() {
    let config = ScanConfig {
        image_size: guard_discover_core::ImageSizeBounds { min: 0, max: 1000 },
        ..Default::default()
    };
    let test = TestConfig::new(config);
    let pods = vec![mk_pod("default", "big", "registry.example.com/big:1", false)];

    // Unknown sizes are not violations.
    assert!(test.scanner.bad_workloads(&pods).is_empty());

    test.sizes.insert("registry.example.com/big:1", 5000);
    let bad = test.scanner.bad_workloads(&pods);
    assert_eq!(bad.len(), 1);
    assert_eq!(
        bad[0].entity.violations()[0].kind,
        ViolationType::ImageSize
    );
    assert_eq!(
        bad[0].entity.violations()[0].source,
        "registry.example.com/big:1"
    );
}
