use crate::{
    core::{Namespace, ScanConfig, Workload, WorkloadKind},
    metrics::ScanMetrics,
    publish::{MessageKind, Publish},
    scan::{ImageSizes, PodSpecSource, Scanner},
};
use anyhow::{Context, Result};
use k8s_openapi::api::{
    apps::v1::{DaemonSet, Deployment},
    batch::v1::{CronJob, Job},
    core::v1::{Namespace as K8sNamespace, Pod},
};
use kube::{api::ListParams, Api, Client, Resource};
use serde::{de::DeserializeOwned, Serialize};
use std::{fmt::Debug, sync::Arc};
use tokio::time;
use tracing::{debug, error, info, warn};

/// The cluster resources observed by a single scan.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub namespaces: Vec<K8sNamespace>,
    pub pods: Vec<Pod>,
    pub deployments: Vec<Deployment>,
    pub daemonsets: Vec<DaemonSet>,
    pub jobs: Vec<Job>,
    pub cronjobs: Vec<CronJob>,
}

/// The entities found to have violations by a single scan.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub namespaces: Vec<Namespace>,
    pub workloads: Vec<Workload>,
}

/// Periodically scans the cluster and publishes the entities with violations.
pub struct Discover<I, P> {
    scanner: Scanner<I>,
    publisher: P,
    topic: String,
    metrics: ScanMetrics,
}

// === impl Snapshot ===

impl Snapshot {
    pub async fn list(client: &Client) -> Result<Self> {
        let (namespaces, pods, deployments, daemonsets, jobs, cronjobs) = tokio::try_join!(
            list_all::<K8sNamespace>(client),
            list_all::<Pod>(client),
            list_all::<Deployment>(client),
            list_all::<DaemonSet>(client),
            list_all::<Job>(client),
            list_all::<CronJob>(client),
        )?;
        Ok(Self {
            namespaces,
            pods,
            deployments,
            daemonsets,
            jobs,
            cronjobs,
        })
    }
}

async fn list_all<K>(client: &Client) -> Result<Vec<K>>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug,
{
    let list = Api::<K>::all(client.clone())
        .list(&ListParams::default())
        .await
        .with_context(|| format!("failed to list {}", K::plural(&())))?;
    Ok(list.items)
}

// === impl Report ===

impl Report {
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty() && self.workloads.is_empty()
    }

    fn count(&self, kind: WorkloadKind) -> usize {
        self.workloads.iter().filter(|w| w.kind == kind).count()
    }
}

// === impl Discover ===

impl<I, P> Discover<I, P>
where
    I: ImageSizes,
    P: Publish,
{
    pub fn new(
        config: Arc<ScanConfig>,
        image_sizes: I,
        publisher: P,
        topic: impl Into<String>,
        metrics: ScanMetrics,
    ) -> Self {
        Self {
            scanner: Scanner::new(config, image_sizes),
            publisher,
            topic: topic.into(),
            metrics,
        }
    }

    /// Lists the cluster's resources and evaluates them.
    pub async fn scan(&self, client: &Client) -> Result<Report> {
        let start = time::Instant::now();
        let snapshot = Snapshot::list(client).await?;
        let report = self.evaluate(&snapshot);
        self.metrics.observe_duration(start.elapsed());
        Ok(report)
    }

    /// Evaluates a snapshot of cluster resources, updating scan metrics.
    pub fn evaluate(&self, snapshot: &Snapshot) -> Report {
        let namespaces = self.scanner.bad_namespaces(&snapshot.namespaces);

        let mut workloads = Vec::new();
        self.extend_bad(&mut workloads, &snapshot.pods);
        self.extend_bad(&mut workloads, &snapshot.deployments);
        self.extend_bad(&mut workloads, &snapshot.daemonsets);
        self.extend_bad(&mut workloads, &snapshot.jobs);
        self.extend_bad(&mut workloads, &snapshot.cronjobs);

        let report = Report {
            namespaces,
            workloads,
        };

        self.metrics
            .set_namespaces(snapshot.namespaces.len(), report.namespaces.len());
        for kind in [
            WorkloadKind::Pod,
            WorkloadKind::Deployment,
            WorkloadKind::DaemonSet,
            WorkloadKind::Job,
            WorkloadKind::CronJob,
        ] {
            self.metrics.set_bad_workloads(kind, report.count(kind));
        }

        info!(
            namespaces = snapshot.namespaces.len(),
            bad_namespaces = report.namespaces.len(),
            bad_workloads = report.workloads.len(),
            "Scanned cluster",
        );
        report
    }

    fn extend_bad<W: PodSpecSource>(&self, bad: &mut Vec<Workload>, workloads: &[W]) {
        bad.extend(self.scanner.bad_workloads(workloads));
    }

    /// Publishes every entity in the report.
    ///
    /// Failures are logged and do not prevent the remaining entities from being
    /// published.
    pub async fn publish(&self, report: &Report) {
        for ns in &report.namespaces {
            self.publish_one(MessageKind::Namespace, &ns.name, ns).await;
        }
        for workload in &report.workloads {
            self.publish_one(workload.kind.into(), &workload.name, workload)
                .await;
        }
    }

    async fn publish_one(&self, kind: MessageKind, name: &str, entity: &impl Serialize) {
        let payload = match serde_json::to_value(entity) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(%error, %kind, %name, "Failed to serialize message");
                return;
            }
        };

        debug!(%kind, %name, topic = %self.topic, "Publishing");
        if let Err(error) = self.publisher.publish(&self.topic, kind, &payload).await {
            warn!(%error, %kind, %name, "Failed to publish");
        }
    }

    /// Scans the cluster on every tick of `interval` until shutdown is
    /// signaled.
    ///
    /// A failed scan is logged and retried on the next tick.
    pub async fn run(self, client: Client, interval: time::Duration, drain: drain::Watch) {
        let mut timer = time::interval(interval);
        timer.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        let shutdown = drain.signaled();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = timer.tick() => {}
                _ = &mut shutdown => {
                    debug!("Shutdown signaled");
                    return;
                }
            }

            match self.scan(&client).await {
                Ok(report) => self.publish(&report).await,
                Err(error) => {
                    self.metrics.failure();
                    error!(error = ?error, "Scan failed");
                }
            }
        }
    }
}
