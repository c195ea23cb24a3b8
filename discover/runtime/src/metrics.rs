use crate::core::WorkloadKind;
use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{counter::Counter, family::Family, gauge::Gauge, histogram::Histogram},
    registry::{Registry, Unit},
};
use tokio::time;

#[derive(Clone, Debug)]
pub struct ScanMetrics {
    namespaces: Gauge,
    bad_namespaces: Gauge,
    bad_workloads: Family<KindLabels, Gauge>,
    duration: Histogram,
    failures: Counter,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct KindLabels {
    kind: &'static str,
}

// === impl ScanMetrics ===

impl ScanMetrics {
    pub fn register(prom: &mut Registry) -> Self {
        let namespaces = Gauge::default();
        prom.register(
            "namespaces",
            "Number of namespaces seen by the last scan",
            namespaces.clone(),
        );

        let bad_namespaces = Gauge::default();
        prom.register(
            "bad_namespaces",
            "Number of namespaces with violations in the last scan",
            bad_namespaces.clone(),
        );

        let bad_workloads = Family::default();
        prom.register(
            "bad_workloads",
            "Number of workloads with violations in the last scan",
            bad_workloads.clone(),
        );

        // Listing every workload in a large cluster may take a while.
        let duration = Histogram::new([0.1, 1.0, 10.0, 60.0, 300.0]);
        prom.register_with_unit(
            "scan_duration",
            "Time taken by a scan, including listing cluster resources",
            Unit::Seconds,
            duration.clone(),
        );

        let failures = Counter::default();
        prom.register(
            "scan_failures",
            "Count of scans that failed to list cluster resources",
            failures.clone(),
        );

        Self {
            namespaces,
            bad_namespaces,
            bad_workloads,
            duration,
            failures,
        }
    }

    pub(crate) fn set_namespaces(&self, total: usize, bad: usize) {
        self.namespaces.set(total as i64);
        self.bad_namespaces.set(bad as i64);
    }

    pub(crate) fn set_bad_workloads(&self, kind: WorkloadKind, bad: usize) {
        self.bad_workloads
            .get_or_create(&KindLabels {
                kind: kind.as_str(),
            })
            .set(bad as i64);
    }

    pub(crate) fn observe_duration(&self, elapsed: time::Duration) {
        self.duration.observe(elapsed.as_secs_f64());
    }

    pub(crate) fn failure(&self) {
        self.failures.inc();
    }
}
