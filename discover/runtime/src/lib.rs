#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use guard_discover_core as core;
pub use guard_discover_k8s_scan as scan;

mod args;
mod config;
mod discover;
mod metrics;
mod publish;

pub use self::{
    args::Args,
    config::FileConfig,
    discover::{Discover, Report, Snapshot},
    metrics::ScanMetrics,
    publish::{LogPublisher, MessageKind, Publish},
};
