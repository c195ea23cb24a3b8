use crate::{config::FileConfig, discover::Discover, metrics::ScanMetrics, publish::LogPublisher};
use anyhow::{bail, Context, Result};
use clap::Parser;
use prometheus_client::registry::Registry;
use std::{path::PathBuf, sync::Arc};
use tokio::time::Duration;
use tracing::{info, info_span, Instrument};

#[derive(Debug, Parser)]
#[clap(
    name = "discover",
    about = "Reports Kubernetes resources that violate cluster policy"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "guard_discover=info,warn",
        env = "GUARD_DISCOVER_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    /// Path to the YAML policy configuration.
    ///
    /// When unset, every check runs with its default settings.
    #[clap(long, env = "GUARD_DISCOVER_CONFIG")]
    config: Option<PathBuf>,

    /// Seconds between scans.
    #[clap(long, default_value = "300")]
    scan_interval_secs: u64,

    /// Runs a single scan, prints its report as JSON, and exits.
    #[clap(long)]
    once: bool,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            log_level,
            log_format,
            client,
            admin,
            config,
            scan_interval_secs,
            once,
        } = self;

        let config = match config {
            Some(path) => FileConfig::load(&path)?,
            None => FileConfig::default(),
        };
        let image_sizes = config.image_size_cache();
        let FileConfig { scan, topic, .. } = config;
        let scan = Arc::new(scan);

        let mut prom = <Registry>::default();
        let metrics = ScanMetrics::register(prom.sub_registry_with_prefix("discover"));

        if once {
            log_format
                .try_init(log_level)
                .context("failed to configure logging")?;
            let client = client
                .try_client()
                .await
                .context("failed to build Kubernetes client")?;
            let discover = Discover::new(scan, image_sizes, LogPublisher::default(), topic, metrics);
            let report = discover.scan(&client).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        let rt_metrics = kubert::RuntimeMetrics::register(prom.sub_registry_with_prefix("kube"));

        let runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_metrics(rt_metrics)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .build()
            .await?;

        info!(
            cluster = %scan.cluster_name,
            interval = ?Duration::from_secs(scan_interval_secs),
            %topic,
            "Starting scans",
        );
        let discover = Discover::new(scan, image_sizes, LogPublisher::default(), topic, metrics);
        tokio::spawn(
            discover
                .run(
                    runtime.client(),
                    Duration::from_secs(scan_interval_secs),
                    runtime.shutdown_handle(),
                )
                .instrument(info_span!("scan")),
        );

        // Block the main thread on the shutdown signal. Once it fires, wait for
        // the scan loop to complete before exiting.
        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}
