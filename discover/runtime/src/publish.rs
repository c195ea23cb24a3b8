use crate::core::WorkloadKind;
use anyhow::Result;
use serde::Serialize;
use std::fmt;
use tracing::info;

/// Identifies the kind of entity carried by a published message.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum MessageKind {
    #[serde(rename = "NAMESPACE_MESSAGE")]
    Namespace,
    #[serde(rename = "POD_MESSAGE")]
    Pod,
    #[serde(rename = "DEPLOYMENT_MESSAGE")]
    Deployment,
    #[serde(rename = "DAEMONSET_MESSAGE")]
    DaemonSet,
    #[serde(rename = "JOB_MESSAGE")]
    Job,
    #[serde(rename = "CRONJOB_MESSAGE")]
    CronJob,
}

/// Hands violating entities to a message sink.
#[async_trait::async_trait]
pub trait Publish: Send + Sync {
    async fn publish(
        &self,
        topic: &str,
        kind: MessageKind,
        payload: &serde_json::Value,
    ) -> Result<()>;
}

/// Writes each message to the log.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogPublisher(());

// === impl MessageKind ===

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Namespace => "NAMESPACE_MESSAGE",
            Self::Pod => "POD_MESSAGE",
            Self::Deployment => "DEPLOYMENT_MESSAGE",
            Self::DaemonSet => "DAEMONSET_MESSAGE",
            Self::Job => "JOB_MESSAGE",
            Self::CronJob => "CRONJOB_MESSAGE",
        }
    }
}

impl From<WorkloadKind> for MessageKind {
    fn from(kind: WorkloadKind) -> Self {
        match kind {
            WorkloadKind::Pod => Self::Pod,
            WorkloadKind::Deployment => Self::Deployment,
            WorkloadKind::DaemonSet => Self::DaemonSet,
            WorkloadKind::Job => Self::Job,
            WorkloadKind::CronJob => Self::CronJob,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// === impl LogPublisher ===

#[async_trait::async_trait]
impl Publish for LogPublisher {
    async fn publish(
        &self,
        topic: &str,
        kind: MessageKind,
        payload: &serde_json::Value,
    ) -> Result<()> {
        info!(%topic, %kind, %payload, "Violation");
        Ok(())
    }
}
