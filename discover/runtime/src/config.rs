use crate::{core::ScanConfig, scan::SharedImageSizes};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{collections::BTreeMap, path::Path};

const DEFAULT_TOPIC: &str = "k8guard-actions";

/// The contents of the YAML configuration file.
///
/// Scan policy keys sit at the top level alongside the runtime's own settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileConfig {
    #[serde(flatten)]
    pub scan: ScanConfig,

    /// Known image sizes, in bytes, used to seed the image size cache.
    pub image_sizes: BTreeMap<String, u64>,

    /// The topic that violation messages are published to.
    pub topic: String,
}

// === impl FileConfig ===

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            image_sizes: BTreeMap::new(),
            topic: DEFAULT_TOPIC.to_string(),
        }
    }
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(Into::into)
    }

    /// Builds an image size cache holding the configured sizes.
    pub fn image_size_cache(&self) -> SharedImageSizes {
        let mut sizes = SharedImageSizes::default();
        sizes.extend(
            self.image_sizes
                .iter()
                .map(|(image, size)| (image.as_str(), *size)),
        );
        sizes
    }
}
