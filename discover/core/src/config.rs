use crate::{
    ignore::IgnoredViolations, rule::MatchMode, rule_set::RuleSet, violation::ViolationType,
};
use ahash::AHashSet as HashSet;
use serde::{Deserialize, Serialize};

/// An immutable snapshot of the policy configuration, captured once per scan.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScanConfig {
    /// Recorded on every reported entity.
    pub cluster_name: String,

    /// Namespaces that are never scanned.
    pub ignored_namespaces: HashSet<String>,

    /// Rules of the form `scope:kind:name` naming resources that must exist.
    pub required_entities: Vec<String>,

    pub required_namespace_annotations: RuleSet,
    pub required_namespace_labels: RuleSet,

    /// Annotation keys that identify a namespace's owner. A namespace must set
    /// at least one of them.
    pub owner_annotations: Vec<String>,

    pub ignored_violations: IgnoredViolations,

    /// How ignore rules compare their value field against violation types.
    pub ignore_match_mode: MatchMode,

    /// Image repositories that containers may use. When empty, every
    /// repository is accepted.
    pub valid_repos: RuleSet,

    pub valid_repo_match_mode: MatchMode,

    pub image_size: ImageSizeBounds,
}

/// Inclusive bounds on a container image's size, in bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ImageSizeBounds {
    pub min: u64,
    pub max: u64,
}

// === impl ScanConfig ===

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            cluster_name: String::new(),
            ignored_namespaces: HashSet::default(),
            required_entities: Vec::new(),
            required_namespace_annotations: RuleSet::default(),
            required_namespace_labels: RuleSet::default(),
            owner_annotations: Vec::new(),
            ignored_violations: IgnoredViolations::default(),
            ignore_match_mode: MatchMode::Exact,
            valid_repos: RuleSet::default(),
            valid_repo_match_mode: MatchMode::Like,
            image_size: ImageSizeBounds::default(),
        }
    }
}

impl ScanConfig {
    pub fn is_ignored_namespace(&self, namespace: &str) -> bool {
        self.ignored_namespaces.contains(namespace)
    }

    /// Returns false if a violation of `kind` on the given entity is
    /// suppressed by the configured ignore rules.
    pub fn is_not_ignored(&self, namespace: &str, entity: &str, kind: ViolationType) -> bool {
        self.ignored_violations
            .is_not_ignored(namespace, entity, kind, self.ignore_match_mode)
    }

    /// Returns true if `image` is allowed by `validRepos`.
    ///
    /// Only an empty list accepts every image. A list whose rules are all
    /// malformed accepts none.
    pub fn is_valid_image_repo(&self, namespace: &str, entity: &str, image: &str) -> bool {
        self.valid_repos.is_empty()
            || self
                .valid_repos
                .matches_lossy(namespace, entity, image, self.valid_repo_match_mode)
    }
}

// === impl ImageSizeBounds ===

impl Default for ImageSizeBounds {
    fn default() -> Self {
        Self {
            min: 0,
            max: u64::MAX,
        }
    }
}

impl ImageSizeBounds {
    #[inline]
    pub fn contains(&self, size: u64) -> bool {
        (self.min..=self.max).contains(&size)
    }
}
