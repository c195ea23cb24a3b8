use serde::{Deserialize, Serialize};
use std::fmt;

/// The kinds of policy breach that may be reported.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationType {
    ImageRepo,
    ImageSize,
    Privileged,
    Capabilities,
    NoOwnerAnnotation,
    RequiredNamespaceAnnotations,
    RequiredNamespaceLabels,
    RequiredNamespaces,
}

/// A recorded policy breach.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Violation {
    /// Describes what caused the violation, e.g. an image or a missing
    /// resource's name.
    #[serde(rename = "Source")]
    pub source: String,

    #[serde(rename = "Type")]
    pub kind: ViolationType,
}

/// The violations recorded against a single scanned resource.
///
/// Violations may only be appended. A fresh value is built for every scan.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ViolatableEntity {
    #[serde(rename = "Violations", default)]
    violations: Vec<Violation>,
}

// === impl ViolationType ===

impl ViolationType {
    pub const ALL: [Self; 8] = [
        Self::ImageRepo,
        Self::ImageSize,
        Self::Privileged,
        Self::Capabilities,
        Self::NoOwnerAnnotation,
        Self::RequiredNamespaceAnnotations,
        Self::RequiredNamespaceLabels,
        Self::RequiredNamespaces,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ImageRepo => "IMAGE_REPO",
            Self::ImageSize => "IMAGE_SIZE",
            Self::Privileged => "PRIVILEGED",
            Self::Capabilities => "CAPABILITIES",
            Self::NoOwnerAnnotation => "NO_OWNER_ANNOTATION",
            Self::RequiredNamespaceAnnotations => "REQUIRED_NAMESPACE_ANNOTATIONS",
            Self::RequiredNamespaceLabels => "REQUIRED_NAMESPACE_LABELS",
            Self::RequiredNamespaces => "REQUIRED_NAMESPACES",
        }
    }
}

impl fmt::Display for ViolationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

// === impl ViolatableEntity ===

impl ViolatableEntity {
    pub fn add_violation(&mut self, source: impl Into<String>, kind: ViolationType) {
        self.violations.push(Violation {
            source: source.into(),
            kind,
        });
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Counts the recorded violations of the given type.
    pub fn count(&self, kind: ViolationType) -> usize {
        self.violations.iter().filter(|v| v.kind == kind).count()
    }
}
