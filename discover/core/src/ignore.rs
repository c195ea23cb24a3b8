use crate::{rule::MatchMode, rule_set::RuleSet, violation::ViolationType};
use ahash::AHashMap as HashMap;
use serde::{Deserialize, Serialize};

/// Rules that suppress violations, keyed by the violation type they suppress.
///
/// Each rule is evaluated against the entity's namespace and entity type, with
/// the violation type's name (e.g. `PRIVILEGED`) as the value, so both
/// `ns:pod:*` and a bare `*` suppress every violation of the keyed type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct IgnoredViolations(HashMap<ViolationType, RuleSet>);

// === impl IgnoredViolations ===

impl IgnoredViolations {
    pub fn insert(&mut self, kind: ViolationType, rules: RuleSet) {
        self.0.insert(kind, rules);
    }

    pub fn get(&self, kind: ViolationType) -> Option<&RuleSet> {
        self.0.get(&kind)
    }

    /// Returns false if a violation of `kind` on the given entity is
    /// suppressed.
    ///
    /// Malformed rules are skipped.
    pub fn is_not_ignored(
        &self,
        namespace: &str,
        entity: &str,
        kind: ViolationType,
        mode: MatchMode,
    ) -> bool {
        let Some(rules) = self.0.get(&kind) else {
            return true;
        };

        let ignored = rules.matches_lossy(namespace, entity, kind.as_str(), mode);
        if ignored {
            tracing::trace!(%namespace, %entity, %kind, "Violation ignored");
        }
        !ignored
    }
}

impl FromIterator<(ViolationType, RuleSet)> for IgnoredViolations {
    fn from_iter<T: IntoIterator<Item = (ViolationType, RuleSet)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
