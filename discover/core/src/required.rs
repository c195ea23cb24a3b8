use crate::rule::{ParseRuleError, Rule};
use std::collections::BTreeMap;

/// The outcome of checking a map of labels or annotations against
/// required-field rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Requirement {
    Satisfied {
        /// The text of the first rule that passed.
        source: String,
    },

    /// No rule passed.
    Unmet,
}

// === impl Requirement ===

impl Requirement {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied { .. })
    }

    pub fn source(&self) -> Option<&str> {
        match self {
            Self::Satisfied { source } => Some(source),
            Self::Unmet => None,
        }
    }
}

/// Checks `fields` against required-field rules of the form
/// `namespace:entity:key`.
///
/// A rule passes when its namespace or entity field doesn't match, since it
/// doesn't apply to the entity. Otherwise a literal key must be present in
/// `fields`, a negated key must be absent, and a wildcard key always passes;
/// values are never inspected. The set is satisfied by the first rule that
/// passes. An empty set is unmet.
///
/// Every rule is parsed before the result is returned, so a malformed rule is
/// reported even when an earlier rule passed.
pub fn required_field_satisfied<S: AsRef<str>>(
    namespace: &str,
    entity: &str,
    fields: &BTreeMap<String, String>,
    rules: &[S],
) -> Result<Requirement, ParseRuleError> {
    let mut outcome = Requirement::Unmet;
    for text in rules {
        let text = text.as_ref();
        let rule = text.parse::<Rule>()?;
        if outcome.is_satisfied() {
            continue;
        }
        let passes = !rule.applies_to(namespace, entity)
            || rule.value.resolve(|key| fields.contains_key(key));
        if passes {
            outcome = Requirement::Satisfied {
                source: text.to_string(),
            };
        }
    }

    Ok(outcome)
}
