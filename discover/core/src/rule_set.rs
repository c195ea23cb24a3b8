use crate::rule::{MatchMode, ParseRuleError, Rule};
use serde::{Deserialize, Serialize};

/// An ordered list of configured rule strings.
///
/// A set matches when any one of its rules matches. Rules are kept in their
/// textual form so that violations can cite the rule that produced them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct RuleSet(Vec<String>);

// === impl RuleSet ===

impl RuleSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    /// Evaluates the set, failing if any rule in it is malformed.
    pub fn matches(
        &self,
        namespace: &str,
        entity: &str,
        value: &str,
        mode: MatchMode,
    ) -> Result<bool, ParseRuleError> {
        is_value_match(namespace, entity, value, &self.0, mode)
    }

    /// Evaluates the set, skipping malformed rules.
    pub fn matches_lossy(
        &self,
        namespace: &str,
        entity: &str,
        value: &str,
        mode: MatchMode,
    ) -> bool {
        self.rules_lossy()
            .any(|(_, rule)| rule.matches(namespace, entity, value, mode))
    }

    /// Parses each rule, logging and dropping the ones that are malformed.
    pub fn rules_lossy(&self) -> impl Iterator<Item = (&str, Rule)> + '_ {
        self.iter().filter_map(|text| match text.parse::<Rule>() {
            Ok(rule) => Some((text, rule)),
            Err(error) => {
                tracing::warn!(%error, "Skipping malformed rule");
                None
            }
        })
    }
}

impl<S: Into<String>> FromIterator<S> for RuleSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<String>> for RuleSet {
    fn from(rules: Vec<String>) -> Self {
        Self(rules)
    }
}

/// Returns true if any of `rules` matches the observed triple.
///
/// Every rule is parsed before the result is returned, so a malformed rule is
/// reported even when another rule in the set matches.
pub fn is_value_match<S: AsRef<str>>(
    namespace: &str,
    entity: &str,
    value: &str,
    rules: &[S],
    mode: MatchMode,
) -> Result<bool, ParseRuleError> {
    let mut matched = false;
    for rule in rules {
        let rule = rule.as_ref().parse::<Rule>()?;
        matched |= rule.matches(namespace, entity, value, mode);
    }
    Ok(matched)
}

#[inline]
pub fn is_value_match_exact<S: AsRef<str>>(
    namespace: &str,
    entity: &str,
    value: &str,
    rules: &[S],
) -> Result<bool, ParseRuleError> {
    is_value_match(namespace, entity, value, rules, MatchMode::Exact)
}

#[inline]
pub fn is_value_match_like<S: AsRef<str>>(
    namespace: &str,
    entity: &str,
    value: &str,
    rules: &[S],
) -> Result<bool, ParseRuleError> {
    is_value_match(namespace, entity, value, rules, MatchMode::Like)
}

#[inline]
pub fn is_value_match_contains<S: AsRef<str>>(
    namespace: &str,
    entity: &str,
    value: &str,
    rules: &[S],
) -> Result<bool, ParseRuleError> {
    is_value_match(namespace, entity, value, rules, MatchMode::Contains)
}
