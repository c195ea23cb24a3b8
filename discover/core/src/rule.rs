use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Selects how a rule's value field is compared against an observed value.
///
/// Namespace and entity fields are always compared exactly; the mode only
/// applies to the value field.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// The observed value equals the literal.
    #[default]
    Exact,

    /// The observed value starts with the literal.
    Like,

    /// The literal occurs anywhere in the observed value.
    Contains,
}

/// One field of a rule.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    /// `*`: matches anything.
    Wildcard,

    /// `!literal`: matches anything the literal does not.
    Negated(String),

    /// `literal`
    Literal(String),
}

/// A parsed `namespace:entity:value` rule.
///
/// A bare `value` rule parses with wildcard namespace and entity fields, so it
/// ignores where the observed value came from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rule {
    pub namespace: Field,
    pub entity: Field,
    pub value: Field,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid match mode {0:?}: expected one of 'exact', 'like', or 'contains'")]
pub struct InvalidMatchMode(String);

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid rule {rule:?}: found {fields} fields, expected `value` or `namespace:entity:value`")]
pub struct ParseRuleError {
    rule: String,
    fields: usize,
}

// === impl MatchMode ===

impl MatchMode {
    #[inline]
    pub fn test(self, value: &str, literal: &str) -> bool {
        match self {
            Self::Exact => value == literal,
            Self::Like => value.starts_with(literal),
            Self::Contains => value.contains(literal),
        }
    }
}

impl FromStr for MatchMode {
    type Err = InvalidMatchMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(Self::Exact),
            "like" => Ok(Self::Like),
            "contains" => Ok(Self::Contains),
            s => Err(InvalidMatchMode(s.to_string())),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => "exact".fmt(f),
            Self::Like => "like".fmt(f),
            Self::Contains => "contains".fmt(f),
        }
    }
}

// === impl Field ===

impl Field {
    pub fn parse(s: &str) -> Self {
        if s == "*" {
            return Self::Wildcard;
        }
        match s.strip_prefix('!') {
            Some(literal) => Self::Negated(literal.to_string()),
            None => Self::Literal(s.to_string()),
        }
    }

    /// Resolves the field by applying `test` to its literal, inverting the
    /// result for negated fields.
    pub fn resolve(&self, test: impl FnOnce(&str) -> bool) -> bool {
        match self {
            Self::Wildcard => true,
            Self::Negated(literal) => !test(literal),
            Self::Literal(literal) => test(literal),
        }
    }

    #[inline]
    pub fn matches(&self, observed: &str, mode: MatchMode) -> bool {
        self.resolve(|literal| mode.test(observed, literal))
    }

    /// Returns the literal of a non-negated, non-wildcard field.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(literal) => Some(literal),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wildcard => "*".fmt(f),
            Self::Negated(literal) => write!(f, "!{literal}"),
            Self::Literal(literal) => literal.fmt(f),
        }
    }
}

// === impl Rule ===

impl Rule {
    /// Returns true if the rule's namespace and entity fields both match.
    pub fn applies_to(&self, namespace: &str, entity: &str) -> bool {
        self.namespace.matches(namespace, MatchMode::Exact)
            && self.entity.matches(entity, MatchMode::Exact)
    }

    pub fn matches(&self, namespace: &str, entity: &str, value: &str, mode: MatchMode) -> bool {
        self.applies_to(namespace, entity) && self.value.matches(value, mode)
    }
}

impl FromStr for Rule {
    type Err = ParseRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = s.split(':').collect::<Vec<_>>();
        match fields[..] {
            [value] => Ok(Self {
                namespace: Field::Wildcard,
                entity: Field::Wildcard,
                value: Field::parse(value),
            }),
            [namespace, entity, value] => Ok(Self {
                namespace: Field::parse(namespace),
                entity: Field::parse(entity),
                value: Field::parse(value),
            }),
            _ => Err(ParseRuleError {
                rule: s.to_string(),
                fields: fields.len(),
            }),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.entity, self.value)
    }
}

/// Parses `rule` and evaluates it against an observed triple.
pub fn is_match(
    namespace: &str,
    entity: &str,
    value: &str,
    rule: &str,
    mode: MatchMode,
) -> Result<bool, ParseRuleError> {
    let rule = rule.parse::<Rule>()?;
    Ok(rule.matches(namespace, entity, value, mode))
}
