//! Policy rules and violation records.
//!
//! Rules are written as `namespace:entity:value` triplets (or as a bare
//! `value`), where each field is a wildcard (`*`), a negated literal
//! (`!literal`), or a literal. Namespace and entity fields are compared
//! exactly; the value field is compared with a [`MatchMode`]. A rule matches
//! when all three of its fields match, and a [`RuleSet`] matches when any of its
//! rules does.
//!
//! This crate has no knowledge of Kubernetes objects: it provides the rule
//! engine, the ignore and required-field checks built on it, the configuration
//! snapshot that drives a scan, and the records that a scan reports.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod config;
mod entity;
mod ignore;
mod required;
pub mod rule;
mod rule_set;
mod violation;

pub use self::{
    config::{ImageSizeBounds, ScanConfig},
    entity::{Namespace, Workload, WorkloadKind},
    ignore::IgnoredViolations,
    required::{required_field_satisfied, Requirement},
    rule::{Field, MatchMode, ParseRuleError, Rule},
    rule_set::{
        is_value_match, is_value_match_contains, is_value_match_exact, is_value_match_like,
        RuleSet,
    },
    violation::{ViolatableEntity, Violation, ViolationType},
};
