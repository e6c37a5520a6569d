//! Implications and association rules.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Renders an attribute set as `{a, b}`.
pub fn format_set(set: &BTreeSet<String>) -> String {
    let items: Vec<&str> = set.iter().map(String::as_str).collect();
    format!("{{{}}}", items.join(", "))
}

/// A rule `premise ==> conclusion` holding without counterexample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implication {
    pub premise: BTreeSet<String>,
    pub conclusion: BTreeSet<String>,
    /// Number of objects having the premise.
    pub support: usize,
}

impl fmt::Display for Implication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "< {} > {} ==> {};",
            self.support,
            format_set(&self.premise),
            format_set(&self.conclusion)
        )
    }
}

/// Thresholds for association rule mining.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssociationParams {
    pub min_support: f64,
    pub min_confidence: f64,
}

impl Default for AssociationParams {
    fn default() -> Self {
        Self {
            min_support: 0.1,
            min_confidence: 0.5,
        }
    }
}

impl AssociationParams {
    pub fn new(min_support: f64, min_confidence: f64) -> Result<Self> {
        check_unit("minimal support", min_support)?;
        check_unit("minimal confidence", min_confidence)?;
        Ok(Self {
            min_support,
            min_confidence,
        })
    }
}

fn check_unit(name: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ModelError::InvalidThreshold { name, value })
    }
}

/// How a rule should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Confidence 1 and at least one supporting object.
    Exact,
    /// Confidence 1 but no object has the premise.
    ExactWithoutSupport,
    /// Confidence below 1.
    Inexact,
}

/// A rule `premise ==> consequent` tolerating exceptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationRule {
    pub premise: BTreeSet<String>,
    pub consequent: BTreeSet<String>,
    /// Objects having the premise.
    pub premise_count: usize,
    /// Objects having premise and consequent.
    pub rule_count: usize,
    /// `rule_count / |objects|`.
    pub support: f64,
    /// `rule_count / premise_count`.
    pub confidence: f64,
}

impl AssociationRule {
    pub fn kind(&self) -> RuleKind {
        if self.confidence < 1.0 {
            RuleKind::Inexact
        } else if self.support > 0.0 {
            RuleKind::Exact
        } else {
            RuleKind::ExactWithoutSupport
        }
    }
}

impl fmt::Display for AssociationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "< {} > {} =[{:.2}]=> < {} > {};",
            self.premise_count,
            format_set(&self.premise),
            self.confidence,
            self.rule_count,
            format_set(&self.consequent)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn params_reject_out_of_range() {
        assert!(AssociationParams::new(0.2, 0.8).is_ok());
        assert_eq!(
            AssociationParams::new(1.5, 0.5).unwrap_err(),
            ModelError::InvalidThreshold {
                name: "minimal support",
                value: 1.5
            }
        );
        assert!(AssociationParams::new(0.1, -0.1).is_err());
    }

    #[test]
    fn rule_kind_follows_confidence_and_support() {
        let mut rule = AssociationRule {
            premise: set(&["female"]),
            consequent: set(&["adult"]),
            premise_count: 2,
            rule_count: 1,
            support: 0.25,
            confidence: 0.5,
        };
        assert_eq!(rule.kind(), RuleKind::Inexact);
        rule.confidence = 1.0;
        assert_eq!(rule.kind(), RuleKind::Exact);
        rule.support = 0.0;
        assert_eq!(rule.kind(), RuleKind::ExactWithoutSupport);
    }

    #[test]
    fn display_matches_rule_listing() {
        let rule = AssociationRule {
            premise: set(&["female"]),
            consequent: set(&["adult"]),
            premise_count: 2,
            rule_count: 1,
            support: 0.25,
            confidence: 0.5,
        };
        assert_eq!(rule.to_string(), "< 2 > {female} =[0.50]=> < 1 > {adult};");
        let implication = Implication {
            premise: set(&["adult", "juvenile"]),
            conclusion: set(&["female", "male"]),
            support: 0,
        };
        assert_eq!(
            implication.to_string(),
            "< 0 > {adult, juvenile} ==> {female, male};"
        );
    }
}
