//! Manual cleaning rules
//!
//! A rule pairs a condition on some item attribute with a keep/remove
//! action. Rules can be added, toggled and deleted; only enabled rules count
//! toward the summary.
//!
//! The CLI only lists rules (`sift rules`), reading them from the config
//! file. Editing through [`RuleSet::add`], [`RuleSet::toggle`] and
//! [`RuleSet::delete`] is library API for embedding front ends.

use crate::error::{SiftError, SiftResult};
use crate::session::Verdict;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Attribute a rule inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCondition {
    /// File size
    Size,
    /// Pixel resolution
    Resolution,
    /// File format
    Format,
    /// Quality tier
    Quality,
    /// Similarity to other items
    Similarity,
    /// Free-form metadata
    Metadata,
}

impl RuleCondition {
    /// All conditions in display order
    pub const ALL: [RuleCondition; 6] = [
        Self::Size,
        Self::Resolution,
        Self::Format,
        Self::Quality,
        Self::Similarity,
        Self::Metadata,
    ];

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Size => "File Size",
            Self::Resolution => "Resolution",
            Self::Format => "Format",
            Self::Quality => "Quality",
            Self::Similarity => "Similarity",
            Self::Metadata => "Metadata",
        }
    }
}

impl fmt::Display for RuleCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A manual filter rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRule {
    /// Rule identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Attribute inspected
    pub condition: RuleCondition,
    /// Comparison expression, e.g. `">= 1920x1080"`
    pub value: String,
    /// What to do with matching items
    pub action: Verdict,
    /// Whether the rule is applied
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Fields supplied when creating a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRule {
    /// Display name
    pub name: String,
    /// Attribute inspected
    pub condition: RuleCondition,
    /// Comparison expression
    pub value: String,
    /// Action for matching items
    pub action: Verdict,
}

/// Counts over enabled rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSummary {
    /// Enabled rules
    pub active: usize,
    /// Enabled keep rules
    pub keep: usize,
    /// Enabled remove rules
    pub remove: usize,
}

/// Ordered collection of rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    rules: Vec<FilterRule>,
}

impl RuleSet {
    /// Create a rule set from existing rules
    pub fn new(rules: Vec<FilterRule>) -> Self {
        Self { rules }
    }

    /// Rules in insertion order
    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }

    /// Look up a rule by id
    pub fn get(&self, id: &str) -> Option<&FilterRule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    /// Add an enabled rule
    ///
    /// # Errors
    ///
    /// Returns `SiftError::InvalidRule` if the name or value is blank.
    ///
    /// # Examples
    ///
    /// ```
    /// use sift::rules::{NewRule, RuleCondition, RuleSet};
    /// use sift::session::Verdict;
    ///
    /// let mut rules = RuleSet::default();
    /// let rule = rules
    ///     .add(NewRule {
    ///         name: "PNG only".to_string(),
    ///         condition: RuleCondition::Format,
    ///         value: "png".to_string(),
    ///         action: Verdict::Keep,
    ///     })
    ///     .unwrap();
    /// assert!(rule.enabled);
    /// ```
    pub fn add(&mut self, new_rule: NewRule) -> SiftResult<&FilterRule> {
        let name = new_rule.name.trim();
        let value = new_rule.value.trim();
        if name.is_empty() {
            return Err(SiftError::InvalidRule("name cannot be empty".to_string()));
        }
        if value.is_empty() {
            return Err(SiftError::InvalidRule("value cannot be empty".to_string()));
        }

        let rule = FilterRule {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            condition: new_rule.condition,
            value: value.to_string(),
            action: new_rule.action,
            enabled: true,
        };
        tracing::debug!(id = %rule.id, name = %rule.name, "Added rule");
        self.rules.push(rule);
        Ok(&self.rules[self.rules.len() - 1])
    }

    /// Remove a rule
    ///
    /// # Errors
    ///
    /// Returns `SiftError::RuleNotFound` for an unknown id.
    pub fn delete(&mut self, id: &str) -> SiftResult<FilterRule> {
        let index = self.position(id)?;
        Ok(self.rules.remove(index))
    }

    /// Flip a rule's enabled flag and return the new value
    ///
    /// # Errors
    ///
    /// Returns `SiftError::RuleNotFound` for an unknown id.
    pub fn toggle(&mut self, id: &str) -> SiftResult<bool> {
        let index = self.position(id)?;
        let rule = &mut self.rules[index];
        rule.enabled = !rule.enabled;
        Ok(rule.enabled)
    }

    /// Count enabled rules by action
    pub fn summary(&self) -> RuleSummary {
        let enabled = self.rules.iter().filter(|rule| rule.enabled);
        let (keep, remove) = enabled.fold((0, 0), |(keep, remove), rule| match rule.action {
            Verdict::Keep => (keep + 1, remove),
            Verdict::Remove => (keep, remove + 1),
        });
        RuleSummary {
            active: keep + remove,
            keep,
            remove,
        }
    }

    fn position(&self, id: &str) -> SiftResult<usize> {
        self.rules
            .iter()
            .position(|rule| rule.id == id)
            .ok_or_else(|| SiftError::RuleNotFound(id.to_string()))
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

/// Rules shipped with a fresh install
pub fn default_rules() -> Vec<FilterRule> {
    vec![
        FilterRule {
            id: "1".to_string(),
            name: "High Quality Images".to_string(),
            condition: RuleCondition::Resolution,
            value: ">= 1920x1080".to_string(),
            action: Verdict::Keep,
            enabled: true,
        },
        FilterRule {
            id: "2".to_string(),
            name: "Remove Duplicates".to_string(),
            condition: RuleCondition::Similarity,
            value: "> 95%".to_string(),
            action: Verdict::Remove,
            enabled: true,
        },
        FilterRule {
            id: "3".to_string(),
            name: "File Size Filter".to_string(),
            condition: RuleCondition::Size,
            value: "< 10MB".to_string(),
            action: Verdict::Keep,
            enabled: false,
        },
    ]
}
