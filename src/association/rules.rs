// Copyright (c) 2025 - Cowboy AI, Inc.
//! Association Rules
//!
//! An [`AssociationConfig`] says how to derive a stem from an item's address
//! and/or name. Rules are grouped by the family/model of the *resource* they
//! apply to and looked up most specific first:
//!
//! ```text
//! family/model  →  family/*  →  */*
//! ```
//!
//! The first group with any rules wins; later groups are not consulted.
//! Inside a group, each rule further filters the *items* (ports) it applies
//! to by their own family/model lists, where `*` or an empty list matches
//! everything.
//!
//! # YAML Format
//!
//! ```yaml
//! "L1 Switch/Rome":
//!   port:
//!     family: ["L1 Switch Port"]
//!     address_pattern: ".*/CH(.*)/M(.*)/SM(.*)/P(.*)"
//! "*/*":
//!   any_port:
//!     name_pattern: "Port(\\d+)$"
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::stem::compile_pattern;
use crate::domain::AssociateItem;
use crate::errors::ConfigurationError;

/// Wildcard for family/model filters and lookup keys
pub const MATCH_ALL: &str = "*";

/// One association rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationConfig {
    /// Rule name (the YAML key)
    #[serde(skip)]
    pub name: String,

    /// Item families the rule applies to
    #[serde(default)]
    pub family: Vec<String>,

    /// Item models the rule applies to
    #[serde(default)]
    pub model: Vec<String>,

    #[serde(default)]
    pub address_pattern: Option<String>,

    #[serde(default)]
    pub name_pattern: Option<String>,
}

impl AssociationConfig {
    /// Create a rule that applies to every item
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            family: Vec::new(),
            model: Vec::new(),
            address_pattern: None,
            name_pattern: None,
        }
    }

    pub fn with_address_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.address_pattern = Some(pattern.into());
        self
    }

    pub fn with_name_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.name_pattern = Some(pattern.into());
        self
    }

    pub fn with_families<I, S>(mut self, families: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.family = families.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.model = models.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the rule's family/model filter admits the item
    pub fn applies_to<I: AssociateItem + ?Sized>(&self, item: &I) -> bool {
        filter_matches(&self.family, item.family()) && filter_matches(&self.model, item.model())
    }

    /// A rule needs at least one pattern and every pattern must compile
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.address_pattern.is_none() && self.name_pattern.is_none() {
            return Err(ConfigurationError::EmptyRule(self.name.clone()));
        }
        for pattern in [&self.address_pattern, &self.name_pattern].into_iter().flatten() {
            compile_pattern(pattern).map_err(|err| ConfigurationError::InvalidPattern {
                rule: self.name.clone(),
                pattern: pattern.clone(),
                reason: err.to_string(),
            })?;
        }
        Ok(())
    }
}

fn filter_matches(filter: &[String], value: Option<&str>) -> bool {
    if filter.is_empty() || filter.iter().any(|entry| entry == MATCH_ALL) {
        return true;
    }
    value.is_some_and(|value| filter.iter().any(|entry| entry == value))
}

/// Source of association rules for a resource family/model
pub trait AssociationRuleLookup: Send + Sync {
    /// Ordered rules for the most specific matching group
    fn get_association_rules(&self, family: Option<&str>, model: Option<&str>)
        -> Vec<AssociationConfig>;
}

/// Rule groups keyed by `family/model`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssociationRules {
    groups: IndexMap<String, IndexMap<String, AssociationConfig>>,
}

impl AssociationRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a YAML rule table
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigurationError> {
        let mut groups: IndexMap<String, IndexMap<String, AssociationConfig>> =
            if yaml.trim().is_empty() {
                IndexMap::new()
            } else {
                serde_yaml::from_str(yaml)?
            };

        for rules in groups.values_mut() {
            for (name, rule) in rules.iter_mut() {
                rule.name = name.clone();
                rule.validate()?;
            }
        }
        Ok(Self { groups })
    }

    /// Read a YAML rule table from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Add a rule under a `family/model` key
    pub fn insert(
        &mut self,
        family: &str,
        model: &str,
        rule: AssociationConfig,
    ) -> Result<(), ConfigurationError> {
        rule.validate()?;
        self.groups
            .entry(group_key(family, model))
            .or_default()
            .insert(rule.name.clone(), rule);
        Ok(())
    }

    /// Builder form of [`AssociationRules::insert`]
    pub fn with_rule(
        mut self,
        family: &str,
        model: &str,
        rule: AssociationConfig,
    ) -> Result<Self, ConfigurationError> {
        self.insert(family, model, rule)?;
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(IndexMap::is_empty)
    }
}

fn group_key(family: &str, model: &str) -> String {
    format!("{family}/{model}")
}

impl AssociationRuleLookup for AssociationRules {
    fn get_association_rules(
        &self,
        family: Option<&str>,
        model: Option<&str>,
    ) -> Vec<AssociationConfig> {
        let family = family.unwrap_or(MATCH_ALL);
        let model = model.unwrap_or(MATCH_ALL);
        let keys = [
            group_key(family, model),
            group_key(family, MATCH_ALL),
            group_key(MATCH_ALL, MATCH_ALL),
        ];

        keys.iter()
            .filter_map(|key| self.groups.get(key))
            .find(|rules| !rules.is_empty())
            .map(|rules| rules.values().cloned().collect())
            .unwrap_or_default()
    }
}
