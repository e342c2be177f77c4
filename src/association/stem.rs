// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stem Building
//!
//! A stem is the normalized tuple a regex extracts from an address or a
//! name. Two items with equal stems in the same channel are candidates for
//! each other.
//!
//! ```text
//! pattern  .*/CH(.*)/M(.*)/SM(.*)/P(.*)
//! address  CH1/M01/SM01/P9      →  ("01", "01", "01", "09")
//! ```
//!
//! Address components are zero-padded to width 2, because addresses encode
//! small integers with variable width. Name components are kept verbatim.
//! Patterns without capturing groups produce the whole match as a 1-tuple.

use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use tracing::{debug, warn};

use super::rules::AssociationConfig;
use crate::domain::AssociateItem;

/// Compile a pattern the way association does (case-insensitive, unanchored)
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Which item attribute a stem was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StemChannel {
    Address,
    Name,
}

/// Normalized join key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Stem(Vec<String>);

impl Stem {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.join(", "))
    }
}

/// Stems of one item under one rule
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemStems {
    pub address: Option<Stem>,
    pub name: Option<Stem>,
}

/// Builds stems, compiling each distinct pattern once
#[derive(Debug, Default)]
pub struct StemBuilder {
    patterns: Mutex<HashMap<String, Option<Regex>>>,
}

impl StemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn pattern(&self, pattern: &str) -> Option<Regex> {
        let mut patterns = match self.patterns.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        patterns
            .entry(pattern.to_string())
            .or_insert_with(|| match compile_pattern(pattern) {
                Ok(regex) => Some(regex),
                Err(err) => {
                    warn!(pattern, error = %err, "Association pattern does not compile");
                    None
                }
            })
            .clone()
    }

    /// Stem of `value` under `pattern`, or `None` when the pattern does not match
    pub fn build_stem(&self, pattern: &str, value: &str, channel: StemChannel) -> Option<Stem> {
        let regex = self.pattern(pattern)?;
        let Some(captures) = regex.captures(value) else {
            debug!(pattern, value, "No stem match");
            return None;
        };

        let parts: Vec<String> = if captures.len() > 1 {
            (1..captures.len())
                .map(|index| captures.get(index).map_or("", |m| m.as_str()))
                .map(str::to_string)
                .collect()
        } else {
            captures
                .get(0)
                .map(|m| vec![m.as_str().to_string()])
                .unwrap_or_default()
        };

        let parts = match channel {
            StemChannel::Address => parts.iter().map(|part| zero_pad(part)).collect(),
            StemChannel::Name => parts,
        };
        Some(Stem(parts))
    }

    /// Address and name stems of an item, or `None` if the rule does not apply to it
    pub fn build_item_stems<I: AssociateItem + ?Sized>(
        &self,
        rule: &AssociationConfig,
        item: &I,
    ) -> Option<ItemStems> {
        if !rule.applies_to(item) {
            return None;
        }

        let address = match (&rule.address_pattern, item.address()) {
            (Some(pattern), Some(address)) => {
                self.build_stem(pattern, address, StemChannel::Address)
            }
            _ => None,
        };
        let name = rule
            .name_pattern
            .as_deref()
            .and_then(|pattern| self.build_stem(pattern, item.name(), StemChannel::Name));

        Some(ItemStems { address, name })
    }
}

fn zero_pad(part: &str) -> String {
    format!("{part:0>2}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Port;
    use test_case::test_case;

    #[test_case(".*Port(\\d+)", "Port9", StemChannel::Address, Some(vec!["09"]) ; "address pads single digit")]
    #[test_case(".*Port(\\d+)", "Port09", StemChannel::Address, Some(vec!["09"]) ; "address keeps two digits")]
    #[test_case(".*Port(\\d+)", "Port123", StemChannel::Address, Some(vec!["123"]) ; "address keeps wide values")]
    #[test_case(".*Port(\\d+)", "Port9", StemChannel::Name, Some(vec!["9"]) ; "name is verbatim")]
    #[test_case(".*Port(\\d+)", "Module9", StemChannel::Name, None ; "no match")]
    #[test_case("port\\d+", "SW1/PORT7", StemChannel::Name, Some(vec!["PORT7"]) ; "no groups uses whole match case insensitively")]
    #[test_case("P(\\d+)(x)?", "P3", StemChannel::Address, Some(vec!["03", "00"]) ; "unmatched optional group")]
    fn test_build_stem(pattern: &str, value: &str, channel: StemChannel, expected: Option<Vec<&str>>) {
        let builder = StemBuilder::new();
        let expected = expected.map(Stem::new);
        assert_eq!(builder.build_stem(pattern, value, channel), expected);
    }

    #[test]
    fn test_chassis_address_stem() {
        let builder = StemBuilder::new();
        let stem = builder.build_stem(
            ".*/CH(.*)/M(.*)/SM(.*)/P(.*)",
            "192.168.1.1/CH1/M01/SM1/P9",
            StemChannel::Address,
        );
        assert_eq!(stem, Some(Stem::new(["01", "01", "01", "09"])));
    }

    #[test]
    fn test_stem_is_deterministic() {
        let builder = StemBuilder::new();
        let first = builder.build_stem(".*Port(\\d+)", "Port9", StemChannel::Address);
        let second = builder.build_stem(".*Port(\\d+)", "Port9", StemChannel::Address);
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_pattern_yields_no_stem() {
        let builder = StemBuilder::new();
        assert_eq!(builder.build_stem("Port(", "Port1", StemChannel::Name), None);
    }

    #[test]
    fn test_item_stems_respect_rule_filter() {
        let builder = StemBuilder::new();
        let rule = AssociationConfig::new("ports")
            .with_families(["Port"])
            .with_address_pattern("P(\\d+)$")
            .with_name_pattern("Port(\\d+)$");

        let port = Port::new("SW1/Port1")
            .with_address("CH1/P1")
            .with_family_model("Port", "Generic Port");
        let stems = builder.build_item_stems(&rule, &port).unwrap();
        assert_eq!(stems.address, Some(Stem::new(["01"])));
        assert_eq!(stems.name, Some(Stem::new(["1"])));

        let module = Port::new("SW1/Module1").with_family_model("Module", "Generic Module");
        assert_eq!(builder.build_item_stems(&rule, &module), None);
    }
}
