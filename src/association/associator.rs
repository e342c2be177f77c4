// Copyright (c) 2025 - Cowboy AI, Inc.
//! Port Associator
//!
//! Infers which destination port corresponds to each source port, without
//! an explicit user mapping.
//!
//! # Algorithm
//!
//! ```text
//! source item ──src rules──▶ (address stem, name stem) per rule
//!                                 │             │
//!                                 ▼             ▼
//! destination ports ──dst rules──▶ address table  name table
//!                                 │             │
//!                                 ▼             ▼
//!                          address votes    name votes
//!                                 └──────┬──────┘
//!                                        ▼
//!                           majority per channel, then
//!                           channel preference on disagreement
//! ```
//!
//! Destination stem tables are built once per associator. Each source item
//! is resolved once; repeated lookups are served from memory.

use indexmap::IndexMap;
use std::cell::{OnceCell, RefCell};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use super::rules::{AssociationConfig, AssociationRuleLookup};
use super::stem::{Stem, StemBuilder};
use crate::config::ChannelPreference;
use crate::domain::{AssociateItem, Port, ResourcesPair};
use crate::errors::AssociationError;

/// Old identifier → new identifier
///
/// `None` marks a source item that needed a destination and has none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssociationTable {
    entries: IndexMap<String, Option<String>>,
}

impl AssociationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resolved association
    pub fn insert(&mut self, old: impl Into<String>, new: impl Into<String>) {
        self.entries.insert(old.into(), Some(new.into()));
    }

    /// Record an item that could not be resolved
    pub fn insert_unresolved(&mut self, old: impl Into<String>) {
        self.entries.insert(old.into(), None);
    }

    /// Resolved new name, if any
    pub fn get(&self, old: &str) -> Option<&str> {
        self.entries.get(old).and_then(|new| new.as_deref())
    }

    /// New name for `old`, or `old` itself when it was not migrated
    pub fn resolve<'a>(&'a self, old: &'a str) -> &'a str {
        self.get(old).unwrap_or(old)
    }

    /// Copy every entry of `other` into this table
    pub fn extend(&mut self, other: &AssociationTable) {
        for (old, new) in &other.entries {
            self.entries.insert(old.clone(), new.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when no entry is unresolved
    pub fn is_complete(&self) -> bool {
        self.entries.values().all(Option::is_some)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(old, new)| (old.as_str(), new.as_deref()))
    }
}

#[derive(Debug, Default)]
struct StemTables {
    address: HashMap<Stem, usize>,
    name: HashMap<Stem, usize>,
}

/// Candidate counts in first-seen order
#[derive(Debug, Default)]
struct Votes(Vec<(usize, usize)>);

impl Votes {
    fn add(&mut self, candidate: usize) {
        match self.0.iter_mut().find(|(index, _)| *index == candidate) {
            Some((_, count)) => *count += 1,
            None => self.0.push((candidate, 1)),
        }
    }

    /// Highest count; ties go to the candidate seen first
    fn winner(&self) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for &(index, count) in &self.0 {
            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((index, count));
            }
        }
        best.map(|(index, _)| index)
    }
}

/// Associates the items of one resource pair
pub struct Associator<'a> {
    pair: &'a ResourcesPair,
    src_rules: Vec<AssociationConfig>,
    dst_rules: Vec<AssociationConfig>,
    preference: ChannelPreference,
    stems: StemBuilder,
    dst_tables: OnceCell<StemTables>,
    resolved: RefCell<HashMap<String, Option<usize>>>,
    table: OnceCell<Result<AssociationTable, AssociationError>>,
}

impl<'a> Associator<'a> {
    /// Look up the rule sets for both resources of the pair
    pub fn new(
        pair: &'a ResourcesPair,
        rules: &dyn AssociationRuleLookup,
        preference: ChannelPreference,
    ) -> Self {
        let src = pair.src();
        let dst = pair.dst();
        Self {
            pair,
            src_rules: rules.get_association_rules(src.family.as_deref(), src.model.as_deref()),
            dst_rules: rules.get_association_rules(dst.family.as_deref(), dst.model.as_deref()),
            preference,
            stems: StemBuilder::new(),
            dst_tables: OnceCell::new(),
            resolved: RefCell::new(HashMap::new()),
            table: OnceCell::new(),
        }
    }

    pub fn pair(&self) -> &'a ResourcesPair {
        self.pair
    }

    fn dst_tables(&self) -> &StemTables {
        self.dst_tables.get_or_init(|| {
            let mut tables = StemTables::default();
            for rule in &self.dst_rules {
                for (index, port) in self.pair.dst().ports.iter().enumerate() {
                    let Some(stems) = self.stems.build_item_stems(rule, port) else {
                        continue;
                    };
                    if let Some(stem) = stems.address {
                        insert_first(&mut tables.address, stem, index, port);
                    }
                    if let Some(stem) = stems.name {
                        insert_first(&mut tables.name, stem, index, port);
                    }
                }
            }
            debug!(
                destination = %self.pair.dst().name,
                address_stems = tables.address.len(),
                name_stems = tables.name.len(),
                "Built destination stem tables"
            );
            tables
        })
    }

    /// Destination port associated with `item`, if any
    pub fn get_associated<I: AssociateItem + ?Sized>(&self, item: &I) -> Option<&'a Port> {
        if let Some(cached) = self.resolved.borrow().get(item.name()) {
            return cached.map(|index| &self.pair.dst().ports[index]);
        }

        let resolved = self.resolve(item);
        self.resolved
            .borrow_mut()
            .insert(item.name().to_string(), resolved);
        resolved.map(|index| &self.pair.dst().ports[index])
    }

    fn resolve<I: AssociateItem + ?Sized>(&self, item: &I) -> Option<usize> {
        let tables = self.dst_tables();
        let mut address_votes = Votes::default();
        let mut name_votes = Votes::default();

        for rule in &self.src_rules {
            let Some(stems) = self.stems.build_item_stems(rule, item) else {
                continue;
            };
            if let Some(index) = stems.address.and_then(|stem| tables.address.get(&stem)) {
                address_votes.add(*index);
            }
            if let Some(index) = stems.name.and_then(|stem| tables.name.get(&stem)) {
                name_votes.add(*index);
            }
        }

        let ports = &self.pair.dst().ports;
        match (address_votes.winner(), name_votes.winner()) {
            (Some(by_address), Some(by_name)) if by_address != by_name => {
                warn!(
                    item = item.name(),
                    by_address = %ports[by_address].name,
                    by_name = %ports[by_name].name,
                    preference = ?self.preference,
                    "Address association does not match name association"
                );
                match self.preference {
                    ChannelPreference::Address => Some(by_address),
                    ChannelPreference::Name => Some(by_name),
                }
            }
            (Some(by_address), _) => Some(by_address),
            (None, Some(by_name)) => Some(by_name),
            (None, None) => {
                debug!(item = item.name(), "Association not found");
                None
            }
        }
    }

    /// Connected source ports paired with their destination ports
    ///
    /// Ports without a destination are skipped with a warning; use
    /// [`Associator::valid`] to detect partial association.
    pub fn iter_pairs(&self) -> impl Iterator<Item = (&'a Port, &'a Port)> + '_ {
        self.pair
            .src()
            .ports
            .iter()
            .filter(|port| port.is_connected())
            .filter_map(move |src_port| match self.get_associated(src_port) {
                Some(dst_port) => Some((src_port, dst_port)),
                None => {
                    warn!(port = %src_port, "Cannot find associated port");
                    None
                }
            })
    }

    /// Names of source ports that carry configuration and therefore need a destination
    fn required_ports(&self) -> HashSet<&'a str> {
        let src = self.pair.src();
        let mut required: HashSet<&str> = src
            .ports
            .iter()
            .filter(|port| port.is_connected())
            .map(|port| port.name.as_str())
            .collect();

        for route in &src.associated_logical_routes {
            required.insert(route.source.as_str());
            required.insert(route.target.as_str());
            required.extend(route.associated_ports.iter().map(String::as_str));
        }
        for connector in &src.associated_connectors {
            required.insert(connector.source.as_str());
            required.insert(connector.target.as_str());
        }
        required
    }

    /// Association table for the pair's ports
    ///
    /// # Errors
    /// [`AssociationError::DestinationConflict`] when two source ports resolve
    /// to the same destination port.
    pub fn table(&self) -> Result<&AssociationTable, AssociationError> {
        self.table
            .get_or_init(|| self.build_table())
            .as_ref()
            .map_err(Clone::clone)
    }

    fn build_table(&self) -> Result<AssociationTable, AssociationError> {
        let required = self.required_ports();
        let mut table = AssociationTable::new();
        let mut claimed: HashMap<&str, &str> = HashMap::new();

        for src_port in &self.pair.src().ports {
            match self.get_associated(src_port) {
                Some(dst_port) => {
                    if let Some(first) = claimed.insert(&dst_port.name, &src_port.name) {
                        return Err(AssociationError::DestinationConflict {
                            destination: dst_port.name.clone(),
                            first: first.to_string(),
                            second: src_port.name.clone(),
                        });
                    }
                    table.insert(&src_port.name, &dst_port.name);
                }
                None if required.contains(src_port.name.as_str()) => {
                    warn!(port = %src_port, "Cannot find associated port");
                    table.insert_unresolved(&src_port.name);
                }
                None => debug!(port = %src_port.name, "Unused port left unassociated"),
            }
        }
        Ok(table)
    }

    /// True iff the table is non-empty, conflict-free and fully resolved
    ///
    /// Callers must check this before building actions from the pair.
    pub fn valid(&self) -> bool {
        match self.table() {
            Ok(table) => !table.is_empty() && table.is_complete(),
            Err(err) => {
                warn!(error = %err, "Association is not valid");
                false
            }
        }
    }
}

fn insert_first(table: &mut HashMap<Stem, usize>, stem: Stem, index: usize, port: &Port) {
    match table.get(&stem) {
        Some(existing) if *existing != index => {
            warn!(
                stem = %stem,
                port = %port.name,
                "Ambiguous association rule: stem already taken, keeping first port"
            )
        }
        Some(_) => {}
        None => {
            table.insert(stem, index);
        }
    }
}
