// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pattern-Based Association
//!
//! Finds the destination counterpart of every source item of a
//! [`ResourcesPair`](crate::domain::ResourcesPair):
//!
//! - [`rules`] - association rules and their family/model lookup
//! - [`stem`] - regex stems used as join keys
//! - [`associator`] - per-pair matching, memoization and the association table

pub mod associator;
pub mod rules;
pub mod stem;

pub use associator::{AssociationTable, Associator};
pub use rules::{AssociationConfig, AssociationRuleLookup, AssociationRules, MATCH_ALL};
pub use stem::{ItemStems, Stem, StemBuilder, StemChannel};
