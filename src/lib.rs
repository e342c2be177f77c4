// Copyright (c) 2025 - Cowboy AI, Inc.
//! Configuration migration for the Composable Information Machine
//!
//! Moves physical connections, logical routes and connectors from one
//! inventory resource to another. Two engines do the work:
//!
//! - [`association`] infers which destination port corresponds to each
//!   source port from regex stems of addresses and names
//! - [`action`] turns the associations into a deduplicated, staged set of
//!   idempotent operations and executes them
//!
//! The platform itself is reached only through the [`operations`] traits.

pub mod action;
pub mod association;
pub mod config;
pub mod domain;
pub mod errors;
pub mod operations;
pub mod service;
pub mod state_machine;

// Re-export commonly used types
pub use action::{Action, ActionExecutor, ActionKey, ActionsContainer, ExecutionReport, MigrationContext, Stage};
pub use association::{AssociationConfig, AssociationRules, AssociationTable, Associator, StemBuilder};
pub use config::{ChannelPreference, ExecutorSettings, MigrationConfig};
pub use domain::{Connector, LogicalRoute, Port, Resource, ResourcesPair};
pub use errors::{MigrationError, MigrationResult};
pub use operations::{Operations, RecordingOperations};
pub use service::{DestinationSpec, MigrationService, PlatformMigrationService};
