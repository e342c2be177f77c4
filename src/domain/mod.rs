// Copyright (c) 2025 - Cowboy AI, Inc.
//! Migration Domain Models
//!
//! Inventory concepts the migration engines work on.
//!
//! - [`Resource`] / [`Port`] - inventory entries and their physical ports
//! - [`ResourcesPair`] - source resource and its migration destination
//! - [`AssociateItem`] - capability set shared by everything that can be associated
//! - [`LogicalRoute`] / [`Connector`] - logical paths scoped to a reservation or blueprint
//! - [`invariants`] - pure pair validation

pub mod invariants;
pub mod resource;
pub mod route;

pub use invariants::validate_pair;
pub use resource::{AssociateItem, Endpoint, Port, Resource, ResourcesPair};
pub use route::{endpoint_pair, Connector, Direction, LogicalRoute, RouteKind, Scope};
