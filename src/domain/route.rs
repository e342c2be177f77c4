// Copyright (c) 2025 - Cowboy AI, Inc.
//! Logical Routes and Connectors
//!
//! Routes and connectors are logical paths between two inventory endpoints.
//! They live either in a live reservation or in a saved blueprint, see
//! [`Scope`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a route or connector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "bi")]
    Bi,
    #[serde(rename = "uni")]
    Uni,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Bi => "bi",
            Direction::Uni => "uni",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a route or connector is defined
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Live reservation (reservation id)
    Reservation(String),
    /// Saved topology template (blueprint name)
    Blueprint(String),
}

/// How the migrated resource takes part in a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// The resource terminates the route
    #[default]
    Endpoint,
    /// The resource is an intermediate L1 hop
    Segment,
}

/// Normalized endpoint pair; bidirectional pairs are sorted so that
/// `(A, B)` and `(B, A)` compare equal
pub fn endpoint_pair(source: &str, target: &str, direction: Direction) -> (String, String) {
    match direction {
        Direction::Bi if target < source => (target.to_string(), source.to_string()),
        _ => (source.to_string(), target.to_string()),
    }
}

/// Logical route between two endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalRoute {
    pub source: String,
    pub target: String,
    pub scope: Scope,
    pub route_type: Direction,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub shared: bool,
    #[serde(default)]
    pub kind: RouteKind,
    /// Ports of the migrated resource the route passes through
    #[serde(default)]
    pub associated_ports: Vec<String>,
}

fn default_active() -> bool {
    true
}

impl LogicalRoute {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        scope: Scope,
        route_type: Direction,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            scope,
            route_type,
            alias: None,
            active: true,
            shared: false,
            kind: RouteKind::Endpoint,
            associated_ports: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn shared(mut self, shared: bool) -> Self {
        self.shared = shared;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Mark the route as passing through the resource on the given ports
    pub fn as_segment<I, S>(mut self, ports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.kind = RouteKind::Segment;
        self.associated_ports = ports.into_iter().map(Into::into).collect();
        self
    }

    pub fn endpoints(&self) -> (String, String) {
        endpoint_pair(&self.source, &self.target, self.route_type)
    }

    /// Reservation id for reservation-scoped routes
    pub fn reservation_id(&self) -> Option<&str> {
        match &self.scope {
            Scope::Reservation(id) => Some(id),
            Scope::Blueprint(_) => None,
        }
    }
}

impl fmt::Display for LogicalRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Route({}<->{}, {}, {})",
            self.source,
            self.target,
            self.route_type,
            if self.active { "Active" } else { "Inactive" }
        )
    }
}

/// Connector between two endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connector {
    pub source: String,
    pub target: String,
    pub scope: Scope,
    pub direction: Direction,
    #[serde(default)]
    pub connector_type: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
}

impl Connector {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        scope: Scope,
        direction: Direction,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            scope,
            direction,
            connector_type: None,
            alias: None,
        }
    }

    pub fn with_type(mut self, connector_type: impl Into<String>) -> Self {
        self.connector_type = Some(connector_type.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn endpoints(&self) -> (String, String) {
        endpoint_pair(&self.source, &self.target, self.direction)
    }

    pub fn reservation_id(&self) -> Option<&str> {
        match &self.scope {
            Scope::Reservation(id) => Some(id),
            Scope::Blueprint(_) => None,
        }
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Connector({}<->{}, {})", self.source, self.target, self.direction)
    }
}
