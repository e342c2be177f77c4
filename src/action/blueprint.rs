// Copyright (c) 2025 - Cowboy AI, Inc.
//! Blueprint update
//!
//! One action per blueprint. Every resource pair that touches the blueprint
//! contributes its routes and connectors through `merge`, so the package is
//! opened, edited and saved once.

use indexmap::IndexMap;
use std::fmt;

use super::{ActionKey, MigrationContext, Stage};
use crate::domain::{endpoint_pair, Connector, Direction, LogicalRoute};
use crate::errors::ActionError;

type EndpointKey = (String, String);

fn unordered(source: &str, target: &str) -> EndpointKey {
    endpoint_pair(source, target, Direction::Bi)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBlueprint {
    name: String,
    routes: IndexMap<EndpointKey, LogicalRoute>,
    connectors: IndexMap<EndpointKey, Connector>,
}

impl UpdateBlueprint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            routes: IndexMap::new(),
            connectors: IndexMap::new(),
        }
    }

    pub fn with_route(mut self, route: LogicalRoute) -> Self {
        self.add_route(route);
        self
    }

    pub fn with_connector(mut self, connector: Connector) -> Self {
        self.add_connector(connector);
        self
    }

    /// Add a route unless one with the same endpoints is present
    pub fn add_route(&mut self, route: LogicalRoute) {
        self.routes
            .entry(unordered(&route.source, &route.target))
            .or_insert(route);
    }

    /// Add a connector unless one with the same endpoints is present
    pub fn add_connector(&mut self, connector: Connector) {
        self.connectors
            .entry(unordered(&connector.source, &connector.target))
            .or_insert(connector);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn routes(&self) -> impl Iterator<Item = &LogicalRoute> {
        self.routes.values()
    }

    pub fn connectors(&self) -> impl Iterator<Item = &Connector> {
        self.connectors.values()
    }

    pub fn key(&self) -> ActionKey {
        ActionKey::Blueprint(self.name.clone())
    }

    pub fn stage(&self) -> Stage {
        Stage::UpdateBlueprints
    }

    /// Union of both actions' routes and connectors
    pub fn merge(&mut self, other: UpdateBlueprint) {
        for route in other.routes.into_values() {
            self.add_route(route);
        }
        for connector in other.connectors.into_values() {
            self.add_connector(connector);
        }
    }

    pub async fn execute(&mut self, ctx: &mut MigrationContext) -> Result<(), ActionError> {
        let blueprints = &ctx.operations.blueprints;
        blueprints.load_package(&self.name).await?;

        let routes: Vec<LogicalRoute> = self
            .routes
            .values()
            .map(|route| LogicalRoute {
                source: ctx.resolve(&route.source).to_string(),
                target: ctx.resolve(&route.target).to_string(),
                ..route.clone()
            })
            .collect();
        let connectors: Vec<Connector> = self
            .connectors
            .values()
            .map(|connector| Connector {
                source: ctx.resolve(&connector.source).to_string(),
                target: ctx.resolve(&connector.target).to_string(),
                ..connector.clone()
            })
            .collect();

        for (old, new) in self.routes.keys().zip(&routes) {
            if *old != unordered(&new.source, &new.target) {
                blueprints
                    .remove_route_or_connector(&self.name, &old.0, &old.1)
                    .await?;
            }
        }
        for (old, new) in self.connectors.keys().zip(&connectors) {
            if *old != unordered(&new.source, &new.target) {
                blueprints
                    .remove_route_or_connector(&self.name, &old.0, &old.1)
                    .await?;
            }
        }

        for (old, route) in self.routes.keys().zip(&routes) {
            if *old != unordered(&route.source, &route.target) {
                blueprints.add_route(&self.name, route).await?;
            }
        }
        for (old, connector) in self.connectors.keys().zip(&connectors) {
            if *old != unordered(&connector.source, &connector.target) {
                blueprints.add_connector(&self.name, connector).await?;
            }
        }

        blueprints.save_package(&self.name).await?;
        Ok(())
    }
}

impl fmt::Display for UpdateBlueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Update Blueprint: {} ({} routes, {} connectors)",
            self.name,
            self.routes.len(),
            self.connectors.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Scope;

    fn scope() -> Scope {
        Scope::Blueprint("bp".to_string())
    }

    #[test]
    fn test_merge_unions_without_duplicates() {
        let mut a = UpdateBlueprint::new("bp")
            .with_route(LogicalRoute::new("A/Port1", "B/Port1", scope(), Direction::Bi));
        let b = UpdateBlueprint::new("bp")
            .with_route(LogicalRoute::new("B/Port1", "A/Port1", scope(), Direction::Bi))
            .with_connector(Connector::new("A/Port2", "C/Port1", scope(), Direction::Uni));

        a.merge(b);
        assert_eq!(a.routes().count(), 1);
        assert_eq!(a.connectors().count(), 1);
        assert_eq!(a.to_string(), "Update Blueprint: bp (1 routes, 1 connectors)");
    }
}
