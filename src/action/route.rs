// Copyright (c) 2025 - Cowboy AI, Inc.
//! Reservation route actions
//!
//! A migrated route is removed before connections move (stage 1) and
//! recreated afterwards (stage 3) with endpoints rewritten through the
//! association table at execution time.

use std::fmt;

use super::{ActionKey, MigrationContext, Stage};
use crate::domain::{Direction, LogicalRoute, RouteKind};
use crate::errors::ActionError;

fn route_key(reservation_id: &str, route: &LogicalRoute) -> (String, Direction, (String, String)) {
    (reservation_id.to_string(), route.route_type, route.endpoints())
}

/// Remove a route that would dangle after its ports move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveRoute {
    reservation_id: String,
    route: LogicalRoute,
}

impl RemoveRoute {
    pub fn new(reservation_id: impl Into<String>, route: LogicalRoute) -> Self {
        Self {
            reservation_id: reservation_id.into(),
            route,
        }
    }

    pub fn route(&self) -> &LogicalRoute {
        &self.route
    }

    pub fn key(&self) -> ActionKey {
        let (reservation_id, route_type, endpoints) = route_key(&self.reservation_id, &self.route);
        ActionKey::RemoveRoute {
            reservation_id,
            route_type,
            endpoints,
        }
    }

    pub fn stage(&self) -> Stage {
        Stage::RemoveStale
    }

    pub async fn execute(&mut self, ctx: &mut MigrationContext) -> Result<(), ActionError> {
        ctx.operations
            .routes
            .remove_route(
                &self.reservation_id,
                &self.route.source,
                &self.route.target,
                self.route.route_type,
            )
            .await?;
        Ok(())
    }
}

impl fmt::Display for RemoveRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Remove Route: {}", self.route)
    }
}

/// Recreate a route on the migrated endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoute {
    reservation_id: String,
    route: LogicalRoute,
}

impl CreateRoute {
    pub fn new(reservation_id: impl Into<String>, route: LogicalRoute) -> Self {
        Self {
            reservation_id: reservation_id.into(),
            route,
        }
    }

    pub fn route(&self) -> &LogicalRoute {
        &self.route
    }

    pub fn kind(&self) -> RouteKind {
        self.route.kind
    }

    pub fn key(&self) -> ActionKey {
        let (reservation_id, route_type, endpoints) = route_key(&self.reservation_id, &self.route);
        ActionKey::CreateRoute {
            reservation_id,
            route_type,
            endpoints,
        }
    }

    pub fn stage(&self) -> Stage {
        Stage::RecreateRoutes
    }

    /// Same route seen from two resources: an endpoint view wins over a
    /// segment view, and the segment ports accumulate
    pub fn merge(&mut self, other: CreateRoute) {
        if other.route.kind == RouteKind::Endpoint {
            self.route.kind = RouteKind::Endpoint;
        }
        for port in other.route.associated_ports {
            if !self.route.associated_ports.contains(&port) {
                self.route.associated_ports.push(port);
            }
        }
    }

    /// Route with endpoints translated to their migrated names
    pub fn rewritten(&self, ctx: &MigrationContext) -> LogicalRoute {
        LogicalRoute {
            source: ctx.resolve(&self.route.source).to_string(),
            target: ctx.resolve(&self.route.target).to_string(),
            associated_ports: self
                .route
                .associated_ports
                .iter()
                .map(|port| ctx.resolve(port).to_string())
                .collect(),
            ..self.route.clone()
        }
    }

    pub async fn execute(&mut self, ctx: &mut MigrationContext) -> Result<(), ActionError> {
        let route = self.rewritten(ctx);
        ctx.operations
            .routes
            .create_route(&self.reservation_id, &route)
            .await?;

        if route.kind == RouteKind::Segment && !route.associated_ports.is_empty() {
            ctx.operations
                .routes
                .add_resources_to_reservation(&self.reservation_id, &route.associated_ports)
                .await
                .map_err(|source| ActionError::Incomplete {
                    applied: format!("create_route({}<->{})", route.source, route.target),
                    source,
                })?;
        }
        Ok(())
    }
}

impl fmt::Display for CreateRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Create Route: {}", self.route)?;
        if self.route.kind == RouteKind::Segment {
            write!(f, " via {}", self.route.associated_ports.join(", "))?;
        }
        Ok(())
    }
}
