// Copyright (c) 2025 - Cowboy AI, Inc.
//! Recording Collaborator
//!
//! In-memory stand-in for the platform. Every applied call is recorded in
//! order, the inventory/reservation/blueprint state is updated, and selected
//! calls can be made to fail or stall. Used as the dry-run backend and as the
//! test double.

use async_trait::async_trait;
use indexmap::IndexMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::debug;

use super::{
    BlueprintOperations, ConnectionOperations, OperationResult, ResourceOperations,
    RouteOperations,
};
use crate::domain::{endpoint_pair, Connector, Direction, LogicalRoute, Port, Resource};
use crate::errors::OperationError;

/// One applied collaborator call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub operation: String,
    pub arguments: Vec<String>,
}

impl fmt::Display for RecordedCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.operation, self.arguments.join(", "))
    }
}

#[derive(Debug, Clone)]
struct FailureRule {
    operation: String,
    argument: Option<String>,
}

impl FailureRule {
    fn matches(&self, operation: &str, arguments: &[String]) -> bool {
        self.operation == operation
            && self
                .argument
                .as_ref()
                .map_or(true, |wanted| arguments.iter().any(|arg| arg == wanted))
    }
}

#[derive(Debug, Default)]
struct Blueprint {
    routes: Vec<LogicalRoute>,
    connectors: Vec<Connector>,
}

#[derive(Debug, Default)]
struct Reservation {
    resources: Vec<String>,
    routes: Vec<LogicalRoute>,
    connectors: Vec<Connector>,
}

#[derive(Debug, Default)]
struct State {
    resources: IndexMap<String, Resource>,
    reservations: IndexMap<String, Reservation>,
    blueprints: IndexMap<String, Blueprint>,
    calls: Vec<RecordedCall>,
    failures: Vec<FailureRule>,
    delays: IndexMap<String, Duration>,
}

/// In-memory platform that records every applied call
#[derive(Debug, Default)]
pub struct RecordingOperations {
    state: Mutex<State>,
}

impl RecordingOperations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the inventory
    pub fn with_resource(self, resource: Resource) -> Self {
        self.lock().resources.insert(
            resource.name.clone(),
            Resource {
                exists: true,
                ..resource
            },
        );
        self
    }

    /// Seed a reservation route
    pub fn with_route(self, reservation_id: &str, route: LogicalRoute) -> Self {
        self.lock()
            .reservations
            .entry(reservation_id.to_string())
            .or_default()
            .routes
            .push(route);
        self
    }

    /// Seed a reservation connector
    pub fn with_connector(self, reservation_id: &str, connector: Connector) -> Self {
        self.lock()
            .reservations
            .entry(reservation_id.to_string())
            .or_default()
            .connectors
            .push(connector);
        self
    }

    /// Seed an empty blueprint
    pub fn with_blueprint(self, name: &str) -> Self {
        self.lock().blueprints.entry(name.to_string()).or_default();
        self
    }

    /// Seed a blueprint route
    pub fn with_blueprint_route(self, name: &str, route: LogicalRoute) -> Self {
        self.lock()
            .blueprints
            .entry(name.to_string())
            .or_default()
            .routes
            .push(route);
        self
    }

    /// Fail every call to `operation`
    pub fn fail_calls(self, operation: &str) -> Self {
        self.lock().failures.push(FailureRule {
            operation: operation.to_string(),
            argument: None,
        });
        self
    }

    /// Fail calls to `operation` that carry `argument`
    pub fn fail_on(self, operation: &str, argument: &str) -> Self {
        self.lock().failures.push(FailureRule {
            operation: operation.to_string(),
            argument: Some(argument.to_string()),
        });
        self
    }

    /// Stall every call to `operation`
    pub fn delay_calls(self, operation: &str, delay: Duration) -> Self {
        self.lock().delays.insert(operation.to_string(), delay);
        self
    }

    /// Applied calls in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// Applied calls rendered as `operation(arg, ...)`
    pub fn call_lines(&self) -> Vec<String> {
        self.lock().calls.iter().map(ToString::to_string).collect()
    }

    /// Current inventory record
    pub fn resource(&self, name: &str) -> Option<Resource> {
        self.lock().resources.get(name).cloned()
    }

    /// Current routes of a reservation
    pub fn reservation_routes(&self, reservation_id: &str) -> Vec<LogicalRoute> {
        self.lock()
            .reservations
            .get(reservation_id)
            .map(|reservation| reservation.routes.clone())
            .unwrap_or_default()
    }

    /// Current connectors of a reservation
    pub fn reservation_connectors(&self, reservation_id: &str) -> Vec<Connector> {
        self.lock()
            .reservations
            .get(reservation_id)
            .map(|reservation| reservation.connectors.clone())
            .unwrap_or_default()
    }

    /// Resources added to a reservation
    pub fn reservation_resources(&self, reservation_id: &str) -> Vec<String> {
        self.lock()
            .reservations
            .get(reservation_id)
            .map(|reservation| reservation.resources.clone())
            .unwrap_or_default()
    }

    /// Current routes and connectors of a blueprint
    pub fn blueprint(&self, name: &str) -> Option<(Vec<LogicalRoute>, Vec<Connector>)> {
        self.lock()
            .blueprints
            .get(name)
            .map(|blueprint| (blueprint.routes.clone(), blueprint.connectors.clone()))
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Apply the delay and failure rules, then record the call and mutate state
    async fn apply<T>(
        &self,
        operation: &str,
        arguments: Vec<String>,
        mutate: impl FnOnce(&mut State) -> OperationResult<T>,
    ) -> OperationResult<T> {
        let delay = self.lock().delays.get(operation).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.lock();
        if state
            .failures
            .iter()
            .any(|rule| rule.matches(operation, &arguments))
        {
            debug!(operation, ?arguments, "Injected failure");
            return Err(OperationError::Rejected(format!(
                "{operation}({})",
                arguments.join(", ")
            )));
        }

        let value = mutate(&mut state)?;
        let call = RecordedCall {
            operation: operation.to_string(),
            arguments,
        };
        debug!(call = %call, "Recorded call");
        state.calls.push(call);
        Ok(value)
    }
}

fn opt(value: Option<&str>) -> String {
    value.unwrap_or("None").to_string()
}

fn find_port_mut<'a>(
    resources: &'a mut IndexMap<String, Resource>,
    port: &str,
) -> Option<&'a mut Port> {
    resources
        .values_mut()
        .flat_map(|resource| resource.ports.iter_mut())
        .find(|candidate| candidate.name == port)
}

#[async_trait]
impl ResourceOperations for RecordingOperations {
    async fn get_details(&self, name: &str) -> OperationResult<Resource> {
        self.lock()
            .resources
            .get(name)
            .cloned()
            .ok_or_else(|| OperationError::NotFound(name.to_string()))
    }

    async fn list_names(&self, family: Option<&str>, model: Option<&str>) -> OperationResult<Vec<String>> {
        Ok(self
            .lock()
            .resources
            .values()
            .filter(|resource| resource.family.as_deref() == family && resource.model.as_deref() == model)
            .map(|resource| resource.name.clone())
            .collect())
    }

    async fn create(&self, resource: &Resource) -> OperationResult<()> {
        self.apply("create", vec![resource.to_string()], |state| {
            if state.resources.contains_key(&resource.name) {
                return Err(OperationError::Rejected(format!(
                    "Resource {} already exists",
                    resource.name
                )));
            }
            state.resources.insert(
                resource.name.clone(),
                Resource {
                    exists: true,
                    ..resource.clone()
                },
            );
            Ok(())
        })
        .await
    }

    async fn autoload(&self, name: &str) -> OperationResult<()> {
        self.apply("autoload", vec![name.to_string()], |state| {
            state
                .resources
                .contains_key(name)
                .then_some(())
                .ok_or_else(|| OperationError::NotFound(name.to_string()))
        })
        .await
    }

    async fn sync_from_device(&self, name: &str) -> OperationResult<()> {
        self.apply("sync_from_device", vec![name.to_string()], |state| {
            state
                .resources
                .contains_key(name)
                .then_some(())
                .ok_or_else(|| OperationError::NotFound(name.to_string()))
        })
        .await
    }

    async fn set_attribute(&self, name: &str, key: &str, value: &str) -> OperationResult<()> {
        let arguments = vec![name.to_string(), key.to_string(), value.to_string()];
        self.apply("set_attribute", arguments, |state| {
            let resource = state
                .resources
                .get_mut(name)
                .ok_or_else(|| OperationError::NotFound(name.to_string()))?;
            resource.attributes.insert(key.to_string(), value.to_string());
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl ConnectionOperations for RecordingOperations {
    async fn update_connection(
        &self,
        port: &str,
        connected_to: Option<&str>,
        weight: Option<&str>,
    ) -> OperationResult<()> {
        let arguments = vec![port.to_string(), opt(connected_to), opt(weight)];
        self.apply("update_connection", arguments, |state| {
            if let Some(local) = find_port_mut(&mut state.resources, port) {
                local.connected_to = connected_to.map(str::to_string);
                local.connection_weight = weight.map(str::to_string);
            }
            if let Some(peer) = connected_to.and_then(|peer| find_port_mut(&mut state.resources, peer)) {
                peer.connected_to = Some(port.to_string());
                peer.connection_weight = weight.map(str::to_string);
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl RouteOperations for RecordingOperations {
    async fn create_route(&self, reservation_id: &str, route: &LogicalRoute) -> OperationResult<()> {
        let arguments = vec![
            reservation_id.to_string(),
            route.source.clone(),
            route.target.clone(),
            route.route_type.to_string(),
        ];
        self.apply("create_route", arguments, |state| {
            let routes = &mut state
                .reservations
                .entry(reservation_id.to_string())
                .or_default()
                .routes;
            routes.retain(|existing| existing.endpoints() != route.endpoints());
            routes.push(route.clone());
            Ok(())
        })
        .await
    }

    async fn remove_route(
        &self,
        reservation_id: &str,
        source: &str,
        target: &str,
        route_type: Direction,
    ) -> OperationResult<()> {
        let arguments = vec![
            reservation_id.to_string(),
            source.to_string(),
            target.to_string(),
            route_type.to_string(),
        ];
        self.apply("remove_route", arguments, |state| {
            if let Some(reservation) = state.reservations.get_mut(reservation_id) {
                let key = endpoint_pair(source, target, route_type);
                reservation.routes.retain(|route| route.endpoints() != key);
            }
            Ok(())
        })
        .await
    }

    async fn update_connector(&self, reservation_id: &str, connector: &Connector) -> OperationResult<()> {
        let arguments = vec![
            reservation_id.to_string(),
            connector.source.clone(),
            connector.target.clone(),
            connector.direction.to_string(),
        ];
        self.apply("update_connector", arguments, |state| {
            let connectors = &mut state
                .reservations
                .entry(reservation_id.to_string())
                .or_default()
                .connectors;
            connectors.retain(|existing| existing.endpoints() != connector.endpoints());
            connectors.push(connector.clone());
            Ok(())
        })
        .await
    }

    async fn remove_connector(&self, reservation_id: &str, source: &str, target: &str) -> OperationResult<()> {
        let arguments = vec![reservation_id.to_string(), source.to_string(), target.to_string()];
        self.apply("remove_connector", arguments, |state| {
            if let Some(reservation) = state.reservations.get_mut(reservation_id) {
                let key = endpoint_pair(source, target, Direction::Bi);
                reservation.connectors.retain(|connector| {
                    endpoint_pair(&connector.source, &connector.target, Direction::Bi) != key
                });
            }
            Ok(())
        })
        .await
    }

    async fn add_resources_to_reservation(
        &self,
        reservation_id: &str,
        names: &[String],
    ) -> OperationResult<()> {
        let mut arguments = vec![reservation_id.to_string()];
        arguments.extend(names.iter().cloned());
        self.apply("add_resources_to_reservation", arguments, |state| {
            let resources = &mut state
                .reservations
                .entry(reservation_id.to_string())
                .or_default()
                .resources;
            for name in names {
                if !resources.contains(name) {
                    resources.push(name.clone());
                }
            }
            Ok(())
        })
        .await
    }

    async fn list_routes(&self, reservation_id: &str) -> OperationResult<Vec<LogicalRoute>> {
        Ok(self.reservation_routes(reservation_id))
    }

    async fn list_connectors(&self, reservation_id: &str) -> OperationResult<Vec<Connector>> {
        Ok(self.reservation_connectors(reservation_id))
    }
}

#[async_trait]
impl BlueprintOperations for RecordingOperations {
    async fn load_package(&self, blueprint: &str) -> OperationResult<()> {
        self.apply("load_package", vec![blueprint.to_string()], |state| {
            state
                .blueprints
                .contains_key(blueprint)
                .then_some(())
                .ok_or_else(|| OperationError::NotFound(blueprint.to_string()))
        })
        .await
    }

    async fn remove_route_or_connector(&self, blueprint: &str, source: &str, target: &str) -> OperationResult<()> {
        let arguments = vec![blueprint.to_string(), source.to_string(), target.to_string()];
        self.apply("remove_route_or_connector", arguments, |state| {
            let package = state
                .blueprints
                .get_mut(blueprint)
                .ok_or_else(|| OperationError::NotFound(blueprint.to_string()))?;
            let key = endpoint_pair(source, target, Direction::Bi);
            package
                .routes
                .retain(|route| endpoint_pair(&route.source, &route.target, Direction::Bi) != key);
            package.connectors.retain(|connector| {
                endpoint_pair(&connector.source, &connector.target, Direction::Bi) != key
            });
            Ok(())
        })
        .await
    }

    async fn add_route(&self, blueprint: &str, route: &LogicalRoute) -> OperationResult<()> {
        let arguments = vec![blueprint.to_string(), route.source.clone(), route.target.clone()];
        self.apply("add_route", arguments, |state| {
            let package = state
                .blueprints
                .get_mut(blueprint)
                .ok_or_else(|| OperationError::NotFound(blueprint.to_string()))?;
            let key = endpoint_pair(&route.source, &route.target, Direction::Bi);
            package
                .routes
                .retain(|existing| endpoint_pair(&existing.source, &existing.target, Direction::Bi) != key);
            package.routes.push(route.clone());
            Ok(())
        })
        .await
    }

    async fn add_connector(&self, blueprint: &str, connector: &Connector) -> OperationResult<()> {
        let arguments = vec![
            blueprint.to_string(),
            connector.source.clone(),
            connector.target.clone(),
        ];
        self.apply("add_connector", arguments, |state| {
            let package = state
                .blueprints
                .get_mut(blueprint)
                .ok_or_else(|| OperationError::NotFound(blueprint.to_string()))?;
            let key = endpoint_pair(&connector.source, &connector.target, Direction::Bi);
            package.connectors.retain(|existing| {
                endpoint_pair(&existing.source, &existing.target, Direction::Bi) != key
            });
            package.connectors.push(connector.clone());
            Ok(())
        })
        .await
    }

    async fn save_package(&self, blueprint: &str) -> OperationResult<()> {
        self.apply("save_package", vec![blueprint.to_string()], |_| Ok(()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Scope;

    fn reservation() -> Scope {
        Scope::Reservation("res-1".to_string())
    }

    #[tokio::test]
    async fn test_update_connection_is_symmetric() {
        let ops = RecordingOperations::new()
            .with_resource(Resource::new("SW1").with_port(Port::new("SW1/Port1")))
            .with_resource(Resource::new("HOST").with_port(Port::new("HOST/nic0")));

        ops.update_connection("SW1/Port1", Some("HOST/nic0"), None)
            .await
            .unwrap();

        let host = ops.resource("HOST").unwrap();
        assert_eq!(host.ports[0].connected_to.as_deref(), Some("SW1/Port1"));
        assert_eq!(
            ops.call_lines(),
            vec!["update_connection(SW1/Port1, HOST/nic0, None)"]
        );
    }

    #[tokio::test]
    async fn test_injected_failure_is_not_recorded() {
        let ops = RecordingOperations::new().fail_on("remove_route", "A/Port1");

        let result = ops
            .remove_route("res-1", "A/Port1", "B/Port1", Direction::Bi)
            .await;
        assert!(matches!(result, Err(OperationError::Rejected(_))));

        ops.remove_route("res-1", "C/Port1", "B/Port1", Direction::Bi)
            .await
            .unwrap();
        assert_eq!(ops.calls().len(), 1);
    }

    #[test]
    fn test_exists_uses_inventory() {
        let ops = RecordingOperations::new().with_resource(Resource::new("SW1"));
        assert!(tokio_test::block_on(ops.exists("SW1")).unwrap());
        assert!(!tokio_test::block_on(ops.exists("SW2")).unwrap());
        assert_eq!(
            tokio_test::block_on(ops.get_details("SW2")),
            Err(OperationError::NotFound("SW2".to_string()))
        );
    }

    #[tokio::test]
    async fn test_route_replacement() {
        let ops = RecordingOperations::new().with_route(
            "res-1",
            LogicalRoute::new("A/Port1", "B/Port1", reservation(), Direction::Bi),
        );

        ops.remove_route("res-1", "B/Port1", "A/Port1", Direction::Bi)
            .await
            .unwrap();
        assert!(ops.list_routes("res-1").await.unwrap().is_empty());

        let route = LogicalRoute::new("A2/Port1", "B/Port1", reservation(), Direction::Bi);
        ops.create_route("res-1", &route).await.unwrap();
        assert_eq!(ops.list_routes("res-1").await.unwrap(), vec![route]);
    }

    #[tokio::test]
    async fn test_blueprint_must_exist() {
        let ops = RecordingOperations::new().with_blueprint("bp");
        ops.load_package("bp").await.unwrap();
        assert_eq!(
            ops.load_package("missing").await,
            Err(OperationError::NotFound("missing".to_string()))
        );
    }
}
