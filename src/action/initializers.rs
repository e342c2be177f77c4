// Copyright (c) 2025 - Cowboy AI, Inc.
//! Per-pair action initializers
//!
//! Each initializer looks at one [`ResourcesPair`] and produces the actions
//! for one concern. [`initialize_pair_actions`] gates on association
//! validity and merges them.

use indexmap::IndexMap;
use tracing::{debug, info};

use super::{
    ActionsContainer, CreateRoute, RemoveRoute, UpdateBlueprint, UpdateConnection, UpdateConnector,
};
use crate::association::Associator;
use crate::domain::{ResourcesPair, Scope};
use crate::errors::AssociationError;

/// Connection updates for every associated, connected source port
///
/// Destination ports that already carry a connection keep it unless
/// `override_connections` is set.
pub fn connection_actions(associator: &Associator<'_>, override_connections: bool) -> ActionsContainer {
    let mut container = ActionsContainer::new();
    for (src_port, dst_port) in associator.iter_pairs() {
        if dst_port.is_connected() && !override_connections {
            info!(
                port = %dst_port,
                "Destination port already connected, skipping"
            );
            continue;
        }
        container.add(UpdateConnection::new(src_port.clone(), dst_port.clone()));
    }
    container
}

/// Remove and recreate every reservation route of the source resource
pub fn route_actions(pair: &ResourcesPair) -> ActionsContainer {
    let mut container = ActionsContainer::new();
    for route in &pair.src().associated_logical_routes {
        let Some(reservation_id) = route.reservation_id() else {
            continue;
        };
        container.add(RemoveRoute::new(reservation_id, route.clone()));
        container.add(CreateRoute::new(reservation_id, route.clone()));
    }
    container
}

/// Update every reservation connector of the source resource
pub fn connector_actions(pair: &ResourcesPair) -> ActionsContainer {
    let mut container = ActionsContainer::new();
    for connector in &pair.src().associated_connectors {
        if let Some(reservation_id) = connector.reservation_id() {
            container.add(UpdateConnector::new(reservation_id, connector.clone()));
        }
    }
    container
}

/// One blueprint update per blueprint the source resource appears in
pub fn blueprint_actions(pair: &ResourcesPair) -> ActionsContainer {
    let src = pair.src();
    let mut blueprints: IndexMap<&str, UpdateBlueprint> = IndexMap::new();

    for route in &src.associated_logical_routes {
        if let Scope::Blueprint(name) = &route.scope {
            blueprints
                .entry(name.as_str())
                .or_insert_with(|| UpdateBlueprint::new(name.as_str()))
                .add_route(route.clone());
        }
    }
    for connector in &src.associated_connectors {
        if let Scope::Blueprint(name) = &connector.scope {
            blueprints
                .entry(name.as_str())
                .or_insert_with(|| UpdateBlueprint::new(name.as_str()))
                .add_connector(connector.clone());
        }
    }

    let mut container = ActionsContainer::new();
    container.append(blueprints.into_values());
    container
}

/// All actions for one pair
///
/// # Errors
/// [`AssociationError::Unresolved`] when the pair's association is not
/// valid, or the conflict that made it invalid.
pub fn initialize_pair_actions(
    associator: &Associator<'_>,
    override_connections: bool,
) -> Result<ActionsContainer, AssociationError> {
    let pair = associator.pair();
    associator.table()?;
    if !associator.valid() {
        return Err(AssociationError::Unresolved {
            src: pair.src().name.clone(),
            dst: pair.dst().name.clone(),
        });
    }

    let mut container = connection_actions(associator, override_connections);
    container.merge(route_actions(pair));
    container.merge(connector_actions(pair));
    container.merge(blueprint_actions(pair));
    debug!(pair = %pair, actions = container.len(), "Initialized actions");
    Ok(container)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::association::{AssociationConfig, AssociationRules};
    use crate::config::ChannelPreference;
    use crate::domain::{Connector, Direction, LogicalRoute, Port, Resource};

    fn rules() -> AssociationRules {
        AssociationRules::new()
            .with_rule("*", "*", AssociationConfig::new("port").with_name_pattern("Port(\\d+)$"))
            .unwrap()
    }

    fn pair() -> ResourcesPair {
        let src = Resource::new("SW1")
            .with_port(Port::new("SW1/Port1").connected_to("HOST/nic0"))
            .with_port(Port::new("SW1/Port2").connected_to("HOST/nic1"))
            .with_route(LogicalRoute::new(
                "SW1/Port1",
                "SRV/Port1",
                Scope::Reservation("res-1".to_string()),
                Direction::Bi,
            ))
            .with_route(LogicalRoute::new(
                "SW1/Port2",
                "SRV/Port2",
                Scope::Blueprint("bp".to_string()),
                Direction::Bi,
            ))
            .with_connector(Connector::new(
                "SW1/Port2",
                "SRV/Port3",
                Scope::Blueprint("bp".to_string()),
                Direction::Uni,
            ));
        let dst = Resource::new("SW2")
            .with_port(Port::new("SW2/Port1"))
            .with_port(Port::new("SW2/Port2").connected_to("HOST/nic9"));
        ResourcesPair::new(src, dst)
    }

    #[test]
    fn test_connected_destination_kept_without_override() {
        let pair = pair();
        let rules = rules();
        let associator = Associator::new(&pair, &rules, ChannelPreference::Address);

        assert_eq!(connection_actions(&associator, false).len(), 1);
        assert_eq!(connection_actions(&associator, true).len(), 2);
    }

    #[test]
    fn test_pair_actions() {
        let pair = pair();
        let rules = rules();
        let associator = Associator::new(&pair, &rules, ChannelPreference::Address);

        let container = initialize_pair_actions(&associator, false).unwrap();
        let lines: Vec<String> = container
            .sorted_actions()
            .iter()
            .map(|action| action.to_string())
            .collect();
        assert_eq!(
            lines,
            vec![
                "Remove Route: Route(SW1/Port1<->SRV/Port1, bi, Active)",
                "Update Connection: SW2/Port1=>HOST/nic0",
                "Create Route: Route(SW1/Port1<->SRV/Port1, bi, Active)",
                "Update Blueprint: bp (1 routes, 1 connectors)",
            ]
        );
    }

    #[test]
    fn test_invalid_association_is_rejected() {
        let src = Resource::new("SW1").with_port(Port::new("SW1/Port1").connected_to("HOST/nic0"));
        let pair = ResourcesPair::new(src, Resource::new("SW2"));
        let rules = rules();
        let associator = Associator::new(&pair, &rules, ChannelPreference::Address);

        assert_eq!(
            initialize_pair_actions(&associator, false),
            Err(AssociationError::Unresolved {
                src: "SW1".to_string(),
                dst: "SW2".to_string(),
            })
        );
    }
}
