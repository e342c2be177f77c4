// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-migration
//!
//! Deterministic inventories and rule tables shared by the integration
//! tests. Fixtures are the only place that builds the switch scenarios.

#![allow(dead_code)]

use std::sync::Arc;

use cim_migration::association::{AssociationConfig, AssociationRules};
use cim_migration::domain::{Connector, Direction, LogicalRoute, Port, Resource, ResourcesPair, Scope};
use cim_migration::operations::{Operations, RecordingOperations};

pub const RESERVATION_ID: &str = "01934f4a-3000-7000-8000-000000003000";
pub const BLUEPRINT: &str = "Lab Topology";

/// Rule table in the on-disk format
pub const RULES_YAML: &str = r#"
"Switch/Rome":
  chassis_port:
    family: ["Port"]
    address_pattern: ".*/CH(.*)/M(.*)/SM(.*)/P(.*)"
"*/*":
  port_number:
    name_pattern: "Port(\\d+)$"
"#;

pub fn chassis_rules() -> AssociationRules {
    AssociationRules::new()
        .with_rule(
            "*",
            "*",
            AssociationConfig::new("chassis_port").with_address_pattern(".*/CH(.*)/M(.*)/SM(.*)/P(.*)"),
        )
        .expect("Invalid chassis rule")
}

pub fn yaml_rules() -> AssociationRules {
    AssociationRules::from_yaml_str(RULES_YAML).expect("Invalid rule table")
}

/// `SW1/Chassis1/Port1` (CH01/M01/SM01/P01) connected to `OTHER/Port9`
pub fn scenario_source() -> Resource {
    Resource::new("SW1")
        .with_address("192.168.1.1")
        .with_family_model("Switch", "Rome")
        .with_port(
            Port::new("SW1/Chassis1/Port1")
                .with_address("192.168.1.1/CH01/M01/SM01/P01")
                .with_family_model("Port", "Rome Port")
                .connected_to("OTHER/Port9"),
        )
}

/// `SW1_NEW/Module1/SubModule1/Port1` (CH01/M01/SM01/P01), unconnected
pub fn scenario_destination() -> Resource {
    Resource::new("SW1_NEW")
        .with_address("192.168.1.2")
        .with_family_model("Switch", "Rome")
        .with_port(
            Port::new("SW1_NEW/Module1/SubModule1/Port1")
                .with_address("192.168.1.2/CH01/M01/SM01/P01")
                .with_family_model("Port", "Rome Port"),
        )
}

pub fn scenario_pair() -> ResourcesPair {
    ResourcesPair::new(scenario_source(), scenario_destination())
}

/// Switch with `count` ports named `{name}/Port{n}`, each connected to `HOST/nic{n}`
pub fn connected_switch(name: &str, count: usize) -> Resource {
    (1..=count).fold(Resource::new(name), |resource, n| {
        resource.with_port(Port::new(format!("{name}/Port{n}")).connected_to(format!("HOST/nic{n}")))
    })
}

/// Switch with `count` unconnected ports named `{name}/Port{n}`
pub fn empty_switch(name: &str, count: usize) -> Resource {
    (1..=count).fold(Resource::new(name), |resource, n| {
        resource.with_port(Port::new(format!("{name}/Port{n}")))
    })
}

pub fn reservation() -> Scope {
    Scope::Reservation(RESERVATION_ID.to_string())
}

pub fn blueprint() -> Scope {
    Scope::Blueprint(BLUEPRINT.to_string())
}

/// Source switch carrying a reservation route, a reservation connector and a blueprint route
pub fn configured_switch() -> Resource {
    connected_switch("SW1", 3)
        .with_route(LogicalRoute::new("SW1/Port1", "SRV/Port1", reservation(), Direction::Bi).with_alias("uplink"))
        .with_connector(Connector::new("SW1/Port2", "SRV/Port2", reservation(), Direction::Bi))
        .with_route(LogicalRoute::new("SW1/Port3", "SRV/Port3", blueprint(), Direction::Uni))
}

/// Backend seeded with the configured switch and its reservation state
pub fn configured_backend() -> RecordingOperations {
    let src = configured_switch();
    let route = src.associated_logical_routes[0].clone();
    let connector = src.associated_connectors[0].clone();
    RecordingOperations::new()
        .with_resource(src)
        .with_resource(empty_switch("SW2", 3))
        .with_route(RESERVATION_ID, route)
        .with_connector(RESERVATION_ID, connector)
        .with_blueprint_route(
            BLUEPRINT,
            LogicalRoute::new("SW1/Port3", "SRV/Port3", blueprint(), Direction::Uni),
        )
}

pub fn operations(backend: &Arc<RecordingOperations>) -> Operations {
    Operations::from_backend(backend.clone())
}

/// Install a test subscriber once; repeated calls are ignored
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
