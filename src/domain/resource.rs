// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory Resources, Ports and Resource Pairs
//!
//! A [`Resource`] is an inventory entry (switch, chassis, L1 device) with its
//! ports and the configuration attached to it: logical routes and
//! connectors. A [`ResourcesPair`] binds a source resource to the
//! destination its configuration moves to.
//!
//! Association works over the [`AssociateItem`] capability set, which ports,
//! resources and bare route/connector endpoints all provide. Identity for
//! association purposes is the item name.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::route::{Connector, LogicalRoute};

/// Capability set used by the association engine
pub trait AssociateItem {
    /// Full inventory name (e.g. `SW1/Chassis1/Port1`)
    fn name(&self) -> &str;

    /// Structured address (e.g. `CH01/M01/SM01/P01`), if any
    fn address(&self) -> Option<&str>;

    /// Inventory family
    fn family(&self) -> Option<&str>;

    /// Inventory model
    fn model(&self) -> Option<&str>;
}

/// Physical port of a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    /// Full name of the peer port, if cabled
    #[serde(default)]
    pub connected_to: Option<String>,
    #[serde(default)]
    pub connection_weight: Option<String>,
}

impl Port {
    /// Create an unconnected port
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
            family: None,
            model: None,
            connected_to: None,
            connection_weight: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_family_model(mut self, family: impl Into<String>, model: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self.model = Some(model.into());
        self
    }

    pub fn connected_to(mut self, peer: impl Into<String>) -> Self {
        self.connected_to = Some(peer.into());
        self
    }

    pub fn with_weight(mut self, weight: impl Into<String>) -> Self {
        self.connection_weight = Some(weight.into());
        self
    }

    /// Whether the port is cabled to anything
    pub fn is_connected(&self) -> bool {
        self.connected_to.as_deref().is_some_and(|peer| !peer.is_empty())
    }
}

impl AssociateItem for Port {
    fn name(&self) -> &str {
        &self.name
    }

    fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Port: {}=>{}",
            self.name,
            self.connected_to.as_deref().unwrap_or("None")
        )
    }
}

/// A route or connector endpoint, associated by name only
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Endpoint(String);

impl Endpoint {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AssociateItem for Endpoint {
    fn name(&self) -> &str {
        &self.0
    }

    fn address(&self) -> Option<&str> {
        None
    }

    fn family(&self) -> Option<&str> {
        None
    }

    fn model(&self) -> Option<&str> {
        None
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inventory resource with the configuration attached to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub driver: Option<String>,
    /// False for a destination stub that is not materialized yet
    #[serde(default = "default_exists")]
    pub exists: bool,
    #[serde(default)]
    pub ports: Vec<Port>,
    #[serde(default)]
    pub attributes: IndexMap<String, String>,
    #[serde(default)]
    pub associated_logical_routes: Vec<LogicalRoute>,
    #[serde(default)]
    pub associated_connectors: Vec<Connector>,
}

fn default_exists() -> bool {
    true
}

impl Resource {
    /// Create an existing resource with no ports
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
            family: None,
            model: None,
            driver: None,
            exists: true,
            ports: Vec::new(),
            attributes: IndexMap::new(),
            associated_logical_routes: Vec::new(),
            associated_connectors: Vec::new(),
        }
    }

    /// Create a destination stub (not yet in inventory)
    pub fn stub(name: impl Into<String>) -> Self {
        Self {
            exists: false,
            ..Self::new(name)
        }
    }

    pub fn with_family_model(mut self, family: impl Into<String>, model: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self.model = Some(model.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = Some(driver.into());
        self
    }

    pub fn with_port(mut self, port: Port) -> Self {
        self.ports.push(port);
        self
    }

    pub fn with_route(mut self, route: LogicalRoute) -> Self {
        self.associated_logical_routes.push(route);
        self
    }

    pub fn with_connector(mut self, connector: Connector) -> Self {
        self.associated_connectors.push(connector);
        self
    }

    /// Find a port by full name
    pub fn port(&self, name: &str) -> Option<&Port> {
        self.ports.iter().find(|port| port.name == name)
    }
}

impl AssociateItem for Resource {
    fn name(&self) -> &str {
        &self.name
    }

    fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = [
            Some(self.name.as_str()),
            self.family.as_deref(),
            self.model.as_deref(),
            self.driver.as_deref(),
        ];
        let rendered: Vec<&str> = parts.iter().map(|part| part.unwrap_or("*")).collect();
        f.write_str(&rendered.join("/"))
    }
}

/// Source resource and the destination its configuration moves to
///
/// The pair owns both resources. The associator and the action initializers
/// borrow it, so ports, routes and connectors populated by earlier loading
/// stages are what they see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcesPair {
    src: Resource,
    dst: Resource,
}

impl ResourcesPair {
    pub fn new(src: Resource, dst: Resource) -> Self {
        Self { src, dst }
    }

    pub fn src(&self) -> &Resource {
        &self.src
    }

    pub fn dst(&self) -> &Resource {
        &self.dst
    }

    pub fn src_mut(&mut self) -> &mut Resource {
        &mut self.src
    }

    pub fn dst_mut(&mut self) -> &mut Resource {
        &mut self.dst
    }

    pub fn into_parts(self) -> (Resource, Resource) {
        (self.src, self.dst)
    }
}

impl fmt::Display for ResourcesPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourcesPair({}=>{})", self.src, self.dst)
    }
}
