// Copyright (c) 2025 - Cowboy AI, Inc.
//! External Collaborators
//!
//! The inventory, reservation and topology platform is reached only through
//! these traits. Every call is async and may fail with an [`OperationError`];
//! actions wrap the calls they make in the executor's timeout.
//!
//! ```text
//! Action::execute ──▶ Operations ──▶ ResourceOperations
//!                                ├─▶ ConnectionOperations
//!                                ├─▶ RouteOperations
//!                                └─▶ BlueprintOperations
//! ```
//!
//! [`RecordingOperations`] implements all four; it backs dry runs and tests.

pub mod recording;

pub use recording::{RecordedCall, RecordingOperations};

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{Connector, Direction, LogicalRoute, Resource};
use crate::errors::OperationError;

/// Result type for collaborator calls
pub type OperationResult<T> = Result<T, OperationError>;

/// Resource inventory
#[async_trait]
pub trait ResourceOperations: Send + Sync {
    /// Full inventory record, including ports and attributes
    async fn get_details(&self, name: &str) -> OperationResult<Resource>;

    /// Whether a resource with this name is in the inventory
    async fn exists(&self, name: &str) -> OperationResult<bool> {
        match self.get_details(name).await {
            Ok(_) => Ok(true),
            Err(OperationError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Names of inventory resources with the given family and model
    async fn list_names(&self, family: Option<&str>, model: Option<&str>) -> OperationResult<Vec<String>>;

    /// Create a resource from a stub
    async fn create(&self, resource: &Resource) -> OperationResult<()>;

    /// Discover the structure of a newly created resource
    async fn autoload(&self, name: &str) -> OperationResult<()>;

    /// Refresh an existing resource from its device
    async fn sync_from_device(&self, name: &str) -> OperationResult<()>;

    async fn set_attribute(&self, name: &str, key: &str, value: &str) -> OperationResult<()>;
}

/// Physical connections
#[async_trait]
pub trait ConnectionOperations: Send + Sync {
    /// Connect `port` to `connected_to`, or disconnect it when `None`
    async fn update_connection(
        &self,
        port: &str,
        connected_to: Option<&str>,
        weight: Option<&str>,
    ) -> OperationResult<()>;
}

/// Reservation routes and connectors
#[async_trait]
pub trait RouteOperations: Send + Sync {
    async fn create_route(&self, reservation_id: &str, route: &LogicalRoute) -> OperationResult<()>;

    async fn remove_route(
        &self,
        reservation_id: &str,
        source: &str,
        target: &str,
        route_type: Direction,
    ) -> OperationResult<()>;

    /// Create or update a connector
    async fn update_connector(&self, reservation_id: &str, connector: &Connector) -> OperationResult<()>;

    async fn remove_connector(&self, reservation_id: &str, source: &str, target: &str) -> OperationResult<()>;

    async fn add_resources_to_reservation(
        &self,
        reservation_id: &str,
        names: &[String],
    ) -> OperationResult<()>;

    /// Active and requested routes of a reservation
    async fn list_routes(&self, reservation_id: &str) -> OperationResult<Vec<LogicalRoute>>;

    async fn list_connectors(&self, reservation_id: &str) -> OperationResult<Vec<Connector>>;
}

/// Blueprint packages: load, edit, save
#[async_trait]
pub trait BlueprintOperations: Send + Sync {
    async fn load_package(&self, blueprint: &str) -> OperationResult<()>;

    async fn remove_route_or_connector(&self, blueprint: &str, source: &str, target: &str) -> OperationResult<()>;

    async fn add_route(&self, blueprint: &str, route: &LogicalRoute) -> OperationResult<()>;

    async fn add_connector(&self, blueprint: &str, connector: &Connector) -> OperationResult<()>;

    async fn save_package(&self, blueprint: &str) -> OperationResult<()>;
}

/// Handles to every collaborator a migration uses
#[derive(Clone)]
pub struct Operations {
    pub resources: Arc<dyn ResourceOperations>,
    pub connections: Arc<dyn ConnectionOperations>,
    pub routes: Arc<dyn RouteOperations>,
    pub blueprints: Arc<dyn BlueprintOperations>,
}

impl Operations {
    /// Use one backend for every collaborator
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: ResourceOperations
            + ConnectionOperations
            + RouteOperations
            + BlueprintOperations
            + 'static,
    {
        Self {
            resources: backend.clone(),
            connections: backend.clone(),
            routes: backend.clone(),
            blueprints: backend,
        }
    }
}

impl std::fmt::Debug for Operations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operations").finish_non_exhaustive()
    }
}
