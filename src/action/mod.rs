// Copyright (c) 2025 - Cowboy AI, Inc.
//! Action Orchestration
//!
//! Associations become a deduplicated, staged set of idempotent operations
//! against the platform.
//!
//! ```text
//! ResourcesPair ──initializers──▶ ActionsContainer (one per pair)
//!                                        │ merge by key
//!                                        ▼
//!                                 ActionsContainer
//!                                        │ stable sort by stage
//!                                        ▼
//!                                  ActionExecutor ──▶ ExecutionReport
//! ```
//!
//! # Stages
//!
//! | Stage | Actions |
//! |---|---|
//! | 1 `RemoveStale` | [`RemoveRoute`] |
//! | 2 `UpdateConnections` | [`UpdateConnection`] |
//! | 3 `RecreateRoutes` | [`CreateRoute`], [`UpdateConnector`] |
//! | 4 `UpdateBlueprints` | [`UpdateBlueprint`] |
//!
//! A later stage never starts before every action of the earlier stage has
//! finished: routes must see the connections' new port names, blueprints
//! must see the recreated routes.

pub mod blueprint;
pub mod connection;
pub mod connector;
pub mod container;
pub mod context;
pub mod executor;
pub mod initializers;
pub mod route;

pub use blueprint::UpdateBlueprint;
pub use connection::UpdateConnection;
pub use connector::UpdateConnector;
pub use container::ActionsContainer;
pub use context::MigrationContext;
pub use executor::{ActionExecutor, ActionOutcome, ExecutionReport};
pub use initializers::initialize_pair_actions;
pub use route::{CreateRoute, RemoveRoute};

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::domain::Direction;
use crate::errors::ActionError;

/// Execution stage; lower stages run first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    RemoveStale = 1,
    UpdateConnections = 2,
    RecreateRoutes = 3,
    UpdateBlueprints = 4,
}

impl Stage {
    pub fn priority(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::RemoveStale => "remove_stale",
            Stage::UpdateConnections => "update_connections",
            Stage::RecreateRoutes => "recreate_routes",
            Stage::UpdateBlueprints => "update_blueprints",
        };
        f.write_str(label)
    }
}

/// Deduplication key; equal keys merge into one action
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionKey {
    /// Unordered pair of cable ends
    Connection(String, String),
    RemoveRoute {
        reservation_id: String,
        route_type: Direction,
        endpoints: (String, String),
    },
    CreateRoute {
        reservation_id: String,
        route_type: Direction,
        endpoints: (String, String),
    },
    Connector {
        reservation_id: String,
        endpoints: (String, String),
    },
    Blueprint(String),
}

/// One idempotent operation against the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    UpdateConnection(UpdateConnection),
    RemoveRoute(RemoveRoute),
    CreateRoute(CreateRoute),
    UpdateConnector(UpdateConnector),
    UpdateBlueprint(UpdateBlueprint),
}

impl Action {
    pub fn key(&self) -> ActionKey {
        match self {
            Action::UpdateConnection(action) => action.key(),
            Action::RemoveRoute(action) => action.key(),
            Action::CreateRoute(action) => action.key(),
            Action::UpdateConnector(action) => action.key(),
            Action::UpdateBlueprint(action) => action.key(),
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Action::UpdateConnection(action) => action.stage(),
            Action::RemoveRoute(action) => action.stage(),
            Action::CreateRoute(action) => action.stage(),
            Action::UpdateConnector(action) => action.stage(),
            Action::UpdateBlueprint(action) => action.stage(),
        }
    }

    pub fn priority(&self) -> u8 {
        self.stage().priority()
    }

    /// Fold an action with the same key into this one
    pub fn merge(&mut self, other: Action) {
        match (self, other) {
            (Action::UpdateConnection(this), Action::UpdateConnection(other)) => this.merge(other),
            (Action::CreateRoute(this), Action::CreateRoute(other)) => this.merge(other),
            (Action::UpdateConnector(this), Action::UpdateConnector(other)) => this.merge(other),
            (Action::UpdateBlueprint(this), Action::UpdateBlueprint(other)) => this.merge(other),
            (Action::RemoveRoute(_), Action::RemoveRoute(_)) => {}
            (this, other) => warn!(
                action = %this,
                other = %other,
                "Cannot merge actions of different kinds"
            ),
        }
    }

    pub async fn execute(&mut self, ctx: &mut MigrationContext) -> Result<(), ActionError> {
        match self {
            Action::UpdateConnection(action) => action.execute(ctx).await,
            Action::RemoveRoute(action) => action.execute(ctx).await,
            Action::CreateRoute(action) => action.execute(ctx).await,
            Action::UpdateConnector(action) => action.execute(ctx).await,
            Action::UpdateBlueprint(action) => action.execute(ctx).await,
        }
    }

    /// Whether `error` leaves a state the action must undo
    pub fn triggers_rollback(&self, error: &ActionError) -> bool {
        match self {
            Action::UpdateConnector(action) => action.triggers_rollback(error),
            _ => false,
        }
    }

    pub async fn rollback(&self, ctx: &MigrationContext) -> Result<(), ActionError> {
        match self {
            Action::UpdateConnector(action) => action.rollback(ctx).await,
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::UpdateConnection(action) => fmt::Display::fmt(action, f),
            Action::RemoveRoute(action) => fmt::Display::fmt(action, f),
            Action::CreateRoute(action) => fmt::Display::fmt(action, f),
            Action::UpdateConnector(action) => fmt::Display::fmt(action, f),
            Action::UpdateBlueprint(action) => fmt::Display::fmt(action, f),
        }
    }
}

impl From<UpdateConnection> for Action {
    fn from(action: UpdateConnection) -> Self {
        Action::UpdateConnection(action)
    }
}

impl From<RemoveRoute> for Action {
    fn from(action: RemoveRoute) -> Self {
        Action::RemoveRoute(action)
    }
}

impl From<CreateRoute> for Action {
    fn from(action: CreateRoute) -> Self {
        Action::CreateRoute(action)
    }
}

impl From<UpdateConnector> for Action {
    fn from(action: UpdateConnector) -> Self {
        Action::UpdateConnector(action)
    }
}

impl From<UpdateBlueprint> for Action {
    fn from(action: UpdateBlueprint) -> Self {
        Action::UpdateBlueprint(action)
    }
}
