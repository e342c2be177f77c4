// Copyright (c) 2025 - Cowboy AI, Inc.
//! Reservation connector update
//!
//! Removes the old connector when its endpoints change, then sets the new
//! one. A failure between the two steps leaves the reservation without the
//! connector; that case is reported as [`ActionError::Incomplete`] and rolls
//! back by restoring the original.

use std::fmt;
use tracing::info;

use super::{ActionKey, MigrationContext, Stage};
use crate::domain::Connector;
use crate::errors::ActionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateConnector {
    reservation_id: String,
    connector: Connector,
}

impl UpdateConnector {
    pub fn new(reservation_id: impl Into<String>, connector: Connector) -> Self {
        Self {
            reservation_id: reservation_id.into(),
            connector,
        }
    }

    pub fn connector(&self) -> &Connector {
        &self.connector
    }

    pub fn key(&self) -> ActionKey {
        ActionKey::Connector {
            reservation_id: self.reservation_id.clone(),
            endpoints: self.connector.endpoints(),
        }
    }

    pub fn stage(&self) -> Stage {
        Stage::RecreateRoutes
    }

    /// Fill in details the canonical view is missing
    pub fn merge(&mut self, other: UpdateConnector) {
        if self.connector.alias.is_none() {
            self.connector.alias = other.connector.alias;
        }
        if self.connector.connector_type.is_none() {
            self.connector.connector_type = other.connector.connector_type;
        }
    }

    /// Connector with endpoints translated to their migrated names
    pub fn rewritten(&self, ctx: &MigrationContext) -> Connector {
        Connector {
            source: ctx.resolve(&self.connector.source).to_string(),
            target: ctx.resolve(&self.connector.target).to_string(),
            ..self.connector.clone()
        }
    }

    pub async fn execute(&mut self, ctx: &mut MigrationContext) -> Result<(), ActionError> {
        let connector = self.rewritten(ctx);
        let routes = &ctx.operations.routes;

        let moved = connector.endpoints() != self.connector.endpoints();
        if moved {
            routes
                .remove_connector(
                    &self.reservation_id,
                    &self.connector.source,
                    &self.connector.target,
                )
                .await?;
        }

        match routes.update_connector(&self.reservation_id, &connector).await {
            Ok(()) => Ok(()),
            Err(source) if moved => Err(ActionError::Incomplete {
                applied: format!(
                    "remove_connector({}<->{})",
                    self.connector.source, self.connector.target
                ),
                source,
            }),
            Err(source) => Err(source.into()),
        }
    }

    pub fn triggers_rollback(&self, error: &ActionError) -> bool {
        matches!(error, ActionError::Incomplete { .. })
    }

    /// Restore the original connector
    pub async fn rollback(&self, ctx: &MigrationContext) -> Result<(), ActionError> {
        info!(connector = %self.connector, "Restoring connector");
        ctx.operations
            .routes
            .update_connector(&self.reservation_id, &self.connector)
            .await?;
        Ok(())
    }
}

impl fmt::Display for UpdateConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Update Connector: {}", self.connector)
    }
}
