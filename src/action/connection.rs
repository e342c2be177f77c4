// Copyright (c) 2025 - Cowboy AI, Inc.
//! Physical connection update

use std::fmt;
use tracing::{debug, warn};

use super::{ActionKey, MigrationContext, Stage};
use crate::domain::Port;
use crate::errors::ActionError;

/// Move a cable from a source port to its destination port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateConnection {
    src_port: Port,
    dst_port: Port,
    /// Port the destination gets connected to
    peer: Option<String>,
    /// Far end of the cable when both ends migrate together
    merged: Option<(Port, Port)>,
}

impl UpdateConnection {
    pub fn new(src_port: Port, dst_port: Port) -> Self {
        let peer = src_port.connected_to.clone();
        Self {
            src_port,
            dst_port,
            peer,
            merged: None,
        }
    }

    pub fn src_port(&self) -> &Port {
        &self.src_port
    }

    pub fn dst_port(&self) -> &Port {
        &self.dst_port
    }

    pub fn peer(&self) -> Option<&str> {
        self.peer.as_deref()
    }

    /// Unordered pair of the cable's current ends
    pub fn key(&self) -> ActionKey {
        let near = self.src_port.name.clone();
        let far = self.src_port.connected_to.clone().unwrap_or_default();
        if far < near {
            ActionKey::Connection(far, near)
        } else {
            ActionKey::Connection(near, far)
        }
    }

    pub fn stage(&self) -> Stage {
        Stage::UpdateConnections
    }

    /// Both ends of one cable are migrating: connect the two destinations
    pub fn merge(&mut self, other: UpdateConnection) {
        if other.src_port.name == self.src_port.name {
            debug!(port = %self.src_port.name, "Duplicate connection update dropped");
            return;
        }
        if self.peer.as_deref() != Some(other.src_port.name.as_str()) {
            warn!(
                port = %self.src_port.name,
                other = %other.src_port.name,
                "Merging connection updates of unrelated cables"
            );
            return;
        }
        self.peer = Some(other.dst_port.name.clone());
        self.merged = Some((other.src_port, other.dst_port));
    }

    pub async fn execute(&mut self, ctx: &mut MigrationContext) -> Result<(), ActionError> {
        ctx.operations
            .connections
            .update_connection(
                &self.dst_port.name,
                self.peer.as_deref(),
                self.src_port.connection_weight.as_deref(),
            )
            .await?;

        ctx.associations
            .insert(&self.src_port.name, &self.dst_port.name);
        if let Some((src, dst)) = &self.merged {
            ctx.associations.insert(&src.name, &dst.name);
        }
        Ok(())
    }
}

impl fmt::Display for UpdateConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Update Connection: {}=>{}",
            self.dst_port.name,
            self.peer.as_deref().unwrap_or("None")
        )
    }
}
