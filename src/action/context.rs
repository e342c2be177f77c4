// Copyright (c) 2025 - Cowboy AI, Inc.
//! Migration run context
//!
//! Holds what actions share during one run: the collaborators and the
//! old → new association table. The executor borrows it mutably for the whole
//! run, so the table has a single writer. Port entries are added only by
//! connection updates that were applied.

use uuid::Uuid;

use crate::association::AssociationTable;
use crate::operations::Operations;

#[derive(Debug, Clone)]
pub struct MigrationContext {
    run_id: Uuid,
    pub operations: Operations,
    pub associations: AssociationTable,
}

impl MigrationContext {
    pub fn new(operations: Operations) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            operations,
            associations: AssociationTable::new(),
        }
    }

    /// Start from known renames, e.g. source → destination resource names
    pub fn with_associations(mut self, associations: AssociationTable) -> Self {
        self.associations = associations;
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Current name of an endpoint after migration
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.associations.resolve(name)
    }
}
