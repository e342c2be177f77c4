// Copyright (c) 2025 - Cowboy AI, Inc.
//! Migration Service
//!
//! Drives one migration end to end:
//!
//! ```text
//! define_pairs ──▶ validate every pair (no mutation yet)
//!      │
//!      ▼
//! prepare_pair ──▶ create stub / sync, copy attributes, load ports
//!      │
//!      ▼
//! initialize_actions ──▶ Associator per pair, merged ActionsContainer
//!      │
//!      ▼
//! execute ──▶ ActionExecutor ──▶ ExecutionReport
//! ```
//!
//! Structural failures (validation, association) abort before any action
//! runs. Per-action failures end up in the report.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::action::{
    initialize_pair_actions, ActionExecutor, ActionOutcome, ActionsContainer, ExecutionReport,
    MigrationContext,
};
use crate::association::{AssociationRuleLookup, AssociationTable, Associator};
use crate::config::MigrationConfig;
use crate::domain::{validate_pair, Resource, ResourcesPair};
use crate::errors::{MigrationResult, OperationError, ValidationError};
use crate::operations::Operations;

/// Requested destination for one source resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationSpec {
    /// Existing resource name, or the name for a new one
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub driver: Option<String>,
}

impl DestinationSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn new_resource(family: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            family: Some(family.into()),
            model: Some(model.into()),
            ..Self::default()
        }
    }

    pub fn with_driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = Some(driver.into());
        self
    }
}

/// Actions ready to run, plus the associations they were built from
///
/// `associations` is the planned port mapping and is informational only.
/// A run starts from `resources` alone; port entries reach the run context
/// when their connection update has been applied.
#[derive(Debug, Clone)]
pub struct MigrationPlan {
    pub actions: ActionsContainer,
    pub associations: AssociationTable,
    pub resources: AssociationTable,
}

/// Migration application service
#[async_trait]
pub trait MigrationService: Send + Sync {
    /// Build and validate pairs without touching the platform
    async fn define_pairs(
        &self,
        sources: &[String],
        destinations: &[DestinationSpec],
    ) -> MigrationResult<Vec<ResourcesPair>>;

    /// Materialize the destination and load both resources
    async fn prepare_pair(&self, pair: ResourcesPair) -> MigrationResult<ResourcesPair>;

    /// Associate every pair and merge their actions
    fn initialize_actions(&self, pairs: &[ResourcesPair]) -> MigrationResult<MigrationPlan>;

    /// Run a plan, reporting each outcome as it happens
    async fn execute(
        &self,
        plan: MigrationPlan,
        on_outcome: &mut (dyn for<'a> FnMut(&'a ActionOutcome) + Send),
    ) -> ExecutionReport;

    /// define → prepare → initialize → execute
    async fn migrate(
        &self,
        sources: &[String],
        destinations: &[DestinationSpec],
    ) -> MigrationResult<ExecutionReport> {
        let mut pairs = Vec::new();
        for pair in self.define_pairs(sources, destinations).await? {
            pairs.push(self.prepare_pair(pair).await?);
        }
        let plan = self.initialize_actions(&pairs)?;
        Ok(self.execute(plan, &mut |_: &ActionOutcome| {}).await)
    }
}

/// [`MigrationService`] over the platform collaborators
pub struct PlatformMigrationService {
    operations: Operations,
    rules: Arc<dyn AssociationRuleLookup>,
    config: MigrationConfig,
}

impl PlatformMigrationService {
    pub fn new(
        operations: Operations,
        rules: Arc<dyn AssociationRuleLookup>,
        config: MigrationConfig,
    ) -> Self {
        Self {
            operations,
            rules,
            config,
        }
    }

    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    async fn load_source(&self, name: &str) -> MigrationResult<Resource> {
        match self.operations.resources.get_details(name).await {
            Ok(resource) => Ok(Resource {
                exists: true,
                ..resource
            }),
            Err(OperationError::NotFound(_)) => Ok(Resource::stub(name)),
            Err(err) => Err(err.into()),
        }
    }

    async fn load_destination(&self, src: &Resource, spec: &DestinationSpec) -> MigrationResult<Resource> {
        if let Some(name) = &spec.name {
            if self.operations.resources.exists(name).await? {
                let resource = self.operations.resources.get_details(name).await?;
                return Ok(Resource {
                    exists: true,
                    ..resource
                });
            }
        }

        let name = spec
            .name
            .clone()
            .unwrap_or_else(|| format!("{}{}", self.config.name_prefix, src.name));
        Ok(Resource {
            address: src.address.clone(),
            family: spec.family.clone(),
            model: spec.model.clone(),
            driver: spec.driver.clone(),
            ..Resource::stub(name)
        })
    }

    /// Copy source attribute values onto destination attributes of the same name
    async fn copy_attributes(&self, src: &Resource, dst: &Resource) -> MigrationResult<()> {
        for (key, value) in &src.attributes {
            if dst.attributes.contains_key(key) {
                debug!(attribute = %key, "Sync attribute value");
                self.operations
                    .resources
                    .set_attribute(&dst.name, key, value)
                    .await?;
            } else {
                debug!(attribute = %key, destination = %dst.name, "No matching destination attribute");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl MigrationService for PlatformMigrationService {
    async fn define_pairs(
        &self,
        sources: &[String],
        destinations: &[DestinationSpec],
    ) -> MigrationResult<Vec<ResourcesPair>> {
        if destinations.len() > sources.len() {
            return Err(ValidationError::TooManyDestinations {
                sources: sources.len(),
                destinations: destinations.len(),
            }
            .into());
        }

        let mut pairs = Vec::with_capacity(sources.len());
        let mut handled = HashSet::new();
        for (index, source) in sources.iter().enumerate() {
            let spec = destinations
                .get(index)
                .or_else(|| destinations.last())
                .cloned()
                .unwrap_or_default();

            let src = self.load_source(source).await?;
            let dst = self.load_destination(&src, &spec).await?;
            let existing = if dst.exists {
                Vec::new()
            } else {
                self.operations
                    .resources
                    .list_names(dst.family.as_deref(), dst.model.as_deref())
                    .await?
            };

            let pair = ResourcesPair::new(src, dst);
            validate_pair(&pair, existing.iter().map(String::as_str), &mut handled)?;
            info!(pair = %pair, "Defined resource pair");
            pairs.push(pair);
        }
        Ok(pairs)
    }

    async fn prepare_pair(&self, pair: ResourcesPair) -> MigrationResult<ResourcesPair> {
        let (src, dst) = pair.into_parts();
        let resources = &self.operations.resources;

        if dst.exists {
            resources.sync_from_device(&dst.name).await?;
        } else {
            info!(resource = %dst, "Creating resource");
            resources.create(&dst).await?;
            resources.autoload(&dst.name).await?;
            let created = resources.get_details(&dst.name).await?;
            self.copy_attributes(&src, &created).await?;
        }

        let mut dst = resources.get_details(&dst.name).await?;
        dst.exists = true;
        let src = if src.ports.is_empty() {
            Resource {
                exists: true,
                ..resources.get_details(&src.name).await?
            }
        } else {
            src
        };
        Ok(ResourcesPair::new(src, dst))
    }

    fn initialize_actions(&self, pairs: &[ResourcesPair]) -> MigrationResult<MigrationPlan> {
        let mut actions = ActionsContainer::new();
        let mut associations = AssociationTable::new();
        let mut resources = AssociationTable::new();

        for pair in pairs {
            let associator = Associator::new(pair, self.rules.as_ref(), self.config.channel_preference);
            let container = initialize_pair_actions(&associator, self.config.override_connections)?;
            associations.extend(associator.table()?);
            resources.insert(&pair.src().name, &pair.dst().name);
            actions.merge(container);
        }

        info!(actions = actions.len(), "Initialized migration actions");
        associations.extend(&resources);
        Ok(MigrationPlan {
            actions,
            associations,
            resources,
        })
    }

    async fn execute(
        &self,
        plan: MigrationPlan,
        on_outcome: &mut (dyn for<'a> FnMut(&'a ActionOutcome) + Send),
    ) -> ExecutionReport {
        let mut ctx =
            MigrationContext::new(self.operations.clone()).with_associations(plan.resources);
        ActionExecutor::new(self.config.executor.clone())
            .execute_with(plan.actions, &mut ctx, on_outcome)
            .await
    }
}
