// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service Layer
//!
//! Application service that turns source resource names into an executed
//! migration, coordinating the platform collaborators, the association
//! engine and the action engine.
//!
//! # Example
//!
//! ```rust,ignore
//! use cim_migration::service::{DestinationSpec, MigrationService, PlatformMigrationService};
//!
//! let service = PlatformMigrationService::new(operations, Arc::new(rules), config);
//! let report = service
//!     .migrate(&["SW1".to_string()], &[DestinationSpec::new_resource("Switch", "Rome")])
//!     .await?;
//! println!("{}", report.summary());
//! ```

pub mod migration;

pub use migration::{DestinationSpec, MigrationPlan, MigrationService, PlatformMigrationService};
