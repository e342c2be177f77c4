// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for migration operations
//!
//! Structural errors (association, configuration, validation) abort a
//! migration before any external mutation happens. Per-action failures are
//! [`ActionError`]s: they are caught by the executor, recorded and reported,
//! and never abort sibling actions.

use std::time::Duration;
use thiserror::Error;

/// Errors raised while associating source items with destination items
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssociationError {
    /// The pair has no usable association
    #[error("Cannot associate {src} to {dst}")]
    Unresolved { src: String, dst: String },

    /// Two source items resolve to the same destination item
    #[error("Destination {destination} is claimed by both {first} and {second}")]
    DestinationConflict {
        destination: String,
        first: String,
        second: String,
    },
}

/// Errors in the migration or association configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// Rule carries neither an address nor a name pattern
    #[error("Association rule {0} defines neither address_pattern nor name_pattern")]
    EmptyRule(String),

    /// Pattern does not compile
    #[error("Association rule {rule} has invalid pattern {pattern}: {reason}")]
    InvalidPattern {
        rule: String,
        pattern: String,
        reason: String,
    },

    /// YAML could not be parsed
    #[error("Configuration parse error: {0}")]
    Parse(String),

    /// Configuration file could not be read
    #[error("Configuration I/O error: {0}")]
    Io(String),

    /// Environment override has an unusable value
    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}

/// Resource pair validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("SRC and DST resources cannot have the same name {0}")]
    SameName(String),

    #[error("SRC resource {0} does not exist")]
    SourceMissing(String),

    #[error("Resource with name {0} already exists")]
    DestinationExists(String),

    #[error("Resource with name {0} already used in another migration pair")]
    ResourceReused(String),

    #[error("Number of DST resources ({destinations}) cannot exceed number of SRC resources ({sources})")]
    TooManyDestinations { sources: usize, destinations: usize },
}

/// Failures reported by an external collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Failure of a single action
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// A multi-step action stopped after part of it became visible
    #[error("{source} (after {applied})")]
    Incomplete {
        applied: String,
        source: OperationError,
    },
}

/// Top-level migration error
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Association error: {0}")]
    Association(#[from] AssociationError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Operation error: {0}")]
    Operation(#[from] OperationError),
}

/// Result type for migration operations
pub type MigrationResult<T> = Result<T, MigrationError>;

impl From<serde_yaml::Error> for ConfigurationError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigurationError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for ConfigurationError {
    fn from(err: std::io::Error) -> Self {
        ConfigurationError::Io(err.to_string())
    }
}
