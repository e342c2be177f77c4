// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Resource Pair Invariants
//!
//! All checks run eagerly while pairs are built, before association or
//! action building begins. A failed check aborts the migration before any
//! external mutation.
//!
//! # Invariants
//!
//! 1. Source and destination names differ
//! 2. The source exists in inventory
//! 3. A destination stub does not collide with an existing resource name
//! 4. No resource takes part in more than one pair

use std::collections::HashSet;

use super::resource::ResourcesPair;
use crate::errors::ValidationError;

/// Validation result for pair invariants
pub type ValidationResult = Result<(), ValidationError>;

/// Source and destination must be different resources
pub fn validate_distinct_names(pair: &ResourcesPair) -> ValidationResult {
    if pair.src().name == pair.dst().name {
        return Err(ValidationError::SameName(pair.src().name.clone()));
    }
    Ok(())
}

/// Source must already be in inventory
pub fn validate_source_exists(pair: &ResourcesPair) -> ValidationResult {
    if !pair.src().exists {
        return Err(ValidationError::SourceMissing(pair.src().name.clone()));
    }
    Ok(())
}

/// A stub destination must not take an inventory name already in use
///
/// # Parameters
/// - `existing_names`: names of inventory resources sharing the stub's
///   family and model
pub fn validate_destination_name_free<'a, I>(pair: &ResourcesPair, existing_names: I) -> ValidationResult
where
    I: IntoIterator<Item = &'a str>,
{
    let dst = pair.dst();
    if dst.exists {
        return Ok(());
    }
    if existing_names.into_iter().any(|name| name == dst.name) {
        return Err(ValidationError::DestinationExists(dst.name.clone()));
    }
    Ok(())
}

/// Each resource may appear in one pair only
///
/// `handled` accumulates names across every pair of one migration run.
pub fn validate_not_reused(pair: &ResourcesPair, handled: &mut HashSet<String>) -> ValidationResult {
    for resource in [pair.src(), pair.dst()] {
        if !handled.insert(resource.name.clone()) {
            return Err(ValidationError::ResourceReused(resource.name.clone()));
        }
    }
    Ok(())
}

/// Run every pair invariant
pub fn validate_pair<'a, I>(
    pair: &ResourcesPair,
    existing_names: I,
    handled: &mut HashSet<String>,
) -> ValidationResult
where
    I: IntoIterator<Item = &'a str>,
{
    validate_distinct_names(pair)?;
    validate_source_exists(pair)?;
    validate_destination_name_free(pair, existing_names)?;
    validate_not_reused(pair, handled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Resource;

    #[test]
    fn test_same_name_rejected() {
        let pair = ResourcesPair::new(Resource::new("SW1"), Resource::new("SW1"));
        assert_eq!(
            validate_distinct_names(&pair),
            Err(ValidationError::SameName("SW1".to_string()))
        );
    }

    #[test]
    fn test_missing_source_rejected() {
        let pair = ResourcesPair::new(Resource::stub("SW1"), Resource::new("SW2"));
        assert!(matches!(
            validate_source_exists(&pair),
            Err(ValidationError::SourceMissing(_))
        ));
    }

    #[test]
    fn test_stub_name_collision() {
        let pair = ResourcesPair::new(Resource::new("SW1"), Resource::stub("new_SW1"));
        assert!(validate_destination_name_free(&pair, ["SW1", "new_SW1"]).is_err());
        assert!(validate_destination_name_free(&pair, ["SW1"]).is_ok());
    }

    #[test]
    fn test_existing_destination_skips_collision_check() {
        let pair = ResourcesPair::new(Resource::new("SW1"), Resource::new("SW2"));
        assert!(validate_destination_name_free(&pair, ["SW2"]).is_ok());
    }

    #[test]
    fn test_resource_reused_across_pairs() {
        let mut handled = HashSet::new();
        let first = ResourcesPair::new(Resource::new("SW1"), Resource::new("SW2"));
        let second = ResourcesPair::new(Resource::new("SW3"), Resource::new("SW2"));

        assert!(validate_not_reused(&first, &mut handled).is_ok());
        assert_eq!(
            validate_not_reused(&second, &mut handled),
            Err(ValidationError::ResourceReused("SW2".to_string()))
        );
    }

    #[test]
    fn test_validate_pair_runs_all_checks() {
        let mut handled = HashSet::new();
        let pair = ResourcesPair::new(Resource::new("SW1"), Resource::stub("new_SW1"));
        assert!(validate_pair(&pair, Vec::<&str>::new(), &mut handled).is_ok());
        assert!(handled.contains("SW1"));
        assert!(handled.contains("new_SW1"));
    }
}
