// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for the Actions Container
//!
//! Verifies that keyed insertion deduplicates by merging and that sorting
//! by stage is stable.

use cim_migration::action::{
    Action, ActionsContainer, CreateRoute, RemoveRoute, Stage, UpdateBlueprint, UpdateConnection,
};
use cim_migration::domain::{Direction, LogicalRoute, Port, Scope};
use proptest::prelude::*;
use std::collections::HashSet;

// ============================================================================
// Strategies
// ============================================================================

fn endpoint() -> impl Strategy<Value = String> {
    (0..4u8, 1..4u8).prop_map(|(device, port)| format!("DEV{device}/Port{port}"))
}

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Bi), Just(Direction::Uni)]
}

fn route() -> impl Strategy<Value = LogicalRoute> {
    (endpoint(), endpoint(), direction()).prop_map(|(source, target, direction)| {
        LogicalRoute::new(source, target, Scope::Reservation("res-1".to_string()), direction)
    })
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (endpoint(), endpoint(), endpoint()).prop_map(|(src, peer, dst)| {
            Action::from(UpdateConnection::new(Port::new(src).connected_to(peer), Port::new(dst)))
        }),
        route().prop_map(|route| Action::from(RemoveRoute::new("res-1", route))),
        route().prop_map(|route| Action::from(CreateRoute::new("res-1", route))),
        (0..3u8, route()).prop_map(|(index, route)| {
            Action::from(UpdateBlueprint::new(format!("bp{index}")).with_route(route))
        }),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Property: adding a duplicate leaves one entry equal to a.merge(a)
    #[test]
    fn prop_duplicate_merges(a in action()) {
        let mut container = ActionsContainer::new();
        container.add(a.clone());
        container.add(a.clone());

        let mut expected = a.clone();
        expected.merge(a.clone());
        prop_assert_eq!(container.len(), 1);
        prop_assert_eq!(container.get(&a.key()), Some(&expected));
    }

    /// Property: a reversed bidirectional route shares the key and merges
    #[test]
    fn prop_reversed_route_merges(source in endpoint(), target in endpoint(), alias in "[a-z]{1,8}") {
        let scope = Scope::Reservation("res-1".to_string());
        let forward = Action::from(CreateRoute::new(
            "res-1",
            LogicalRoute::new(source.clone(), target.clone(), scope.clone(), Direction::Bi),
        ));
        let reversed = Action::from(CreateRoute::new(
            "res-1",
            LogicalRoute::new(target, source, scope, Direction::Bi).with_alias(alias),
        ));
        prop_assert_eq!(forward.key(), reversed.key());

        let mut container = ActionsContainer::new();
        container.add(forward.clone());
        container.add(reversed.clone());

        let mut expected = forward.clone();
        expected.merge(reversed);
        prop_assert_eq!(container.len(), 1);
        prop_assert_eq!(container.get(&forward.key()), Some(&expected));
    }

    /// Property: the container never holds two actions with the same key
    #[test]
    fn prop_keys_are_unique(actions in prop::collection::vec(action(), 0..30)) {
        let container: ActionsContainer = actions.iter().cloned().collect();
        let keys: Vec<_> = container.sorted_actions().iter().map(|a| a.key()).collect();
        let unique: HashSet<_> = keys.iter().cloned().collect();
        prop_assert_eq!(unique.len(), keys.len());

        let distinct: HashSet<_> = actions.iter().map(|a| a.key()).collect();
        prop_assert_eq!(container.len(), distinct.len());
    }

    /// Property: sorted actions are ordered by stage
    #[test]
    fn prop_sorted_by_stage(actions in prop::collection::vec(action(), 0..30)) {
        let container: ActionsContainer = actions.into_iter().collect();
        let stages: Vec<Stage> = container.sorted_actions().iter().map(|action| action.stage()).collect();
        prop_assert!(stages.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    /// Property: within a stage, first-insertion order is preserved
    #[test]
    fn prop_sort_is_stable(actions in prop::collection::vec(action(), 0..30)) {
        let mut first_seen = Vec::new();
        for action in &actions {
            let key = action.key();
            if !first_seen.iter().any(|(seen, _)| *seen == key) {
                first_seen.push((key, action.stage()));
            }
        }
        let mut expected = Vec::new();
        for stage in [
            Stage::RemoveStale,
            Stage::UpdateConnections,
            Stage::RecreateRoutes,
            Stage::UpdateBlueprints,
        ] {
            expected.extend(
                first_seen
                    .iter()
                    .filter(|(_, seen)| *seen == stage)
                    .map(|(key, _)| key.clone()),
            );
        }

        let container: ActionsContainer = actions.into_iter().collect();
        let sorted: Vec<_> = container.sorted_actions().iter().map(|action| action.key()).collect();
        prop_assert_eq!(sorted, expected);
    }

    /// Property: distinct-stage actions sort the same regardless of insertion order
    #[test]
    fn prop_order_independent_across_stages(
        connection in (endpoint(), endpoint(), endpoint()),
        removed in route(),
        created in route(),
        blueprint in route(),
    ) {
        let (src, peer, dst) = connection;
        let actions = vec![
            Action::from(UpdateBlueprint::new("bp").with_route(blueprint)),
            Action::from(CreateRoute::new("res-1", created)),
            Action::from(UpdateConnection::new(Port::new(src).connected_to(peer), Port::new(dst))),
            Action::from(RemoveRoute::new("res-1", removed)),
        ];

        let forward: ActionsContainer = actions.iter().cloned().collect();
        let backward: ActionsContainer = actions.into_iter().rev().collect();
        let forward: Vec<String> = forward.sorted_actions().iter().map(|a| a.to_string()).collect();
        let backward: Vec<String> = backward.sorted_actions().iter().map(|a| a.to_string()).collect();
        prop_assert_eq!(forward, backward);
    }
}
