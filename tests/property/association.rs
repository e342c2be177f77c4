// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Association
//!
//! Generated switch pairs whose ports share chassis addresses must always
//! associate completely, whatever the ordering or number width.

use cim_migration::association::{AssociationConfig, AssociationRules, Associator};
use cim_migration::config::ChannelPreference;
use cim_migration::domain::{Port, Resource, ResourcesPair};
use proptest::prelude::*;

fn rules() -> AssociationRules {
    AssociationRules::new()
        .with_rule(
            "*",
            "*",
            AssociationConfig::new("chassis_port")
                .with_address_pattern(".*/CH(.*)/M(.*)/SM(.*)/P(.*)"),
        )
        .expect("Invalid chassis rule")
}

/// Source with `count` connected ports and a destination holding the same
/// chassis slots in `order`, plus `spare` unused ports
fn pair(count: usize, order: &[usize], spare: usize) -> ResourcesPair {
    let mut src = Resource::new("SRC").with_address("10.0.0.1");
    for index in 1..=count {
        src = src.with_port(
            Port::new(format!("SRC/Port{index}"))
                .with_address(format!("10.0.0.1/CH1/M1/SM1/P{index}"))
                .connected_to(format!("PEER/nic{index}")),
        );
    }

    let mut dst = Resource::new("DST").with_address("10.0.0.2");
    for &index in order.iter().filter(|&&index| index <= count) {
        dst = dst.with_port(
            Port::new(format!("DST/Module1/Port{index}"))
                .with_address(format!("10.0.0.2/CH01/M01/SM01/P{index:02}")),
        );
    }
    for extra in 1..=spare {
        dst = dst.with_port(
            Port::new(format!("DST/Module2/Port{extra}"))
                .with_address(format!("10.0.0.2/CH02/M01/SM01/P{extra:02}")),
        );
    }
    ResourcesPair::new(src, dst)
}

fn layout() -> impl Strategy<Value = (usize, Vec<usize>, usize)> {
    (1..12usize, 0..4usize).prop_flat_map(|(count, spare)| {
        (
            Just(count),
            Just((1..=count).collect::<Vec<_>>()).prop_shuffle(),
            Just(spare),
        )
    })
}

proptest! {
    /// Property: every connected source port is paired exactly once
    #[test]
    fn prop_matching_addresses_associate_completely((count, order, spare) in layout()) {
        let pair = pair(count, &order, spare);
        let rules = rules();
        let associator = Associator::new(&pair, &rules, ChannelPreference::Address);

        prop_assert!(associator.valid());

        let pairs: Vec<_> = associator.iter_pairs().collect();
        prop_assert_eq!(pairs.len(), count);
        for (src, dst) in pairs {
            let src_suffix = src.name.trim_start_matches("SRC/");
            let dst_suffix = dst.name.trim_start_matches("DST/Module1/");
            prop_assert_eq!(src_suffix, dst_suffix);
        }
    }

    /// Property: a missing destination port makes the pair invalid
    #[test]
    fn prop_missing_destination_port_is_invalid(
        (count, order, spare) in layout(),
        missing in any::<prop::sample::Index>(),
    ) {
        let removed = missing.index(count) + 1;
        let order: Vec<usize> = order.into_iter().filter(|&index| index != removed).collect();
        let pair = pair(count, &order, spare);
        let rules = rules();
        let associator = Associator::new(&pair, &rules, ChannelPreference::Address);

        prop_assert!(!associator.valid());
    }

    /// Property: iteration can be repeated with the same result
    #[test]
    fn prop_iteration_is_restartable((count, order, spare) in layout()) {
        let pair = pair(count, &order, spare);
        let rules = rules();
        let associator = Associator::new(&pair, &rules, ChannelPreference::Address);

        let first: Vec<_> = associator.iter_pairs().map(|(s, d)| (s.name.clone(), d.name.clone())).collect();
        let second: Vec<_> = associator.iter_pairs().map(|(s, d)| (s.name.clone(), d.name.clone())).collect();
        prop_assert_eq!(first, second);
    }
}
