// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Stem Building

use cim_migration::association::{Stem, StemBuilder, StemChannel};
use proptest::prelude::*;

const CHASSIS: &str = ".*/CH(.*)/M(.*)/SM(.*)/P(.*)";

proptest! {
    /// Property: stems are a pure function of pattern and value
    #[test]
    fn prop_stem_is_deterministic(value in "[A-Za-z0-9/]{0,24}") {
        let builder = StemBuilder::new();
        let first = builder.build_stem("(\\d+)", &value, StemChannel::Address);
        let second = StemBuilder::new().build_stem("(\\d+)", &value, StemChannel::Address);
        prop_assert_eq!(first, second);
    }

    /// Property: address components compare equal with or without padding
    #[test]
    fn prop_address_padding_is_transparent(
        chassis in 0..10u8,
        module in 0..10u8,
        sub_module in 0..10u8,
        port in 0..100u8,
    ) {
        let builder = StemBuilder::new();
        let short = format!("10.0.0.1/CH{chassis}/M{module}/SM{sub_module}/P{port}");
        let padded = format!("10.0.0.2/CH{chassis:02}/M{module:02}/SM{sub_module:02}/P{port:02}");

        let short = builder.build_stem(CHASSIS, &short, StemChannel::Address);
        let padded = builder.build_stem(CHASSIS, &padded, StemChannel::Address);
        prop_assert!(short.is_some());
        prop_assert_eq!(short, padded);
    }

    /// Property: padded components are at least two characters wide
    #[test]
    fn prop_address_parts_have_width_two(port in 0..1000u16) {
        let stem = StemBuilder::new()
            .build_stem("P(\\d+)$", &format!("CH1/P{port}"), StemChannel::Address);
        let expected = Stem::new([format!("{port:02}")]);
        prop_assert_eq!(stem, Some(expected));
    }

    /// Property: name components are never padded
    #[test]
    fn prop_name_parts_are_verbatim(port in 0..1000u16) {
        let stem = StemBuilder::new()
            .build_stem("Port(\\d+)$", &format!("SW1/Port{port}"), StemChannel::Name);
        prop_assert_eq!(stem, Some(Stem::new([port.to_string()])));
    }
}
