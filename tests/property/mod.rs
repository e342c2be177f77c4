// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! - container: deduplication, merge and stage ordering
//! - stems: determinism and zero-padding of stems
//! - association: completeness for generated port layouts

mod association;
mod container;
mod stems;
