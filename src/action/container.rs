// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deduplicating action container
//!
//! At most one action per [`ActionKey`]. Adding an action whose key is
//! already present merges it into the canonical instance instead of
//! replacing it.

use indexmap::map::Entry;
use indexmap::IndexMap;
use std::fmt;

use super::{Action, ActionKey};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionsContainer {
    actions: IndexMap<ActionKey, Action>,
}

impl ActionsContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or merge by key
    pub fn add(&mut self, action: impl Into<Action>) {
        let action = action.into();
        match self.actions.entry(action.key()) {
            Entry::Occupied(mut canonical) => canonical.get_mut().merge(action),
            Entry::Vacant(slot) => {
                slot.insert(action);
            }
        }
    }

    pub fn append<I>(&mut self, actions: I)
    where
        I: IntoIterator,
        I::Item: Into<Action>,
    {
        for action in actions {
            self.add(action);
        }
    }

    /// Merge every action of another container into this one
    pub fn merge(&mut self, other: ActionsContainer) {
        self.append(other.actions.into_values());
    }

    pub fn get(&self, key: &ActionKey) -> Option<&Action> {
        self.actions.get(key)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Actions by stage; ties keep insertion order
    pub fn sorted_actions(&self) -> Vec<&Action> {
        let mut actions: Vec<&Action> = self.actions.values().collect();
        actions.sort_by_key(|action| action.stage());
        actions
    }

    /// Owned actions in execution order
    pub fn into_sorted(self) -> Vec<Action> {
        let mut actions: Vec<Action> = self.actions.into_values().collect();
        actions.sort_by_key(|action| action.stage());
        actions
    }
}

impl FromIterator<Action> for ActionsContainer {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        let mut container = ActionsContainer::new();
        container.append(iter);
        container
    }
}

/// One line per action in execution order
impl fmt::Display for ActionsContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for action in self.sorted_actions() {
            writeln!(f, "{action}")?;
        }
        Ok(())
    }
}
