// Copyright (c) 2025 - Cowboy AI, Inc.
//! Finite State Machine Abstractions
//!
//! Generic state machine types for modeling lifecycles. Transitions are pure
//! functions: the caller supplies the clock, the machine never performs I/O.
//!
//! ```text
//! (State, Input) → (State, Output)
//! ```
//!
//! # Example
//!
//! ```rust
//! use cim_migration::state_machine::{ExecutionInput, ExecutionState, StateMachine};
//!
//! let (state, _) = ExecutionState::NotExecuted
//!     .transition(&ExecutionInput::Complete)
//!     .unwrap();
//! assert_eq!(state, ExecutionState::Success);
//! assert!(state.transition(&ExecutionInput::Complete).is_err());
//! ```

pub mod execution;

pub use execution::{ExecutionInput, ExecutionState};

use chrono::{DateTime, Utc};

/// Result of a state transition
pub type TransitionResult<S> = Result<S, TransitionError>;

/// Errors that can occur during state transitions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Transition from current state to target state is not allowed
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

/// Trait for finite state machines
pub trait StateMachine: Sized + Clone {
    /// Input type that triggers transitions
    type Input;

    /// Output type produced by transitions (use () if none)
    type Output;

    /// Attempt to transition to a new state given an input
    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)>;

    /// Check if a transition is valid without performing it
    fn can_transition(&self, input: &Self::Input) -> bool {
        self.transition(input).is_ok()
    }

    /// True when no input leads anywhere
    fn is_terminal(&self) -> bool;
}

/// Transition record for auditing
#[derive(Debug, Clone)]
pub struct Transition<S, I> {
    pub from: S,
    pub to: S,
    pub input: I,
    pub timestamp: DateTime<Utc>,
}

impl<S, I> Transition<S, I> {
    pub fn new(from: S, to: S, input: I, timestamp: DateTime<Utc>) -> Self {
        Self {
            from,
            to,
            input,
            timestamp,
        }
    }
}

/// State machine that tracks its transition history
#[derive(Debug, Clone)]
pub struct StateMachineWithHistory<FSM: StateMachine> {
    current: FSM,
    created_at: DateTime<Utc>,
    history: Vec<Transition<FSM, FSM::Input>>,
}

impl<FSM: StateMachine> StateMachineWithHistory<FSM> {
    pub fn new(initial: FSM, created_at: DateTime<Utc>) -> Self {
        Self {
            current: initial,
            created_at,
            history: Vec::new(),
        }
    }

    /// Transition with history recording
    pub fn transition_with_history(
        &mut self,
        input: FSM::Input,
        timestamp: DateTime<Utc>,
    ) -> TransitionResult<FSM::Output> {
        let (to, output) = self.current.transition(&input)?;
        let from = std::mem::replace(&mut self.current, to.clone());
        self.history.push(Transition::new(from, to, input, timestamp));
        Ok(output)
    }

    pub fn history(&self) -> &[Transition<FSM, FSM::Input>] {
        &self.history
    }

    pub fn current_state(&self) -> &FSM {
        &self.current
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time of the most recent transition, if any
    pub fn last_transition_at(&self) -> Option<DateTime<Utc>> {
        self.history.last().map(|transition| transition.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_history_records_action_result() {
        let created = Utc::now();
        let mut fsm = StateMachineWithHistory::new(ExecutionState::NotExecuted, created);
        assert!(fsm.last_transition_at().is_none());

        let finished = created + Duration::milliseconds(250);
        fsm.transition_with_history(ExecutionInput::Fail("port busy".to_string()), finished)
            .unwrap();

        assert_eq!(*fsm.current_state(), ExecutionState::Failed);
        assert_eq!(fsm.history().len(), 1);
        assert_eq!(fsm.history()[0].from, ExecutionState::NotExecuted);
        assert_eq!(fsm.last_transition_at(), Some(finished));
        assert_eq!(fsm.created_at(), created);
    }

    #[test]
    fn test_rejected_transition_leaves_history_untouched() {
        let mut fsm = StateMachineWithHistory::new(ExecutionState::Success, Utc::now());

        let result = fsm.transition_with_history(ExecutionInput::Complete, Utc::now());

        assert!(matches!(result, Err(TransitionError::InvalidTransition { .. })));
        assert_eq!(*fsm.current_state(), ExecutionState::Success);
        assert!(fsm.history().is_empty());
    }
}
