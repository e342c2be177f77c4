// Copyright (c) 2025 - Cowboy AI, Inc.
//! Action Execution State Machine
//!
//! ```text
//! NotExecuted ──Complete──▶ Success
//!      │
//!      └───────Fail───────▶ Failed
//! ```
//!
//! Both outcomes are terminal: an action is executed at most once per run.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{StateMachine, TransitionError, TransitionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionState {
    #[default]
    NotExecuted,
    Success,
    Failed,
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExecutionState::NotExecuted => "NOT_EXECUTED",
            ExecutionState::Success => "SUCCESS",
            ExecutionState::Failed => "FAILED",
        };
        f.write_str(label)
    }
}

/// Outcome reported by the executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionInput {
    Complete,
    Fail(String),
}

impl StateMachine for ExecutionState {
    type Input = ExecutionInput;
    type Output = ();

    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)> {
        match (self, input) {
            (ExecutionState::NotExecuted, ExecutionInput::Complete) => {
                Ok((ExecutionState::Success, ()))
            }
            (ExecutionState::NotExecuted, ExecutionInput::Fail(_)) => {
                Ok((ExecutionState::Failed, ()))
            }
            (from, input) => Err(TransitionError::InvalidTransition {
                from: from.to_string(),
                to: match input {
                    ExecutionInput::Complete => ExecutionState::Success.to_string(),
                    ExecutionInput::Fail(_) => ExecutionState::Failed.to_string(),
                },
            }),
        }
    }

    fn is_terminal(&self) -> bool {
        !matches!(self, ExecutionState::NotExecuted)
    }
}
