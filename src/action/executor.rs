// Copyright (c) 2025 - Cowboy AI, Inc.
//! Action Executor
//!
//! Runs a container's actions one at a time in stage order and records the
//! outcome of each.
//!
//! ```text
//! for action in container.into_sorted():
//!     NotExecuted ──execute ok──────────▶ Success
//!          │
//!          └────execute err / timeout──▶ Failed ──(allowed)──▶ rollback
//! ```
//!
//! A failed action never stops the run. Rollback only happens when the
//! executor settings allow it and the action itself declares the error as
//! rollback-triggering; rollback errors are logged and dropped.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use tokio::time::timeout;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::{Action, ActionsContainer, MigrationContext, Stage};
use crate::config::ExecutorSettings;
use crate::errors::ActionError;
use crate::state_machine::{ExecutionInput, ExecutionState, StateMachineWithHistory};

/// Result of running one action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    pub description: String,
    pub stage: Stage,
    pub state: ExecutionState,
    pub error: Option<String>,
    pub rolled_back: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        self.state == ExecutionState::Success
    }

    /// `<action> ... Done` or `<action> ... Failed: <reason>`
    pub fn line(&self) -> String {
        match &self.error {
            None => format!("{} ... Done", self.description),
            Some(reason) => format!("{} ... Failed: {reason}", self.description),
        }
    }
}

/// Outcome of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<ActionOutcome>,
}

impl ExecutionReport {
    /// True iff no action failed
    pub fn no_error(&self) -> bool {
        self.outcomes.iter().all(ActionOutcome::is_success)
    }

    pub fn failed(&self) -> impl Iterator<Item = &ActionOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_success())
    }

    /// Report as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// One line per action followed by the totals
    pub fn summary(&self) -> String {
        let mut summary = String::new();
        for outcome in &self.outcomes {
            let _ = writeln!(summary, "{}", outcome.line());
        }
        let failed = self.failed().count();
        let _ = write!(
            summary,
            "{} actions, {} succeeded, {} failed",
            self.outcomes.len(),
            self.outcomes.len() - failed,
            failed
        );
        summary
    }
}

/// Sequential, stage-ordered executor
#[derive(Debug, Clone, Default)]
pub struct ActionExecutor {
    settings: ExecutorSettings,
}

impl ActionExecutor {
    pub fn new(settings: ExecutorSettings) -> Self {
        Self { settings }
    }

    /// Run every action and collect the report
    pub async fn execute(
        &self,
        container: ActionsContainer,
        ctx: &mut MigrationContext,
    ) -> ExecutionReport {
        self.execute_with(container, ctx, |_| {}).await
    }

    /// Run every action, handing each outcome to `on_outcome` as soon as it is known
    pub async fn execute_with<F>(
        &self,
        container: ActionsContainer,
        ctx: &mut MigrationContext,
        mut on_outcome: F,
    ) -> ExecutionReport
    where
        F: FnMut(&ActionOutcome),
    {
        let span = info_span!("migration", run_id = %ctx.run_id());
        async {
            let started_at = Utc::now();
            let actions = container.into_sorted();
            info!(actions = actions.len(), "Executing migration actions");

            let mut outcomes = Vec::with_capacity(actions.len());
            for mut action in actions {
                let outcome = self.run_one(&mut action, ctx).await;
                on_outcome(&outcome);
                outcomes.push(outcome);
            }

            let report = ExecutionReport {
                run_id: ctx.run_id(),
                started_at,
                finished_at: Utc::now(),
                outcomes,
            };
            info!(
                no_error = report.no_error(),
                failed = report.failed().count(),
                "Migration actions finished"
            );
            report
        }
        .instrument(span)
        .await
    }

    async fn run_one(&self, action: &mut Action, ctx: &mut MigrationContext) -> ActionOutcome {
        let description = action.to_string();
        let stage = action.stage();
        let mut fsm = StateMachineWithHistory::new(ExecutionState::NotExecuted, Utc::now());
        info!(action = %description, %stage, "Executing action");

        let call_timeout = self.settings.call_timeout();
        let result = match timeout(call_timeout, action.execute(ctx)).await {
            Ok(result) => result,
            Err(_) => Err(ActionError::Timeout(call_timeout)),
        };

        let (input, error_message, rolled_back) = match result {
            Ok(()) => (ExecutionInput::Complete, None, false),
            Err(err) => {
                error!(action = %description, error = %err, "Action execution failed");
                let rolled_back = self.rollback(action, &err, ctx).await;
                let reason = err.to_string();
                (ExecutionInput::Fail(reason.clone()), Some(reason), rolled_back)
            }
        };

        if let Err(err) = fsm.transition_with_history(input, Utc::now()) {
            warn!(action = %description, error = %err, "Unexpected execution state transition");
        }

        ActionOutcome {
            description,
            stage,
            state: *fsm.current_state(),
            error: error_message,
            rolled_back,
            started_at: fsm.created_at(),
            finished_at: fsm.last_transition_at().unwrap_or_else(Utc::now),
        }
    }

    /// Best-effort rollback; returns whether it ran to completion
    async fn rollback(&self, action: &Action, err: &ActionError, ctx: &MigrationContext) -> bool {
        if !self.settings.rollback_on_failure || !action.triggers_rollback(err) {
            return false;
        }

        info!(action = %action, "Rolling back action");
        let call_timeout = self.settings.call_timeout();
        match timeout(call_timeout, action.rollback(ctx)).await {
            Ok(Ok(())) => true,
            Ok(Err(rollback_err)) => {
                error!(action = %action, error = %rollback_err, "Rollback failed");
                false
            }
            Err(_) => {
                error!(action = %action, timeout = ?call_timeout, "Rollback timed out");
                false
            }
        }
    }
}
