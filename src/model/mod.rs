// src/model/mod.rs

use crate::error::{SessionError, SubmitError};
use crate::memory::{CommandHistory, Memory};
use crate::protocol::{
    HistoryEntry, HistoryStatus, PlanStep, ResultRecord, Step, StepStatus,
};
use crate::validation::validate_command;
use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    Ready,
    Executing,
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentState::Ready => f.write_str("Ready"),
            AgentState::Executing => f.write_str("Executing"),
        }
    }
}

/// What the agent status panel shows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub state: AgentState,
    pub browser_engine: String,
    pub llm_model: String,
    pub commands_executed: usize,
}

/// All session state, mutated only through the transition methods below.
#[derive(Debug, Default)]
pub struct SessionModel {
    command: Option<String>,
    command_id: Option<String>,
    executing: bool,
    current_execution: Vec<Step>,
    results: Vec<ResultRecord>,
    history: CommandHistory,
    last_id: i64,
}

impl SessionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a command. Rejected submissions leave the session untouched.
    pub fn begin(&mut self, command: &str, now_ms: i64) -> Result<String, SubmitError> {
        let command = validate_command(command)?;
        if self.executing {
            return Err(SubmitError::AlreadyExecuting);
        }

        // Ids must stay unique even if two commands start within the same millisecond.
        let id = now_ms.max(self.last_id + 1);
        self.last_id = id;

        let command_id = id.to_string();
        self.command = Some(command.to_string());
        self.command_id = Some(command_id.clone());
        self.executing = true;
        self.current_execution.clear();
        self.results.clear();
        Ok(command_id)
    }

    /// Appends the next step and moves it to running. Returns its index.
    pub fn start_step(&mut self, plan_step: &PlanStep, now_ms: i64) -> Result<usize, SessionError> {
        let command_id = self.active_id()?;
        if let Some(prev) = self.current_execution.last() {
            if prev.status != StepStatus::Completed {
                return Err(SessionError::IncompleteSteps(1));
            }
        }

        let index = self.current_execution.len();
        let step = Step::pending(command_id, index, plan_step, now_ms);
        self.current_execution.push(step);
        self.transition(index, StepStatus::Running)?;
        Ok(index)
    }

    /// Moves a running step into the error state and replaces its details.
    pub fn fail_step(&mut self, index: usize, details: &str) -> Result<(), SessionError> {
        self.transition(index, StepStatus::Error)?;
        if let Some(step) = self.current_execution.get_mut(index) {
            step.details = details.to_string();
        }
        Ok(())
    }

    /// Returns the status the step had before completing.
    pub fn complete_step(&mut self, index: usize) -> Result<StepStatus, SessionError> {
        self.transition(index, StepStatus::Completed)
    }

    /// Stores results, files the history entry and releases the in-flight lock.
    pub fn finish(&mut self, results: Vec<ResultRecord>, now_ms: i64) -> Result<HistoryEntry, SessionError> {
        self.active_id()?;
        let incomplete = self
            .current_execution
            .iter()
            .filter(|s| s.status != StepStatus::Completed)
            .count();
        if incomplete > 0 {
            return Err(SessionError::IncompleteSteps(incomplete));
        }

        self.results = results;
        Ok(self.file_entry(HistoryStatus::Completed, now_ms))
    }

    /// Releases the lock after an internal failure and files a failed entry.
    pub fn abort(&mut self, now_ms: i64) -> Option<HistoryEntry> {
        if !self.executing {
            return None;
        }
        Some(self.file_entry(HistoryStatus::Failed, now_ms))
    }

    pub fn is_executing(&self) -> bool {
        self.executing
    }

    pub fn current_execution(&self) -> &[Step] {
        &self.current_execution
    }

    pub fn step(&self, index: usize) -> Option<&Step> {
        self.current_execution.get(index)
    }

    pub fn results(&self) -> &[ResultRecord] {
        &self.results
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn status_summary(&self, browser_engine: &str, llm_model: &str) -> StatusSummary {
        StatusSummary {
            state: if self.executing {
                AgentState::Executing
            } else {
                AgentState::Ready
            },
            browser_engine: browser_engine.to_string(),
            llm_model: llm_model.to_string(),
            commands_executed: self.history.len(),
        }
    }

    fn active_id(&self) -> Result<&str, SessionError> {
        match (&self.command_id, self.executing) {
            (Some(id), true) => Ok(id),
            _ => Err(SessionError::NotExecuting),
        }
    }

    fn transition(&mut self, index: usize, to: StepStatus) -> Result<StepStatus, SessionError> {
        self.active_id()?;
        let step = self
            .current_execution
            .get_mut(index)
            .ok_or(SessionError::UnknownStep(index))?;
        let from = step.status;
        if !from.can_transition_to(to) {
            return Err(SessionError::InvalidTransition { index, from, to });
        }
        step.status = to;
        Ok(from)
    }

    fn file_entry(&mut self, status: HistoryStatus, now_ms: i64) -> HistoryEntry {
        let entry = HistoryEntry {
            id: self.command_id.clone().unwrap_or_default(),
            command: self.command.clone().unwrap_or_default(),
            timestamp: now_ms,
            status,
            steps: self.current_execution.clone(),
            results: self.results.clone(),
        };
        self.history.record(entry.clone());
        self.executing = false;
        entry
    }
}
