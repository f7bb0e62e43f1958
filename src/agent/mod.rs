// src/agent/mod.rs

use crate::context::{AgentLabels, Context};
use crate::error::AgentError;
use crate::model::{SessionModel, StatusSummary};
use crate::pacing::{Pacer, StepOutcome};
use crate::protocol::{
    HistoryEntry, Plan, Planner, ResultRecord, RETRY_DETAILS, Step, StepStatus, Synthesizer,
};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

pub trait Agent {
    fn plan(&self, command: &str) -> Plan;
    fn synthesize(&self, command: &str) -> Vec<ResultRecord>;
    fn status(&self) -> StatusSummary;
}

/// Receives progress as a simulated run advances.
pub trait ExecutionObserver: Sync {
    fn on_started(&self, _command_id: &str, _command: &str, _plan: &Plan) {}
    /// Called after every status change; `previous` is the status it left.
    fn on_step(&self, _step: &Step, _previous: StepStatus) {}
    fn on_results(&self, _results: &[ResultRecord]) {}
    fn on_finished(&self, _entry: &HistoryEntry) {}
}

pub struct NoopObserver;

impl ExecutionObserver for NoopObserver {}

/// Drives the fake browser-automation run for one command at a time.
pub struct BrowserAgent {
    planner: Box<dyn Planner>,
    synthesizer: Box<dyn Synthesizer>,
    pacer: Mutex<Box<dyn Pacer>>,
    labels: AgentLabels,
    session: Mutex<SessionModel>,
}

impl BrowserAgent {
    pub fn new(context: Context) -> Self {
        let Context {
            planner,
            synthesizer,
            pacer,
            labels,
        } = context;
        Self {
            planner,
            synthesizer,
            pacer: Mutex::new(pacer),
            labels,
            session: Mutex::new(SessionModel::new()),
        }
    }

    /// Runs `command` to completion. A second call while one is in flight
    /// returns `AlreadyExecuting` without touching any state.
    pub async fn submit(
        &self,
        command: &str,
        observer: &dyn ExecutionObserver,
    ) -> Result<HistoryEntry, AgentError> {
        let command_id = self.session().begin(command, now_ms())?;
        info!(%command_id, command, "executing command");

        match self.run(&command_id, command, observer).await {
            Ok(entry) => {
                info!(%command_id, steps = entry.steps.len(), results = entry.results.len(), "command completed");
                observer.on_finished(&entry);
                Ok(entry)
            }
            Err(err) => {
                warn!(%command_id, error = %err, "simulation aborted");
                let aborted = self.session().abort(now_ms());
                if let Some(entry) = aborted {
                    observer.on_finished(&entry);
                }
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        command_id: &str,
        command: &str,
        observer: &dyn ExecutionObserver,
    ) -> Result<HistoryEntry, AgentError> {
        let plan = self.plan(command);
        observer.on_started(command_id, command, &plan);

        for plan_step in &plan.steps {
            let index = self.session().start_step(plan_step, now_ms())?;
            self.notify(observer, index, StepStatus::Pending);
            debug!(%command_id, index, action = %plan_step.action, "step running");

            let delay = self.pacer().step_delay();
            tokio::time::sleep(delay).await;

            let outcome = self.pacer().step_outcome();
            if outcome == StepOutcome::TransientError {
                self.session().fail_step(index, RETRY_DETAILS)?;
                self.notify(observer, index, StepStatus::Running);
                warn!(%command_id, index, "step failed, retrying");

                let retry = self.pacer().retry_delay();
                tokio::time::sleep(retry).await;
            }

            let previous = self.session().complete_step(index)?;
            self.notify(observer, index, previous);
            debug!(%command_id, index, "step completed");
        }

        let results = self.synthesize(command);
        observer.on_results(&results);
        let entry = self.session().finish(results, now_ms())?;
        Ok(entry)
    }

    pub fn is_executing(&self) -> bool {
        self.session().is_executing()
    }

    pub fn current_execution(&self) -> Vec<Step> {
        self.session().current_execution().to_vec()
    }

    pub fn results(&self) -> Vec<ResultRecord> {
        self.session().results().to_vec()
    }

    /// Newest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.session().history().iter().cloned().collect()
    }

    fn notify(&self, observer: &dyn ExecutionObserver, index: usize, previous: StepStatus) {
        let step = self.session().step(index).cloned();
        if let Some(step) = step {
            observer.on_step(&step, previous);
        }
    }

    fn session(&self) -> MutexGuard<'_, SessionModel> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pacer(&self) -> MutexGuard<'_, Box<dyn Pacer>> {
        self.pacer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Agent for BrowserAgent {
    fn plan(&self, command: &str) -> Plan {
        self.planner.generate_plan(command)
    }

    fn synthesize(&self, command: &str) -> Vec<ResultRecord> {
        self.synthesizer.synthesize(command)
    }

    fn status(&self) -> StatusSummary {
        self.session()
            .status_summary(&self.labels.browser_engine, &self.labels.llm_model)
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
