// src/context/mod.rs

use crate::config::{Config, DEFAULT_BROWSER_ENGINE, DEFAULT_LLM_MODEL};
use crate::error::SetupError;
use crate::pacing::{self, InstantPacer, Pacer};
use crate::protocol::{Planner, RulePlanner, RuleSynthesizer, Synthesizer};

/// Names shown on the status panel. Purely cosmetic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentLabels {
    pub browser_engine: String,
    pub llm_model: String,
}

impl Default for AgentLabels {
    fn default() -> Self {
        Self {
            browser_engine: DEFAULT_BROWSER_ENGINE.into(),
            llm_model: DEFAULT_LLM_MODEL.into(),
        }
    }
}

/// Runtime context for an agent: classifier, result source, pacing and labels.
pub struct Context {
    pub planner: Box<dyn Planner>,
    pub synthesizer: Box<dyn Synthesizer>,
    pub pacer: Box<dyn Pacer>,
    pub labels: AgentLabels,
}

impl Context {
    /// Built-in rule tables with instant pacing.
    pub fn new() -> Result<Self, SetupError> {
        Ok(Self {
            planner: Box::new(RulePlanner::standard()?),
            synthesizer: Box::new(RuleSynthesizer::standard()?),
            pacer: Box::new(InstantPacer),
            labels: AgentLabels::default(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, SetupError> {
        config.validate()?;
        Ok(Self::new()?
            .with_pacer_boxed(pacing::from_config(config))
            .with_labels(AgentLabels {
                browser_engine: config.browser_engine.clone(),
                llm_model: config.llm_model.clone(),
            }))
    }

    pub fn with_planner<P: Planner + 'static>(mut self, planner: P) -> Self {
        self.planner = Box::new(planner);
        self
    }

    pub fn with_synthesizer<S: Synthesizer + 'static>(mut self, synthesizer: S) -> Self {
        self.synthesizer = Box::new(synthesizer);
        self
    }

    pub fn with_pacer<P: Pacer + 'static>(self, pacer: P) -> Self {
        self.with_pacer_boxed(Box::new(pacer))
    }

    pub fn with_pacer_boxed(mut self, pacer: Box<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn with_labels(mut self, labels: AgentLabels) -> Self {
        self.labels = labels;
        self
    }
}
