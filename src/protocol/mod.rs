// src/protocol/mod.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub mod keywords;
pub mod planner;
pub mod synthesizer;

pub use keywords::KeywordSet;
pub use planner::{PlanRule, Planner, RulePlanner};
pub use synthesizer::{ResultCategory, ResultRule, RuleSynthesizer, Synthesizer};

/// Details shown on a step that hit the transient error branch.
pub const RETRY_DETAILS: &str = "Execution failed - retrying...";

pub const EXAMPLE_COMMANDS: [&str; 5] = [
    "Search for laptops under 80k and list top 5",
    "Find best smartphones with good camera under 50k",
    "Compare prices of iPhone 14 across different sites",
    "Search for gaming laptops with RTX graphics",
    "Find restaurants near me with good ratings",
];

/// One canned pseudo-action of a plan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    pub action: String,
    pub details: String,
}

impl PlanStep {
    pub fn new(action: &str, details: &str) -> Self {
        Self {
            action: action.to_string(),
            details: details.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    Search,
    Comparison,
    Generic,
}

impl fmt::Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlanKind::Search => "search",
            PlanKind::Comparison => "comparison",
            PlanKind::Generic => "generic",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub kind: PlanKind,
    pub steps: Vec<PlanStep>,
}

impl Plan {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn actions(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.action.as_str()).collect()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Error,
}

impl StepStatus {
    /// Whether the driver may move a step from `self` to `next`.
    pub fn can_transition_to(self, next: StepStatus) -> bool {
        matches!(
            (self, next),
            (StepStatus::Pending, StepStatus::Running)
                | (StepStatus::Running, StepStatus::Completed)
                | (StepStatus::Running, StepStatus::Error)
                | (StepStatus::Error, StepStatus::Completed)
        )
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepStatus::Pending => "pending",
            StepStatus::Running => "running",
            StepStatus::Completed => "completed",
            StepStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// A step as shown in the execution log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub action: String,
    pub details: String,
    pub status: StepStatus,
    /// Creation time, epoch milliseconds.
    pub timestamp: i64,
}

impl Step {
    pub fn pending(command_id: &str, index: usize, plan_step: &PlanStep, timestamp: i64) -> Self {
        Self {
            id: format!("{command_id}-{index}"),
            action: plan_step.action.clone(),
            details: plan_step.details.clone(),
            status: StepStatus::Pending,
            timestamp,
        }
    }
}

/// Mock data item. Fields vary by category; nothing is enforced.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultRecord(BTreeMap<String, String>);

impl ResultRecord {
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Product records carry `name`, search hits carry `title`.
    pub fn title(&self) -> Option<&str> {
        self.get("name").or_else(|| self.get("title"))
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryStatus {
    Completed,
    Failed,
    Running,
}

impl fmt::Display for HistoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HistoryStatus::Completed => "completed",
            HistoryStatus::Failed => "failed",
            HistoryStatus::Running => "running",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub command: String,
    /// Completion time, epoch milliseconds.
    pub timestamp: i64,
    pub status: HistoryStatus,
    pub steps: Vec<Step>,
    pub results: Vec<ResultRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_transitions_follow_the_progress_chain() {
        use StepStatus::*;
        assert!(Pending.can_transition_to(Running));
        assert!(Running.can_transition_to(Completed));
        assert!(Running.can_transition_to(Error));
        assert!(Error.can_transition_to(Completed));

        assert!(!Pending.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Running));
        assert!(!Error.can_transition_to(Running));
        assert!(!Completed.can_transition_to(Completed));
    }

    #[test]
    fn record_title_prefers_name_over_title() {
        let product = ResultRecord::from_pairs(&[("name", "Dell XPS 13"), ("title", "ignored")]);
        assert_eq!(product.title(), Some("Dell XPS 13"));

        let hit = ResultRecord::from_pairs(&[("title", "Search Result 1")]);
        assert_eq!(hit.title(), Some("Search Result 1"));

        assert_eq!(ResultRecord::default().title(), None);
    }

    #[test]
    fn step_id_combines_command_id_and_index() {
        let step = Step::pending("1700000000000", 3, &PlanStep::new("a", "b"), 42);
        assert_eq!(step.id, "1700000000000-3");
        assert_eq!(step.status, StepStatus::Pending);
        assert_eq!(step.timestamp, 42);
    }

    #[test]
    fn statuses_serialize_in_snake_case() {
        let json = serde_json::to_string(&StepStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
        let json = serde_json::to_string(&PlanKind::Comparison).unwrap();
        assert_eq!(json, "\"comparison\"");
    }
}
