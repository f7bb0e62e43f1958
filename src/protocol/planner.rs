// src/protocol/planner.rs

use crate::protocol::{KeywordSet, Plan, PlanKind, PlanStep};
use tracing::debug;

/// Trait for turning a raw command into an ordered plan of pseudo-steps.
pub trait Planner: Send + Sync {
    fn generate_plan(&self, command: &str) -> Plan;
}

/// A keyword set mapped to a canned plan.
#[derive(Clone, Debug)]
pub struct PlanRule {
    kind: PlanKind,
    keywords: KeywordSet,
    steps: Vec<PlanStep>,
}

impl PlanRule {
    pub fn new(kind: PlanKind, keywords: &[&str], steps: Vec<PlanStep>) -> Result<Self, regex::Error> {
        Ok(Self {
            kind,
            keywords: KeywordSet::new(keywords)?,
            steps,
        })
    }

    pub fn matches(&self, command: &str) -> bool {
        self.keywords.matches(command)
    }

    pub fn plan(&self) -> Plan {
        Plan {
            kind: self.kind,
            steps: self.steps.clone(),
        }
    }
}

/// Ordered rule table, first match wins, generic plan otherwise.
#[derive(Clone, Debug)]
pub struct RulePlanner {
    rules: Vec<PlanRule>,
    fallback: Plan,
}

impl RulePlanner {
    pub fn new(fallback: Plan) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    /// The built-in search / comparison / generic table.
    pub fn standard() -> Result<Self, regex::Error> {
        Ok(Self::new(Plan {
            kind: PlanKind::Generic,
            steps: generic_steps(),
        })
        .with_rule(PlanRule::new(PlanKind::Search, &["search", "find"], search_steps())?)
        .with_rule(PlanRule::new(
            PlanKind::Comparison,
            &["price", "compare"],
            comparison_steps(),
        )?))
    }

    /// Appends a rule; it is tried after the existing ones and before the fallback.
    pub fn with_rule(mut self, rule: PlanRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[PlanRule] {
        &self.rules
    }
}

impl Planner for RulePlanner {
    fn generate_plan(&self, command: &str) -> Plan {
        let plan = self
            .rules
            .iter()
            .find(|rule| rule.matches(command))
            .map(PlanRule::plan)
            .unwrap_or_else(|| self.fallback.clone());

        debug!(kind = %plan.kind, steps = plan.len(), "classified command");
        plan
    }
}

pub fn search_steps() -> Vec<PlanStep> {
    vec![
        PlanStep::new("Parsing natural language command", "Analyzing search intent and parameters"),
        PlanStep::new("Initializing browser session", "Starting headless Chrome instance"),
        PlanStep::new("Navigating to search engine", "Opening Google.com"),
        PlanStep::new("Executing search query", "Entering search terms and submitting"),
        PlanStep::new("Extracting search results", "Parsing HTML and extracting relevant data"),
        PlanStep::new("Filtering and ranking results", "Applying filters and sorting by relevance"),
        PlanStep::new("Formatting structured output", "Converting to JSON format"),
    ]
}

pub fn comparison_steps() -> Vec<PlanStep> {
    vec![
        PlanStep::new("Parsing comparison request", "Identifying products and comparison criteria"),
        PlanStep::new("Launching browser automation", "Starting Playwright session"),
        PlanStep::new("Visiting e-commerce sites", "Opening multiple product pages"),
        PlanStep::new("Scraping product data", "Extracting prices, ratings, and specifications"),
        PlanStep::new("Cross-referencing information", "Validating data across multiple sources"),
        PlanStep::new("Generating comparison table", "Creating structured comparison output"),
    ]
}

pub fn generic_steps() -> Vec<PlanStep> {
    vec![
        PlanStep::new("Processing natural language input", "Understanding user intent"),
        PlanStep::new("Planning execution strategy", "Determining optimal navigation path"),
        PlanStep::new("Initializing web automation", "Starting browser automation tools"),
        PlanStep::new("Executing web interactions", "Performing clicks, scrolls, and data extraction"),
        PlanStep::new("Collecting results", "Gathering and structuring output data"),
        PlanStep::new("Finalizing output", "Formatting results for user consumption"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner() -> RulePlanner {
        RulePlanner::standard().unwrap()
    }

    #[test]
    fn search_and_find_yield_the_seven_step_search_plan() {
        for command in [
            "Search for laptops under 80k and list top 5",
            "find best smartphones",
            "please FIND me something",
            // search wins over compare because it is evaluated first
            "search and compare prices",
        ] {
            let plan = planner().generate_plan(command);
            assert_eq!(plan.kind, PlanKind::Search, "{command}");
            assert_eq!(plan.steps, search_steps());
            assert_eq!(plan.len(), 7);
        }
    }

    #[test]
    fn price_and_compare_yield_the_comparison_plan() {
        for command in ["Compare prices of iPhone 14", "what is the PRICE of gold", "COMPARE these"] {
            let plan = planner().generate_plan(command);
            assert_eq!(plan.kind, PlanKind::Comparison, "{command}");
            assert_eq!(plan.steps, comparison_steps());
            assert_eq!(plan.len(), 6);
        }
    }

    #[test]
    fn anything_else_falls_back_to_the_generic_plan() {
        for command in ["book a table", "", "   ", "laptops under 80k"] {
            let plan = planner().generate_plan(command);
            assert_eq!(plan.kind, PlanKind::Generic, "{command:?}");
            assert_eq!(plan.steps, generic_steps());
        }
    }

    #[test]
    fn plan_order_is_fixed() {
        let plan = planner().generate_plan("search");
        assert_eq!(
            plan.actions(),
            vec![
                "Parsing natural language command",
                "Initializing browser session",
                "Navigating to search engine",
                "Executing search query",
                "Extracting search results",
                "Filtering and ranking results",
                "Formatting structured output",
            ]
        );
    }

    #[test]
    fn extra_rules_are_tried_before_the_fallback() {
        let custom = PlanRule::new(
            PlanKind::Generic,
            &["book"],
            vec![PlanStep::new("Opening booking site", "Loading reservations page")],
        )
        .unwrap();
        let planner = planner().with_rule(custom);

        let plan = planner.generate_plan("Book a table");
        assert_eq!(plan.actions(), vec!["Opening booking site"]);

        // Earlier rules still win.
        let plan = planner.generate_plan("find and book a table");
        assert_eq!(plan.kind, PlanKind::Search);
        assert_eq!(planner.rules().len(), 3);
    }
}
