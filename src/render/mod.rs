// src/render/mod.rs

use crate::agent::ExecutionObserver;
use crate::model::{AgentState, StatusSummary};
use crate::protocol::{
    EXAMPLE_COMMANDS, HistoryEntry, HistoryStatus, Plan, ResultRecord, Step, StepStatus,
};
use chrono::{Local, TimeZone};
use colored::{ColoredString, Colorize};
use std::sync::atomic::{AtomicUsize, Ordering};

const HISTORY_COMMAND_WIDTH: usize = 48;

/// Prints a run to stdout as it progresses.
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    total_steps: AtomicUsize,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notice(&self, message: &str, hint: Option<&str>) {
        println!("{} {}", "!".yellow().bold(), message.yellow());
        if let Some(hint) = hint {
            println!("  {}", hint.dimmed());
        }
    }
}

impl ExecutionObserver for TerminalRenderer {
    fn on_started(&self, command_id: &str, command: &str, plan: &Plan) {
        self.total_steps.store(plan.len(), Ordering::Relaxed);
        println!();
        println!("{} {}", "⚡ Execution Status".yellow().bold(), format!("#{command_id}").dimmed());
        println!("  {} {}", "›".blue(), command.white().bold());
    }

    fn on_step(&self, step: &Step, _previous: StepStatus) {
        let total = self.total_steps.load(Ordering::Relaxed);
        println!("{}", format_step(step, step_position(step).map(|n| (n + 1, total))));
    }

    fn on_results(&self, results: &[ResultRecord]) {
        println!();
        println!("{}", "🔍 Extracted Results".green().bold());
        for record in results {
            println!("{}", format_result_card(record));
        }
    }
}

pub fn status_glyph(status: StepStatus) -> ColoredString {
    match status {
        StepStatus::Running => "◷".blue(),
        StepStatus::Completed => "✔".green(),
        StepStatus::Error => "✖".red(),
        StepStatus::Pending => "○".dimmed(),
    }
}

/// `position` is 1-based `(n, total)`.
pub fn format_step(step: &Step, position: Option<(usize, usize)>) -> String {
    let counter = match position {
        Some((n, total)) if total > 0 => format!("[{n}/{total}] "),
        _ => String::new(),
    };
    let details = match step.status {
        StepStatus::Error => step.details.red(),
        _ => step.details.dimmed(),
    };
    format!(
        "  {} {}{}\n      {}",
        status_glyph(step.status),
        counter.dimmed(),
        step.action.bold(),
        details
    )
}

pub fn format_result_card(record: &ResultRecord) -> String {
    let mut lines = Vec::new();

    let title = record.title().unwrap_or("(untitled)");
    match record.get("price") {
        Some(price) => lines.push(format!("  ┌ {}  {}", title.white().bold(), price.green().bold())),
        None => lines.push(format!("  ┌ {}", title.white().bold())),
    }
    if let Some(description) = record.get("description") {
        lines.push(format!("  │ {}", description.dimmed()));
    }
    if let Some(specs) = record.get("specs") {
        lines.push(format!("  │ {specs}"));
    }

    let mut footer = Vec::new();
    if let Some(rating) = record.get("rating") {
        footer.push(format!("★ {rating}").yellow().to_string());
    }
    if let Some(relevance) = record.get("relevance") {
        footer.push(format!("Relevance: {relevance}").blue().to_string());
    }
    if let Some(url) = record.get("url") {
        footer.push(format!("View Details: {url}").blue().to_string());
    }
    if !footer.is_empty() {
        lines.push(format!("  └ {}", footer.join("   ")));
    }

    lines.join("\n")
}

pub fn format_status(summary: &StatusSummary) -> String {
    let state = match summary.state {
        AgentState::Executing => summary.state.to_string().yellow().bold(),
        AgentState::Ready => summary.state.to_string().green().bold(),
    };
    [
        format!("{}", "🌐 Agent Status".blue().bold()),
        format!("  {} {}", format!("{:<18}", "Status").dimmed(), state),
        format!("  {} {}", format!("{:<18}", "Browser Engine").dimmed(), summary.browser_engine),
        format!("  {} {}", format!("{:<18}", "LLM Model").dimmed(), summary.llm_model),
        format!("  {} {}", format!("{:<18}", "Commands Executed").dimmed(), summary.commands_executed),
    ]
    .join("\n")
}

/// `entries` newest first.
pub fn format_history(entries: &[HistoryEntry]) -> String {
    let mut lines = vec![format!("{}", "Command History".bold())];
    if entries.is_empty() {
        lines.push(format!("  {}", "No commands executed yet".dimmed()));
        return lines.join("\n");
    }
    for entry in entries {
        let badge = match entry.status {
            HistoryStatus::Completed => entry.status.to_string().green(),
            HistoryStatus::Failed => entry.status.to_string().red(),
            HistoryStatus::Running => entry.status.to_string().yellow(),
        };
        lines.push(format!(
            "  • {}  {}  [{}]",
            truncate(&entry.command, HISTORY_COMMAND_WIDTH).white(),
            local_time(entry.timestamp).dimmed(),
            badge
        ));
    }
    lines.join("\n")
}

pub fn format_examples() -> String {
    let mut lines = vec![format!("{}", "Example Commands".bold())];
    for (n, example) in EXAMPLE_COMMANDS.iter().enumerate() {
        lines.push(format!("  {} {}", format!("{}.", n + 1).dimmed(), example));
    }
    lines.join("\n")
}

pub fn format_results(results: &[ResultRecord]) -> String {
    if results.is_empty() {
        return format!("  {}", "No results yet".dimmed());
    }
    results
        .iter()
        .map(format_result_card)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Epoch milliseconds as local `HH:MM:SS`.
pub fn local_time(timestamp_ms: i64) -> String {
    Local
        .timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let cut: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{cut}…")
}

fn step_position(step: &Step) -> Option<usize> {
    step.id.rsplit('-').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::PlanStep;
    use crate::protocol::synthesizer::{laptop_records, search_hit_records};

    fn step(status: StepStatus, details: &str) -> Step {
        let mut step = Step::pending("99", 2, &PlanStep::new("Executing search query", details), 0);
        step.status = status;
        step
    }

    #[test]
    fn step_line_shows_counter_action_and_details() {
        let line = format_step(&step(StepStatus::Running, "Entering search terms"), Some((3, 7)));
        assert!(line.contains("[3/7]"));
        assert!(line.contains("Executing search query"));
        assert!(line.contains("Entering search terms"));
        assert!(line.contains('◷'));
    }

    #[test]
    fn glyph_tracks_status() {
        let done = format_step(&step(StepStatus::Completed, "x"), None);
        let failed = format_step(&step(StepStatus::Error, "Execution failed - retrying..."), None);
        assert!(done.contains('✔'));
        assert!(!done.contains('/'));
        assert!(failed.contains('✖'));
        assert!(failed.contains("Execution failed - retrying..."));
    }

    #[test]
    fn position_comes_from_the_step_id() {
        assert_eq!(step_position(&step(StepStatus::Running, "x")), Some(2));
    }

    #[test]
    fn product_card_shows_price_specs_and_rating() {
        let card = format_result_card(&laptop_records()[0]);
        assert!(card.contains("Dell XPS 13"));
        assert!(card.contains("₹89,999"));
        assert!(card.contains("11th Gen Intel Core i5, 8GB RAM, 256GB SSD"));
        assert!(card.contains("★ 4.5/5"));
        assert!(card.contains("View Details: https://example.com/dell-xps-13"));
        assert!(!card.contains("Relevance"));
    }

    #[test]
    fn search_hit_card_shows_description_and_relevance() {
        let card = format_result_card(&search_hit_records()[1]);
        assert!(card.contains("Search Result 2"));
        assert!(card.contains("Additional information matching your criteria"));
        assert!(card.contains("Relevance: 89%"));
        assert!(!card.contains('★'));
    }

    #[test]
    fn empty_history_has_a_placeholder() {
        assert!(format_history(&[]).contains("No commands executed yet"));
    }

    #[test]
    fn history_lists_command_and_status() {
        let entry = HistoryEntry {
            id: "1".into(),
            command: "Find restaurants near me with good ratings".into(),
            timestamp: 0,
            status: HistoryStatus::Completed,
            steps: vec![],
            results: vec![],
        };
        let text = format_history(&[entry]);
        assert!(text.contains("Find restaurants near me with good ratings"));
        assert!(text.contains("completed"));
    }

    #[test]
    fn long_commands_are_truncated_on_char_boundaries() {
        let long = "₹".repeat(60);
        let cut = truncate(&long, 10);
        assert_eq!(cut.chars().count(), 10);
        assert!(cut.ends_with('…'));
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn status_panel_lists_every_field() {
        let text = format_status(&StatusSummary {
            state: AgentState::Ready,
            browser_engine: "Playwright".into(),
            llm_model: "GPT-4".into(),
            commands_executed: 4,
        });
        for needle in ["Ready", "Playwright", "GPT-4", "4", "Commands Executed"] {
            assert!(text.contains(needle), "{needle}");
        }
    }

    #[test]
    fn examples_are_numbered() {
        let text = format_examples();
        assert!(text.contains("Search for laptops under 80k and list top 5"));
        assert!(text.contains("5."));
    }
}
