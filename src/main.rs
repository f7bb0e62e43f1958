use anyhow::{Context as _, Result};
use clap::Parser;
use colored::Colorize;
use fetchly::agent::{Agent, BrowserAgent};
use fetchly::config::{
    Config, DEFAULT_ERROR_RATE, DEFAULT_MAX_STEP_DELAY_MS, DEFAULT_MIN_STEP_DELAY_MS,
    DEFAULT_RETRY_DELAY_MS,
};
use fetchly::context::Context;
use fetchly::error::AgentError;
use fetchly::protocol::{EXAMPLE_COMMANDS, HistoryEntry};
use fetchly::render::{self, TerminalRenderer};
use std::io::{BufRead, IsTerminal, Write};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "fetchly",
    version,
    about = "AI-powered web navigation and data extraction (simulated)"
)]
struct Cli {
    /// Command to run once. Starts an interactive session when omitted.
    command: Vec<String>,

    /// Seed for step timing and transient errors.
    #[arg(long, env = "FETCHLY_SEED")]
    seed: Option<u64>,

    /// Skip all delays.
    #[arg(long)]
    instant: bool,

    #[arg(long, default_value_t = DEFAULT_MIN_STEP_DELAY_MS)]
    min_delay_ms: u64,

    #[arg(long, default_value_t = DEFAULT_MAX_STEP_DELAY_MS)]
    max_delay_ms: u64,

    #[arg(long, default_value_t = DEFAULT_RETRY_DELAY_MS)]
    retry_delay_ms: u64,

    /// Chance (0.0 - 1.0) that a step shows a transient error before completing.
    #[arg(long, default_value_t = DEFAULT_ERROR_RATE)]
    error_rate: f64,

    /// Print each finished run as JSON.
    #[arg(long)]
    json: bool,

    #[arg(long)]
    no_color: bool,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            min_step_delay: Duration::from_millis(self.min_delay_ms),
            max_step_delay: Duration::from_millis(self.max_delay_ms),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            error_rate: self.error_rate,
            seed: self.seed,
            instant: self.instant,
            ..Config::default()
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum ReplInput {
    Command(String),
    Example(usize),
    Examples,
    History,
    Status,
    Results,
    Help,
    Quit,
    Unknown(String),
}

fn parse_input(line: &str) -> ReplInput {
    let trimmed = line.trim();
    let Some(meta) = trimmed.strip_prefix(':') else {
        return ReplInput::Command(line.to_string());
    };

    let mut parts = meta.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("quit" | "exit" | "q"), None) => ReplInput::Quit,
        (Some("help" | "h"), None) => ReplInput::Help,
        (Some("examples"), None) => ReplInput::Examples,
        (Some("history"), None) => ReplInput::History,
        (Some("status"), None) => ReplInput::Status,
        (Some("results"), None) => ReplInput::Results,
        (Some("example"), Some(n)) => match n.parse::<usize>() {
            Ok(n) if (1..=EXAMPLE_COMMANDS.len()).contains(&n) => ReplInput::Example(n),
            _ => ReplInput::Unknown(trimmed.to_string()),
        },
        _ => ReplInput::Unknown(trimmed.to_string()),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    if cli.no_color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let context = Context::from_config(&cli.config()).context("failed to set up the agent")?;
    let agent = BrowserAgent::new(context);
    let renderer = TerminalRenderer::new();

    print_banner();

    if cli.command.is_empty() {
        run_repl(&agent, &renderer, cli.json).await
    } else {
        let command = cli.command.join(" ");
        let entry = agent.submit(&command, &renderer).await?;
        println!();
        println!("{}", render::format_status(&agent.status()));
        if cli.json {
            print_json(&entry)?;
        }
        Ok(())
    }
}

fn print_banner() {
    println!("{} {}", "Fetchly".bold(), "· AI-powered web navigation and data extraction".dimmed());
}

fn print_help() {
    println!("Type a command and press Enter, or:");
    for (cmd, what) in [
        (":examples", "list example commands"),
        (":example <n>", "run example n"),
        (":history", "show command history"),
        (":results", "show the latest results"),
        (":status", "show agent status"),
        (":quit", "leave"),
    ] {
        println!("  {} {}", format!("{cmd:<14}").blue(), what.dimmed());
    }
}

fn prompt() -> Result<()> {
    print!("{} ", "fetchly>".blue().bold());
    std::io::stdout().flush().context("failed to flush stdout")
}

fn print_json(entry: &HistoryEntry) -> Result<()> {
    let json = serde_json::to_string_pretty(entry).context("failed to serialize run")?;
    println!("{json}");
    Ok(())
}

async fn run_repl(agent: &BrowserAgent, renderer: &TerminalRenderer, json: bool) -> Result<()> {
    // A pending tokio stdin read would block runtime shutdown after :quit.
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    println!();
    println!("{}", render::format_examples());
    println!();
    print_help();
    prompt()?;

    while let Some(line) = rx.recv().await {
        let flow = match parse_input(&line) {
            ReplInput::Quit => Flow::Quit,
            ReplInput::Example(n) => {
                execute(agent, renderer, &mut rx, EXAMPLE_COMMANDS[n - 1], json).await?
            }
            ReplInput::Command(command) => {
                execute(agent, renderer, &mut rx, &command, json).await?
            }
            other => {
                show(agent, renderer, &other);
                Flow::Continue
            }
        };
        if flow == Flow::Quit {
            break;
        }
        prompt()?;
    }

    println!();
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Serves the meta-commands that only display state.
fn show(agent: &BrowserAgent, renderer: &TerminalRenderer, input: &ReplInput) {
    match input {
        ReplInput::Help => print_help(),
        ReplInput::Examples => println!("{}", render::format_examples()),
        ReplInput::History => println!("{}", render::format_history(&agent.history())),
        ReplInput::Status => println!("{}", render::format_status(&agent.status())),
        ReplInput::Results => println!("{}", render::format_results(&agent.results())),
        ReplInput::Unknown(input) => {
            renderer.notice(&format!("unknown command {input}"), Some("Try :help"))
        }
        ReplInput::Command(_) | ReplInput::Example(_) | ReplInput::Quit => {}
    }
}

/// Runs one command. Lines typed meanwhile are parsed as usual: commands bounce off the
/// in-flight lock, display commands are served, and `:quit` takes effect once the run ends.
async fn execute(
    agent: &BrowserAgent,
    renderer: &TerminalRenderer,
    rx: &mut mpsc::UnboundedReceiver<String>,
    command: &str,
    json: bool,
) -> Result<Flow> {
    let run = agent.submit(command, renderer);
    tokio::pin!(run);

    let mut flow = Flow::Continue;
    let outcome = loop {
        tokio::select! {
            // The run is polled first so it holds the lock before any typed-ahead line.
            biased;
            outcome = &mut run => break outcome,
            Some(line) = rx.recv() => match parse_input(&line) {
                ReplInput::Quit => {
                    flow = Flow::Quit;
                    renderer.notice("leaving after the current run", None);
                }
                ReplInput::Command(line) => reject(agent, renderer, &line).await,
                ReplInput::Example(n) => reject(agent, renderer, EXAMPLE_COMMANDS[n - 1]).await,
                other => show(agent, renderer, &other),
            },
        }
    };

    match outcome {
        Ok(entry) => {
            println!();
            println!("{}", render::format_status(&agent.status()));
            if json {
                print_json(&entry)?;
            }
        }
        Err(err) => report(renderer, &err),
    }
    Ok(flow)
}

async fn reject(agent: &BrowserAgent, renderer: &TerminalRenderer, command: &str) {
    if let Err(err) = agent.submit(command, renderer).await {
        report(renderer, &err);
    }
}

fn report(renderer: &TerminalRenderer, err: &AgentError) {
    match err {
        AgentError::Submit(rejection) => renderer.notice(&rejection.to_string(), rejection.hint()),
        AgentError::Session(_) => renderer.notice(&err.to_string(), None),
    }
}
