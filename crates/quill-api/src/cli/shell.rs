//! `quill shell`: an interactive session over one in-process checkpoint store.
//!
//! Each `start` suspends and hands control back to the prompt; `resume`
//! answers a suspended thread. Threads can be interleaved freely.

use std::time::Duration;

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rustyline_async::{Readline, ReadlineError, ReadlineEvent, SharedWriter};

use quill_core::workflow::engine::{EngineError, ResumeOutcome, Suspension};
use quill_types::conversation::ConversationState;

use crate::cli::render;
use crate::cli::run::report_generation_failure;
use crate::state::AppState;

/// Events produced by the input handler.
#[derive(Debug)]
pub enum InputEvent {
    Line(String),
    /// Ctrl+D.
    Eof,
    /// Ctrl+C.
    Interrupted,
}

/// Async line reader wrapping rustyline_async.
pub struct ShellInput {
    rl: Readline,
}

impl ShellInput {
    pub fn new(prompt: String) -> Result<(Self, SharedWriter), ReadlineError> {
        let (rl, stdout) = Readline::new(prompt)?;
        Ok((Self { rl }, stdout))
    }

    pub async fn read_line(&mut self) -> InputEvent {
        match self.rl.readline().await {
            Ok(ReadlineEvent::Line(line)) => InputEvent::Line(line.trim().to_string()),
            Ok(ReadlineEvent::Eof) => InputEvent::Eof,
            Ok(ReadlineEvent::Interrupted) => InputEvent::Interrupted,
            Err(_) => InputEvent::Eof,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum ShellCommand {
    /// Start a run; `thread_id` is `None` for the configured default.
    Start {
        thread_id: Option<String>,
        topic: String,
    },
    Resume {
        thread_id: String,
        feedback: String,
    },
    Show(String),
    List,
    Help,
    Quit,
    Invalid(String),
}

/// Parse one input line.
///
/// `start [@thread-id] <topic...>`, `resume <thread-id> [feedback...]`,
/// `show <thread-id>`, `list`, `help`, `quit`.
pub fn parse(input: &str) -> ShellCommand {
    let trimmed = input.trim();
    let (cmd, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (trimmed, ""),
    };

    match cmd.to_lowercase().as_str() {
        "start" | "new" => {
            let (thread_id, topic) = match rest.strip_prefix('@') {
                Some(tagged) => match tagged.split_once(char::is_whitespace) {
                    Some((id, topic)) => (Some(id.to_string()), topic.trim()),
                    None => (Some(tagged.to_string()), ""),
                },
                None => (None, rest),
            };
            if topic.is_empty() {
                ShellCommand::Invalid("start requires a topic".to_string())
            } else {
                ShellCommand::Start {
                    thread_id,
                    topic: topic.to_string(),
                }
            }
        }
        "resume" | "r" => {
            if rest.is_empty() {
                return ShellCommand::Invalid("resume requires a thread id".to_string());
            }
            // Feedback may be empty; the engine's policy decides what that means.
            let (thread_id, feedback) = match rest.split_once(char::is_whitespace) {
                Some((id, feedback)) => (id, feedback.trim()),
                None => (rest, ""),
            };
            ShellCommand::Resume {
                thread_id: thread_id.to_string(),
                feedback: feedback.to_string(),
            }
        }
        "show" => {
            if rest.is_empty() {
                ShellCommand::Invalid("show requires a thread id".to_string())
            } else {
                ShellCommand::Show(rest.to_string())
            }
        }
        "list" | "ls" => ShellCommand::List,
        "help" | "h" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => ShellCommand::Invalid(format!("unknown command: {other}")),
    }
}

fn print_help() {
    println!();
    println!("  {}", style("Commands:").bold());
    println!();
    println!("  {}  {}", style("start [@thread] <topic>").cyan(), "Generate a first draft and suspend");
    println!("  {}  {}", style("resume <thread> [text] ").cyan(), "Answer a suspended thread (\"done\" ends it)");
    println!("  {}  {}", style("show <thread>          ").cyan(), "Show a thread's checkpoint");
    println!("  {}  {}", style("list                   ").cyan(), "List all threads");
    println!("  {}  {}", style("quit                   ").cyan(), "Leave the shell");
    println!();
}

fn spinner(message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        bar.set_style(template);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

fn print_suspension(suspension: &Suspension, json: bool) -> Result<()> {
    if json {
        let out = serde_json::json!({
            "status": "awaiting_feedback",
            "thread_id": suspension.thread_id,
            "checkpoint_id": suspension.checkpoint_id,
            "cycle": suspension.cycle,
            "latest_draft": suspension.latest_draft,
            "prompt": suspension.prompt,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    render::print_draft(&suspension.latest_draft);
    println!(
        "  {} {} {}",
        style("⏸").yellow(),
        style(&suspension.prompt).dim(),
        style(format!("(resume {} ...)", suspension.thread_id)).dim()
    );
    println!();
    Ok(())
}

fn print_engine_error(err: &EngineError, json: bool) -> Result<()> {
    if let EngineError::Generation(gen_err) = err {
        return report_generation_failure(gen_err, json);
    }
    if json {
        let out = serde_json::json!({ "status": "error", "error": err.to_string() });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("\n  {} {err}\n", style("!").red().bold());
    }
    Ok(())
}

async fn dispatch(state: &AppState, command: ShellCommand, json: bool) -> Result<bool> {
    match command {
        ShellCommand::Start { thread_id, topic } => {
            let thread_id = thread_id.unwrap_or_else(|| state.default_thread_id().to_string());
            let progress = spinner("Generating draft...");
            let result = state
                .engine
                .start(ConversationState::new(topic), &thread_id)
                .await;
            progress.finish_and_clear();

            match result {
                Ok(suspension) => print_suspension(&suspension, json)?,
                Err(err) => print_engine_error(&err, json)?,
            }
        }

        ShellCommand::Resume {
            thread_id,
            feedback,
        } => {
            let progress = spinner("Revising draft...");
            let result = state.engine.resume(&thread_id, &feedback).await;
            progress.finish_and_clear();

            match result {
                Ok(ResumeOutcome::Suspended(suspension)) => print_suspension(&suspension, json)?,
                Ok(ResumeOutcome::Terminated(final_state)) => {
                    if json {
                        let out = serde_json::json!({
                            "status": "terminated",
                            "thread_id": thread_id,
                            "final_draft": final_state.latest_draft().map(|d| d.content.as_str()),
                            "state": final_state,
                        });
                        println!("{}", serde_json::to_string_pretty(&out)?);
                    } else {
                        render::print_final(&final_state);
                    }
                }
                Err(err) => print_engine_error(&err, json)?,
            }
        }

        ShellCommand::Show(thread_id) => match state.engine.checkpoint(&thread_id).await? {
            Some(checkpoint) if json => {
                println!("{}", serde_json::to_string_pretty(&checkpoint)?);
            }
            Some(checkpoint) => render::print_checkpoint(&checkpoint),
            None => println!(
                "\n  {} No checkpoint for '{}'\n",
                style("?").yellow().bold(),
                thread_id
            ),
        },

        ShellCommand::List => {
            let threads = state.engine.threads().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&threads)?);
            } else if threads.is_empty() {
                println!("\n  {}\n", style("No threads yet. Try: start <topic>").dim());
            } else {
                println!("{}", render::summaries_table(&threads));
            }
        }

        ShellCommand::Help => print_help(),

        ShellCommand::Quit => return Ok(false),

        ShellCommand::Invalid(reason) => {
            println!(
                "\n  {} {}. Type {} for commands.\n",
                style("?").yellow().bold(),
                reason,
                style("help").cyan()
            );
        }
    }

    Ok(true)
}

pub async fn run_shell(state: &AppState, json: bool) -> Result<()> {
    if !json {
        println!();
        println!(
            "  {} {}",
            style("quill").cyan().bold(),
            style(format!(
                "model {} · default thread {}",
                state.config.model.model,
                state.default_thread_id()
            ))
            .dim()
        );
        println!("  {}", style("Type help for commands, Ctrl+D to exit.").dim());
        println!();
    }

    let (mut input, _writer) = ShellInput::new("quill> ".to_string())
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        match input.read_line().await {
            InputEvent::Eof => break,
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D or type quit to exit.").dim());
            }
            InputEvent::Line(line) if line.is_empty() => {}
            InputEvent::Line(line) => {
                tracing::debug!(input = line.as_str(), "shell command");
                if !dispatch(state, parse(&line), json).await? {
                    break;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_start_with_default_thread() {
        assert_eq!(
            parse("start The future of AI in healthcare"),
            ShellCommand::Start {
                thread_id: None,
                topic: "The future of AI in healthcare".to_string(),
            }
        );
    }

    #[test]
    fn parse_start_with_explicit_thread() {
        assert_eq!(
            parse("start @ai-health The future of AI"),
            ShellCommand::Start {
                thread_id: Some("ai-health".to_string()),
                topic: "The future of AI".to_string(),
            }
        );
        assert!(matches!(parse("start @only-thread"), ShellCommand::Invalid(_)));
        assert!(matches!(parse("start"), ShellCommand::Invalid(_)));
    }

    #[test]
    fn parse_resume_keeps_feedback_text() {
        assert_eq!(
            parse("resume t-1 Make it shorter, please"),
            ShellCommand::Resume {
                thread_id: "t-1".to_string(),
                feedback: "Make it shorter, please".to_string(),
            }
        );
        assert_eq!(
            parse("r t-1"),
            ShellCommand::Resume {
                thread_id: "t-1".to_string(),
                feedback: String::new(),
            }
        );
        assert!(matches!(parse("resume"), ShellCommand::Invalid(_)));
    }

    #[test]
    fn parse_simple_commands() {
        assert_eq!(parse("LIST"), ShellCommand::List);
        assert_eq!(parse("show t-1"), ShellCommand::Show("t-1".to_string()));
        assert_eq!(parse("?"), ShellCommand::Help);
        assert_eq!(parse("exit"), ShellCommand::Quit);
        assert_eq!(
            parse("frobnicate"),
            ShellCommand::Invalid("unknown command: frobnicate".to_string())
        );
    }
}
