//! `quill run`: one conversation from first draft to "done".

use anyhow::{Context, Result};
use console::style;

use quill_core::workflow::engine::EngineError;
use quill_core::workflow::feedback::{Reviewer, ScriptedReviewer};
use quill_core::workflow::generation::GenerationError;
use quill_types::conversation::ConversationState;

use crate::cli::render;
use crate::reviewer::{ConsoleReviewer, EchoingReviewer};
use crate::state::AppState;

pub async fn run(
    state: &AppState,
    topic: &str,
    thread_id: Option<&str>,
    feedback: Vec<String>,
    json: bool,
) -> Result<()> {
    let thread_id = thread_id.unwrap_or_else(|| state.default_thread_id());
    let initial = ConversationState::new(topic);

    let scripted = !feedback.is_empty();

    let result = if scripted {
        let reviewer = EchoingReviewer::new(ScriptedReviewer::new(feedback), !json);
        drive(state, &reviewer, initial, thread_id).await
    } else {
        drive(state, &ConsoleReviewer, initial, thread_id).await
    };

    match result {
        Ok(final_state) => {
            if json {
                let out = serde_json::json!({
                    "thread_id": thread_id,
                    "status": "terminated",
                    "final_draft": final_state.latest_draft().map(|d| d.content.as_str()),
                    "state": final_state,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                render::print_final(&final_state);
            }
            Ok(())
        }
        Err(EngineError::Generation(err)) => {
            report_generation_failure(&err, json)?;
            Err(err).context("run aborted")
        }
        Err(EngineError::Review(err)) if scripted => {
            Err(err).context("feedback ran out before \"done\"")
        }
        Err(err) => Err(err.into()),
    }
}

async fn drive<R: Reviewer>(
    state: &AppState,
    reviewer: &R,
    initial: ConversationState,
    thread_id: &str,
) -> Result<ConversationState, EngineError> {
    state.engine.run(reviewer, initial, thread_id).await
}

/// Print the topic, attempt count and last error of a fatal generation failure.
pub fn report_generation_failure(err: &GenerationError, json: bool) -> Result<()> {
    if json {
        let out = serde_json::json!({
            "status": "failed",
            "topic": err.topic,
            "attempts": err.attempts,
            "last_error": err.last_error.to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        eprintln!();
        eprintln!(
            "  {} Generation failed after {} attempt(s)",
            style("✗").red().bold(),
            err.attempts
        );
        eprintln!("  {}  {}", style("Topic:").bold(), err.topic);
        eprintln!("  {}  {}", style("Error:").bold(), err.last_error);
        eprintln!();
    }
    Ok(())
}
