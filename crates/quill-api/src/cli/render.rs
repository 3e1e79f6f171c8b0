//! Terminal rendering shared by `run` and `shell`.

use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use quill_types::checkpoint::{Checkpoint, CheckpointSummary, WorkflowStep};
use quill_types::conversation::ConversationState;

pub fn print_draft(draft: &str) {
    println!();
    println!("  {}", style("Generated draft").cyan().bold());
    println!();
    for line in draft.lines() {
        println!("  {line}");
    }
    println!();
}

pub fn print_final(state: &ConversationState) {
    println!();
    println!(
        "  {} Finished after {} draft(s), {} feedback round(s)",
        style("✓").green().bold(),
        state.drafts().len(),
        state.feedback().len()
    );
    if let Some(draft) = state.latest_draft() {
        print_draft(&draft.content);
    }
}

fn step_cell(step: WorkflowStep) -> Cell {
    let cell = Cell::new(step.to_string());
    match step {
        WorkflowStep::AwaitingFeedback => cell.fg(Color::Yellow),
        WorkflowStep::Terminated => cell.fg(Color::Green),
        _ => cell,
    }
}

pub fn summaries_table(summaries: &[CheckpointSummary]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Thread").fg(Color::Cyan),
            Cell::new("Topic"),
            Cell::new("Step"),
            Cell::new("Drafts"),
            Cell::new("Updated"),
        ]);

    for s in summaries {
        table.add_row(vec![
            Cell::new(&s.thread_id),
            Cell::new(&s.topic),
            step_cell(s.pending_step),
            Cell::new(s.cycle),
            Cell::new(s.updated_at.format("%Y-%m-%d %H:%M:%S")),
        ]);
    }

    table
}

pub fn print_checkpoint(checkpoint: &Checkpoint) {
    println!();
    println!(
        "  {}  {}",
        style("Thread:").bold(),
        style(&checkpoint.thread_id).cyan()
    );
    println!("  {}   {}", style("Topic:").bold(), checkpoint.state.topic());
    println!("  {}    {}", style("Step:").bold(), checkpoint.pending_step);
    println!(
        "  {}      {}",
        style("ID:").bold(),
        style(checkpoint.id.to_string()).dim()
    );

    for (i, draft) in checkpoint.state.drafts().iter().enumerate() {
        println!();
        println!("  {}", style(format!("Draft {}", i + 1)).bold());
        for line in draft.content.lines() {
            println!("    {line}");
        }
        if let Some(fb) = checkpoint.state.feedback().get(i) {
            println!("  {} {}", style("Feedback:").dim(), fb.content);
        }
    }
    println!();
}
