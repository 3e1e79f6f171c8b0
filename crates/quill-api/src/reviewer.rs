//! Terminal reviewer: shows each draft and reads feedback from stdin.

use console::style;
use dialoguer::Input;

use quill_core::workflow::feedback::{ReviewError, ReviewRequest, Reviewer};

use crate::cli::render;

/// [`Reviewer`] backed by an interactive dialoguer prompt.
///
/// The prompt blocks, so it runs on the blocking pool.
pub struct ConsoleReviewer;

impl Reviewer for ConsoleReviewer {
    async fn review(&self, request: &ReviewRequest) -> Result<String, ReviewError> {
        render::print_draft(&request.latest_draft);

        let prompt = request.prompt.trim_end().to_string();
        let answer = tokio::task::spawn_blocking(move || {
            Input::<String>::new()
                .with_prompt(format!("{}", style(prompt).bold()))
                .allow_empty(true)
                .interact_text()
        })
        .await
        .map_err(|e| ReviewError::Io(format!("prompt task failed: {e}")))?;

        match answer {
            Ok(text) => Ok(text),
            Err(dialoguer::Error::IO(io))
                if matches!(
                    io.kind(),
                    std::io::ErrorKind::UnexpectedEof | std::io::ErrorKind::Interrupted
                ) =>
            {
                Err(ReviewError::Closed)
            }
            Err(other) => Err(ReviewError::Io(other.to_string())),
        }
    }
}

/// Wraps a non-interactive reviewer and prints each draft and answer.
pub struct EchoingReviewer<R> {
    inner: R,
    echo: bool,
}

impl<R: Reviewer> EchoingReviewer<R> {
    pub fn new(inner: R, echo: bool) -> Self {
        Self { inner, echo }
    }
}

impl<R: Reviewer> Reviewer for EchoingReviewer<R> {
    async fn review(&self, request: &ReviewRequest) -> Result<String, ReviewError> {
        let answer = self.inner.review(request).await?;
        if self.echo {
            render::print_draft(&request.latest_draft);
            println!("  {} {}", style(request.prompt.trim_end()).dim(), answer);
        }
        Ok(answer)
    }
}
