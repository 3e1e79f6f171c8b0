//! LLM-backed content generator.
//!
//! Adapts any [`LlmProvider`] to the workflow's [`ContentGenerator`] port:
//! turns a [`GenerationRequest`] into a prompt, sends one completion, and
//! returns the text. Retrying is the generation step's job, not this one's.

use quill_types::llm::{CompletionRequest, LlmError, Message};
use tracing::{Instrument, info_span};

use crate::workflow::generation::{ContentGenerator, GenerationRequest};

use super::provider::LlmProvider;

/// System prompt for every draft request.
pub const SYSTEM_PROMPT: &str = "You are an expert LinkedIn content writer";

/// Build the user prompt for one generation attempt.
pub fn build_draft_prompt(request: &GenerationRequest) -> String {
    let mut prompt = format!(
        "LinkedIn Topic: {topic}\n\
         Human Feedback: {feedback}\n\
         \n\
         Generate a structured and well-written LinkedIn post based on the given topic. \
         In just 50 words, make it engaging and professional.\n\
         \n\
         Consider previous human feedback to refine the response.",
        topic = request.topic,
        feedback = request.latest_feedback,
    );

    if let Some(note) = &request.prior_error {
        prompt.push_str("\n\n");
        prompt.push_str(note);
    }

    prompt
}

/// Sampling settings for draft requests.
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

/// [`ContentGenerator`] that asks an LLM provider for each draft.
pub struct LlmContentGenerator<P: LlmProvider> {
    provider: P,
    settings: GeneratorSettings,
}

impl<P: LlmProvider> LlmContentGenerator<P> {
    pub fn new(provider: P, settings: GeneratorSettings) -> Self {
        Self { provider, settings }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn build_request(&self, request: &GenerationRequest) -> CompletionRequest {
        CompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![Message::user(build_draft_prompt(request))],
            system: Some(SYSTEM_PROMPT.to_string()),
            max_tokens: self.settings.max_tokens,
            temperature: Some(self.settings.temperature),
        }
    }
}

impl<P: LlmProvider> ContentGenerator for LlmContentGenerator<P> {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        let completion = self.build_request(request);

        let span = info_span!(
            "gen_ai.complete",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %completion.model,
            gen_ai.request.max_tokens = completion.max_tokens,
            gen_ai.request.temperature = ?completion.temperature,
            retry = request.prior_error.is_some(),
        );

        let response = self.provider.complete(&completion).instrument(span).await?;

        tracing::debug!(
            response_id = response.id.as_str(),
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            stop_reason = %response.stop_reason,
            "completion received"
        );

        if response.content.trim().is_empty() {
            return Err(LlmError::EmptyCompletion);
        }

        Ok(response.content)
    }
}
