//! Answer synthesis from retrieved passages.
//!
//! The question and the retrieved passages are rendered into the answer
//! prompt and sent to the language model. The model is called even when
//! no passages were retrieved; the prompt then carries an empty context.

use crate::types::ScoredPassage;
use docqa_core::{AppError, AppResult};
use docqa_llm::{LlmClient, LlmRequest, LlmUsage};
use docqa_prompt::{build_prompt, load_prompt, PromptDefinition, RAG_ANSWER_PROMPT_ID};
use futures::StreamExt;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Separator between passages in the rendered context.
const CONTEXT_SEPARATOR: &str = "\n\n";

/// Turns a question and its passages into a short answer.
pub struct AnswerSynthesizer {
    client: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
}

impl AnswerSynthesizer {
    /// Create a synthesizer using the answer prompt from `prompts_dir`,
    /// falling back to the built-in template.
    pub fn new(
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
        prompts_dir: &Path,
    ) -> AppResult<Self> {
        let prompt = load_prompt(prompts_dir, RAG_ANSWER_PROMPT_ID)?;
        Ok(Self::with_prompt(client, model, prompt))
    }

    pub fn with_prompt(
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
        prompt: PromptDefinition,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            prompt,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.client.provider_name()
    }

    /// Produce the complete answer text.
    pub async fn synthesize(&self, question: &str, passages: &[ScoredPassage]) -> AppResult<String> {
        let request = self.request(question, passages)?;

        tracing::info!(
            "Synthesizing answer from {} passages (provider: {}, model: {})",
            passages.len(),
            self.client.provider_name(),
            self.model
        );

        let response = self.client.complete(&request).await?;
        log_usage(&response.usage);

        Ok(response.content.trim().to_string())
    }

    /// Produce the answer incrementally, handing each fragment to
    /// `on_chunk` as it arrives. Returns the full answer text.
    pub async fn synthesize_streaming<F>(
        &self,
        question: &str,
        passages: &[ScoredPassage],
        mut on_chunk: F,
    ) -> AppResult<String>
    where
        F: FnMut(&str),
    {
        let request = self.request(question, passages)?.with_streaming();

        tracing::info!(
            "Streaming answer from {} passages (provider: {}, model: {})",
            passages.len(),
            self.client.provider_name(),
            self.model
        );

        let mut stream = self.client.stream(&request).await?;
        let mut full_content = String::new();

        while let Some(result) = stream.next().await {
            let chunk = result?;

            if !chunk.content.is_empty() {
                full_content.push_str(&chunk.content);
                on_chunk(&chunk.content);
            }

            if chunk.done {
                if let Some(usage) = &chunk.usage {
                    log_usage(usage);
                }
                break;
            }
        }

        Ok(full_content.trim().to_string())
    }

    fn request(&self, question: &str, passages: &[ScoredPassage]) -> AppResult<LlmRequest> {
        let mut variables = HashMap::new();
        variables.insert("question".to_string(), question.to_string());
        variables.insert("context".to_string(), build_context(passages));

        let built = build_prompt(&self.prompt, variables)?;
        if built.user.trim().is_empty() {
            return Err(AppError::Prompt(format!(
                "Prompt '{}' rendered to an empty message",
                self.prompt.id
            )));
        }

        let mut request = LlmRequest::new(built.user, &self.model);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }
        if let Some(max_tokens) = built.metadata.behavior.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        if let Some(temperature) = built.metadata.behavior.temperature {
            request = request.with_temperature(temperature);
        }

        Ok(request)
    }
}

/// Passage texts in retrieval order, separated by blank lines.
pub fn build_context(passages: &[ScoredPassage]) -> String {
    passages
        .iter()
        .map(|p| p.passage.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

fn log_usage(usage: &LlmUsage) {
    tracing::debug!(
        "Token usage - Prompt: {}, Completion: {}, Total: {}",
        usage.prompt_tokens,
        usage.completion_tokens,
        usage.total_tokens
    );
}
