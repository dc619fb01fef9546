//! Prompts compiled into the binary.

use crate::types::{PromptBehavior, PromptDefinition, PromptOutputSpec};

/// Identifier of the document question-answering template.
pub const RAG_ANSWER_PROMPT_ID: &str = "rag.answer";

const RAG_ANSWER_TEMPLATE: &str = "Use the following context to answer the question.
- Provide a direct answer based on the context.
- Keep the response concise (within 5 lines).
- Give the answer immediately without preamble.

Context:
{{context}}

Question: {{question}}

Answer:";

/// Look up a built-in prompt by ID.
pub fn builtin_prompt(prompt_id: &str) -> Option<PromptDefinition> {
    match prompt_id {
        RAG_ANSWER_PROMPT_ID => Some(PromptDefinition {
            id: RAG_ANSWER_PROMPT_ID.to_string(),
            title: "Answer a question from document context".to_string(),
            api_version: "1.0".to_string(),
            created_by: "docqa".to_string(),
            behavior: PromptBehavior::default(),
            system: None,
            template: RAG_ANSWER_TEMPLATE.to_string(),
            output: PromptOutputSpec::default(),
        }),
        _ => None,
    }
}
