//! Question answering over the persisted index.
//!
//! Every question reloads the index from storage, so an answer always
//! reflects the most recently persisted document.

use crate::config::StoragePaths;
use crate::index::VectorIndex;
use crate::rag::{AnswerSynthesizer, CitationResolver, Retriever};
use crate::types::{AskResponse, ScoredPassage};
use docqa_core::AppResult;

/// Answer `question` from the persisted index.
///
/// Fails with `IndexNotFound` when no document has been ingested yet.
pub async fn ask(
    paths: &StoragePaths,
    retriever: &Retriever,
    synthesizer: &AnswerSynthesizer,
    question: &str,
) -> AppResult<AskResponse> {
    let passages = retrieve(paths, retriever, question).await?;
    let answer = synthesizer.synthesize(question, &passages).await?;

    Ok(respond(paths, question, answer, &passages))
}

/// Like [`ask`], but hands answer fragments to `on_chunk` as the model
/// produces them.
pub async fn ask_streaming<F>(
    paths: &StoragePaths,
    retriever: &Retriever,
    synthesizer: &AnswerSynthesizer,
    question: &str,
    on_chunk: F,
) -> AppResult<AskResponse>
where
    F: FnMut(&str),
{
    let passages = retrieve(paths, retriever, question).await?;
    let answer = synthesizer
        .synthesize_streaming(question, &passages, on_chunk)
        .await?;

    Ok(respond(paths, question, answer, &passages))
}

async fn retrieve(
    paths: &StoragePaths,
    retriever: &Retriever,
    question: &str,
) -> AppResult<Vec<ScoredPassage>> {
    tracing::info!("Answering question: {}", question);

    let index = VectorIndex::load(&paths.index_dir)?;

    let metadata = index.metadata();
    let provider = retriever.provider();
    if metadata.embedding_provider != provider.provider_name()
        || metadata.embedding_model != provider.model_name()
    {
        tracing::warn!(
            "Index was built with {}/{} but questions are embedded with {}/{}; re-ingest the document for meaningful results",
            metadata.embedding_provider,
            metadata.embedding_model,
            provider.provider_name(),
            provider.model_name()
        );
    }

    retriever.retrieve(&index, question).await
}

fn respond(
    paths: &StoragePaths,
    question: &str,
    answer: String,
    passages: &[ScoredPassage],
) -> AskResponse {
    let citations = CitationResolver::new(&paths.pages_dir).citations(passages);

    AskResponse {
        question: question.to_string(),
        answer,
        citations,
    }
}
