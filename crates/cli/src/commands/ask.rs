//! Ask command handler.
//!
//! Answers a question from the ingested document and lists the cited pages.

use clap::Args;
use docqa_core::{config::AppConfig, AppResult};
use docqa_knowledge::{AnswerSynthesizer, AskResponse, RagSettings, Retriever, StoragePaths};
use docqa_llm::create_client;
use std::io::Write;
use std::time::Duration;

/// Maximum snippet length for printed citations.
const MAX_SNIPPET_LENGTH: usize = 150;

/// Ask a question about the ingested document
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Print the answer as it is generated
    #[arg(long)]
    pub stream: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        config.validate()?;

        let paths = StoragePaths::from_config(config);
        let settings = RagSettings::default();

        let (provider, _) = super::embedding_provider(config)?;
        let retriever = Retriever::new(provider, &settings);

        let endpoint = config.endpoint_for(&config.provider);
        let api_key = config.resolve_api_key(&config.provider);
        let client = create_client(
            &config.provider,
            endpoint.as_deref(),
            api_key.as_deref(),
            Duration::from_secs(config.request_timeout_secs),
        )?;
        let synthesizer = AnswerSynthesizer::new(client, &config.model, &paths.prompts_dir)?;

        let response = if self.stream && !self.json {
            let response = docqa_knowledge::ask_streaming(
                &paths,
                &retriever,
                &synthesizer,
                &self.question,
                |piece| {
                    print!("{}", piece);
                    std::io::stdout().flush().ok();
                },
            )
            .await?;
            println!();
            response
        } else {
            docqa_knowledge::ask(&paths, &retriever, &synthesizer, &self.question).await?
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
        } else {
            if !self.stream {
                println!("{}", response.answer);
            }
            print_citations(&response);
        }

        Ok(())
    }
}

fn print_citations(response: &AskResponse) {
    println!();
    if response.citations.is_empty() {
        println!("Sources: (no passages retrieved)");
        return;
    }

    println!("Sources:");
    for citation in &response.citations {
        let document = citation
            .source_document
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| citation.source_document.display().to_string());

        println!(
            "- {} page {} (score {:.3})",
            document,
            citation.display_page(),
            citation.score
        );
        println!("  \"{}\"", truncate_snippet(&citation.passage_text, MAX_SNIPPET_LENGTH));
        if let Some(image) = &citation.page_image {
            println!("  image: {}", image.display());
        }
    }
}

/// Collapse whitespace and cut at a word boundary within `max_chars`.
fn truncate_snippet(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }

    let truncated: String = flat.chars().take(max_chars).collect();
    match truncated.rfind(' ') {
        Some(last_space) => format!("{}...", &truncated[..last_space]),
        None => format!("{}...", truncated),
    }
}
