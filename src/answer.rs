//! Answer synthesizer: retrieval-grounded question answering.
//!
//! Retrieves the best-matching chunks for a question, assembles them
//! into a labeled context block, and asks the completion model to
//! answer strictly from that context. Zero retrieved chunks short-
//! circuits to a fixed fallback without any model call.

use std::sync::Arc;

use crate::completion::CompletionClient;
use crate::config::{ChatConfig, RetrievalConfig};
use crate::error::PipelineError;
use crate::models::{preview, ChatOutcome, SearchHit, SourceRef};
use crate::retrieve::Retriever;

/// Fixed answer returned when retrieval produces no hits.
pub const FALLBACK_ANSWER: &str =
    "I couldn't find any relevant information to answer your question.";

const SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions based on the \
                             provided context. Be concise and accurate.";

pub struct Answerer {
    retriever: Arc<Retriever>,
    completion: Arc<dyn CompletionClient>,
    chat: ChatConfig,
    k: usize,
    min_score: f32,
}

impl Answerer {
    pub fn new(
        retriever: Arc<Retriever>,
        completion: Arc<dyn CompletionClient>,
        chat: ChatConfig,
        retrieval: &RetrievalConfig,
    ) -> Self {
        Self {
            retriever,
            completion,
            chat,
            k: retrieval.ask_k,
            min_score: retrieval.ask_min_score,
        }
    }

    /// Answer `query` from the indexed corpus.
    ///
    /// Never returns an error: any failure in the embedding, search, or
    /// completion chain is converted into [`ChatOutcome::Failed`]
    /// carrying the original query.
    pub async fn ask(&self, query: &str) -> ChatOutcome {
        match self.try_ask(query).await {
            Ok(outcome) => outcome,
            Err(e) => ChatOutcome::Failed {
                error: e.to_string(),
                query: query.to_string(),
            },
        }
    }

    async fn try_ask(&self, query: &str) -> Result<ChatOutcome, PipelineError> {
        let hits = self.retriever.search(query, self.k, self.min_score).await?;

        if hits.is_empty() {
            return Ok(ChatOutcome::Answered {
                answer: FALLBACK_ANSWER.to_string(),
                sources: Vec::new(),
                query: query.to_string(),
            });
        }

        let mut context_parts = Vec::new();
        let mut sources = Vec::new();
        for hit in &hits {
            if hit.payload.text.is_empty() {
                continue;
            }
            context_parts.push(format!(
                "Source: {}\n{}",
                hit.payload.section_heading, hit.payload.text
            ));
            sources.push(source_ref(hit));
        }

        let prompt = build_prompt(&context_parts.join("\n\n"), query);
        let answer = self
            .completion
            .complete(
                SYSTEM_PROMPT,
                &prompt,
                self.chat.max_tokens,
                self.chat.temperature,
            )
            .await?;

        Ok(ChatOutcome::Answered {
            answer: answer.trim().to_string(),
            sources,
            query: query.to_string(),
        })
    }
}

fn source_ref(hit: &SearchHit) -> SourceRef {
    SourceRef {
        id: hit.id.clone(),
        score: hit.score,
        section_heading: hit.payload.section_heading.clone(),
        journal: hit.payload.journal.clone(),
        publish_year: hit.payload.publish_year,
        text: preview(&hit.payload.text),
    }
}

fn build_prompt(context: &str, query: &str) -> String {
    format!(
        "Based on the following context, answer the user's question. If the context doesn't \
         contain enough information to answer the question, say so.\n\n\
         Context:\n{}\n\n\
         Question: {}\n\n\
         Answer:",
        context, query
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_context_and_question() {
        let prompt = build_prompt("Source: page_1\nbody text", "what is this?");
        assert!(prompt.contains("Context:\nSource: page_1\nbody text"));
        assert!(prompt.contains("Question: what is this?"));
        assert!(prompt.ends_with("Answer:"));
    }
}
