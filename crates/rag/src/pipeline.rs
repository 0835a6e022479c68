use anyhow::{ensure, Context, Result};
use tracing::{debug, warn};

use fagsvar_core::{clean_answer, truncate_answer};
use fagsvar_llm::{LlmClient, LlmRequest};

use crate::embedding::EmbeddingClient;
use crate::history::ConversationLog;
use crate::store::{SegmentSearch, DEFAULT_SIMILARITY_THRESHOLD};

pub const FOLLOW_UP_TRIGGER: &str = "forrige jeg spurte om";
pub const RESTATEMENT_PREFIX: &str = "Du spurte: ";
pub const NO_PRIOR_QUESTION: &str = "Ingen tidligere spørsmål registrert.";
pub const DEFAULT_MAX_ANSWER_CHARS: usize = 200;

const GENERATION_MAX_TOKENS: u32 = 150;
const PARAPHRASE_MAX_TOKENS: u32 = 150;
const PARAPHRASE_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone, Copy)]
pub struct AnswerSettings {
    pub similarity_threshold: f32,
    pub max_answer_chars: usize,
}

impl Default for AnswerSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_answer_chars: DEFAULT_MAX_ANSWER_CHARS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOrigin {
    Retrieval,
    Generation,
    History,
}

#[derive(Debug, Clone)]
pub struct QueryAnswer {
    pub answer: String,
    pub origin: AnswerOrigin,
}

pub async fn answer_query(
    search: &impl SegmentSearch,
    embeddings: &EmbeddingClient,
    llm: &LlmClient,
    log: &ConversationLog,
    settings: &AnswerSettings,
    query: &str,
) -> Result<QueryAnswer> {
    let query = query.trim();
    ensure!(!query.is_empty(), "query must not be empty");

    if query.to_lowercase().contains(FOLLOW_UP_TRIGGER) {
        let answer = match log.last() {
            Some(turn) => format!("{RESTATEMENT_PREFIX}{}", turn.query),
            None => NO_PRIOR_QUESTION.to_string(),
        };
        return Ok(QueryAnswer {
            answer,
            origin: AnswerOrigin::History,
        });
    }

    let query_embedding = embeddings.embed(query).await.context("failed to embed query")?;

    let (mut answer, origin) = match search.find_best_match(&query_embedding, settings.similarity_threshold) {
        Some(hit) => {
            debug!(score = hit.score, source = %hit.source, "answering from stored segment");
            (clean_answer(&hit.text), AnswerOrigin::Retrieval)
        }
        None => {
            debug!("no segment above threshold, falling back to generation");
            let request = LlmRequest {
                system: None,
                user: generation_prompt(query, settings.max_answer_chars),
                max_tokens: GENERATION_MAX_TOKENS,
                temperature: None,
            };
            let response = llm.chat(&request).await.context("fallback generation failed")?;
            (response.content, AnswerOrigin::Generation)
        }
    };

    if !answer.is_empty() {
        answer = paraphrase_or_keep(llm, &answer).await;
    }
    let answer = truncate_answer(&answer, settings.max_answer_chars);
    log.record(query, answer.clone());
    Ok(QueryAnswer { answer, origin })
}

fn generation_prompt(query: &str, max_chars: usize) -> String {
    format!(
        "You are an expert on plumbing. Provide a short, concise answer (max {max_chars} characters) to the following question: \"{query}\". Stick to industry standards and regulations."
    )
}

fn paraphrase_prompt(answer: &str) -> String {
    format!(
        "Rewrite the following answer to be more natural, friendly, and human while preserving all important details:\n\n\"{answer}\""
    )
}

async fn paraphrase_or_keep(llm: &LlmClient, answer: &str) -> String {
    let request = LlmRequest {
        system: None,
        user: paraphrase_prompt(answer),
        max_tokens: PARAPHRASE_MAX_TOKENS,
        temperature: Some(PARAPHRASE_TEMPERATURE),
    };
    match llm.chat(&request).await {
        Ok(response) if !response.content.trim().is_empty() => response.content.trim().to_string(),
        Ok(_) => answer.to_string(),
        Err(err) => {
            warn!(error = %err, "paraphrase failed, keeping original answer");
            answer.to_string()
        }
    }
}
