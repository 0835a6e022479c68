use anyhow::{anyhow, Result};

use fagsvar_rag::{
    answer_query, AnswerSettings, ConversationLog, EmbeddingClient, LlmClient, LlmProvider,
    SegmentStore, DEFAULT_MAX_ANSWER_CHARS,
};

use crate::logging;

pub async fn run(question: String, store_path: String, threshold: f32) -> Result<()> {
    let embeddings = EmbeddingClient::from_env()?;
    let llm = llm_client()?;
    let store = SegmentStore::load(&store_path);
    if store.is_empty() {
        logging::verbose(format!("store at {store_path} is empty, answers will be generated"));
    }
    let settings = AnswerSettings {
        similarity_threshold: threshold,
        max_answer_chars: DEFAULT_MAX_ANSWER_CHARS,
    };
    let log = ConversationLog::new();
    let result = answer_query(&store, &embeddings, &llm, &log, &settings, &question).await?;
    logging::verbose(format!("answer origin: {:?}", result.origin));
    println!("{}", result.answer);
    Ok(())
}

fn llm_client() -> Result<LlmClient> {
    let name = std::env::var("FAGSVAR_LLM_PROVIDER").unwrap_or_else(|_| "openai".to_string());
    let provider =
        LlmProvider::from_str(&name).ok_or_else(|| anyhow!("unknown llm provider {name}"))?;
    let model = std::env::var("FAGSVAR_LLM_MODEL")
        .unwrap_or_else(|_| default_llm_model(provider).to_string());
    LlmClient::new(provider, model)
}

fn default_llm_model(provider: LlmProvider) -> &'static str {
    match provider {
        LlmProvider::OpenAi => "gpt-4.1-mini",
        LlmProvider::Local => "local",
    }
}
