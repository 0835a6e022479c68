use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use fagsvar_core::DEFAULT_CHUNK_CHARS;
use fagsvar_rag::{
    answer_query, ingest_directory, AnswerSettings, ConversationLog, EmbeddingClient, LlmClient,
    LlmProvider, SegmentStore, DEFAULT_MAX_ANSWER_CHARS, DEFAULT_SIMILARITY_THRESHOLD,
};

const GENERIC_FAILURE: &str = "Something went wrong. Please try again later.";

const MISSING_QUERY: &str = "No query provided.";

struct AppState {
    store: SegmentStore,
    embeddings: EmbeddingClient,
    llm: LlmClient,
    log: ConversationLog,
    settings: AnswerSettings,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();
    let config = ServiceConfig::load();
    let embeddings = EmbeddingClient::from_env().unwrap_or_else(|_| EmbeddingClient::hash());
    let llm = build_llm_client()?;

    let store_path =
        std::env::var("FAGSVAR_STORE").unwrap_or_else(|_| "data/embeddings.json".to_string());
    let docs_dir =
        std::env::var("FAGSVAR_DOCS_DIR").unwrap_or_else(|_| "data/docs".to_string());
    let mut store = SegmentStore::load(&store_path);
    match ingest_directory(&mut store, Path::new(&docs_dir), config.chunk_chars, &embeddings).await
    {
        Ok(report) => info!(
            ingested = report.sources_ingested,
            skipped = report.sources_skipped,
            failed_sources = report.sources_failed,
            segments = report.segments_added,
            failed_chunks = report.chunks_failed,
            "startup ingestion complete"
        ),
        Err(err) => error!(error = %err, "startup ingestion failed, serving existing store"),
    }
    info!(segments = store.len(), sources = store.source_count(), "segment store ready");

    let state = Arc::new(AppState {
        store,
        embeddings,
        llm,
        log: ConversationLog::new(),
        settings: AnswerSettings {
            similarity_threshold: config.similarity_threshold,
            max_answer_chars: config.max_answer_chars,
        },
    });
    let app = Router::new()
        .route("/healthz", get(handle_health))
        .route("/api/query", post(handle_query))
        .with_state(state);
    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening" = %addr);
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_llm_client() -> anyhow::Result<LlmClient> {
    let name = std::env::var("FAGSVAR_LLM_PROVIDER").unwrap_or_else(|_| "openai".to_string());
    let provider = LlmProvider::from_str(&name)
        .ok_or_else(|| anyhow::anyhow!("unknown llm provider {name}"))?;
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

#[derive(Debug, Deserialize)]
struct QueryRequest {
    query: Option<String>,
}

#[derive(Debug, Serialize)]
struct QueryResponse {
    answer: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

async fn handle_query(
    State(state): State<Arc<AppState>>,
    Json(body): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, AppError> {
    let query = body.query.unwrap_or_default();
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::bad_request(MISSING_QUERY));
    }
    let result = answer_query(
        &state.store,
        &state.embeddings,
        &state.llm,
        &state.log,
        &state.settings,
        query,
    )
    .await
    .map_err(AppError::internal)?;
    Ok(Json(QueryResponse {
        answer: result.answer,
    }))
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "segments": state.store.len(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ServiceConfig {
    similarity_threshold: f32,
    max_answer_chars: usize,
    chunk_chars: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_answer_chars: DEFAULT_MAX_ANSWER_CHARS,
            chunk_chars: DEFAULT_CHUNK_CHARS,
        }
    }
}

impl ServiceConfig {
    fn load() -> Self {
        let config_path =
            std::env::var("FAGSVAR_CONFIG").unwrap_or_else(|_| "fagsvar.toml".to_string());
        let path = Path::new(&config_path);
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }
}

#[derive(Debug, Error)]
enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn bad_request<E: ToString>(msg: E) -> Self {
        Self::BadRequest(msg.to_string())
    }

    fn internal<E: Into<anyhow::Error>>(err: E) -> Self {
        Self::Internal(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(ErrorBody { error: msg })).into_response()
            }
            AppError::Internal(err) => {
                error!("internal_error" = %err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        error: GENERIC_FAILURE.to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_match_pipeline_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.similarity_threshold, DEFAULT_SIMILARITY_THRESHOLD);
        assert_eq!(config.max_answer_chars, DEFAULT_MAX_ANSWER_CHARS);
        assert_eq!(config.chunk_chars, DEFAULT_CHUNK_CHARS);
    }

    #[test]
    fn config_parses_partial_toml() {
        let config: ServiceConfig = toml::from_str("similarity_threshold = 0.6").unwrap();
        assert_eq!(config.similarity_threshold, 0.6);
        assert_eq!(config.max_answer_chars, DEFAULT_MAX_ANSWER_CHARS);
    }

    #[test]
    fn bad_request_keeps_its_message() {
        let err = AppError::bad_request(MISSING_QUERY);
        assert_eq!(err.to_string(), "No query provided.");
    }
}
