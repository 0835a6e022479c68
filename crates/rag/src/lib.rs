pub mod embedding;
pub mod history;
pub mod ingest;
pub mod pipeline;
pub mod store;

pub use embedding::{EmbeddingBackend, EmbeddingClient};
pub use history::{ConversationLog, Turn};
pub use ingest::{discover_documents, ingest_directory, ingest_files, IngestReport};
pub use pipeline::{
    answer_query, AnswerOrigin, AnswerSettings, QueryAnswer, DEFAULT_MAX_ANSWER_CHARS,
    FOLLOW_UP_TRIGGER, NO_PRIOR_QUESTION, RESTATEMENT_PREFIX,
};
pub use store::{
    cosine_similarity, SegmentMatch, SegmentSearch, SegmentStore, DEFAULT_SIMILARITY_THRESHOLD,
};
pub use fagsvar_llm::{LlmClient, LlmProvider, LlmRequest, LlmResponse};
