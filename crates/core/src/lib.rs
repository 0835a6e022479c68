mod answer;
mod chunk;
mod embedding;

pub use answer::{clean_answer, truncate_answer, ANSWER_LABEL};
pub use chunk::{split_text, DEFAULT_CHUNK_CHARS, SEGMENT_DELIMITER};
pub use embedding::{HashEmbedder, HashEmbedderConfig, Segment};
