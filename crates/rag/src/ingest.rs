use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::{info, warn};
use walkdir::WalkDir;

use fagsvar_core::{split_text, Segment};

use crate::embedding::EmbeddingClient;
use crate::store::SegmentStore;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub sources_ingested: usize,
    pub sources_skipped: usize,
    pub sources_failed: usize,
    pub segments_added: usize,
    pub chunks_failed: usize,
}

pub fn discover_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(anyhow!("document directory {} does not exist", dir.display()));
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let is_txt = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("txt"))
            .unwrap_or(false);
        if is_txt {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

pub async fn ingest_files(
    store: &mut SegmentStore,
    files: &[PathBuf],
    chunk_chars: usize,
    embeddings: &EmbeddingClient,
) -> Result<IngestReport> {
    let mut report = IngestReport::default();
    for path in files {
        let source = path.to_string_lossy().into_owned();
        if store.contains_source(&source) {
            info!(source = %source, "source already ingested, skipping");
            report.sources_skipped += 1;
            continue;
        }
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                warn!(source = %source, error = %err, "failed to read document, skipping");
                report.sources_failed += 1;
                continue;
            }
        };
        let mut seen = std::collections::HashSet::new();
        let mut added = 0usize;
        for chunk in split_text(&text, chunk_chars) {
            // a document repeating the same passage yields one segment
            if !seen.insert(chunk.clone()) {
                continue;
            }
            let embedding = match embeddings.embed(&chunk).await {
                Ok(embedding) => embedding,
                Err(err) => {
                    warn!(source = %source, error = %err, "chunk embedding failed, skipping chunk");
                    report.chunks_failed += 1;
                    continue;
                }
            };
            if let Some(expected) = store.dimension() {
                if embedding.len() != expected {
                    warn!(
                        source = %source,
                        got = embedding.len(),
                        expected,
                        "embedding dimension mismatch, skipping chunk"
                    );
                    report.chunks_failed += 1;
                    continue;
                }
            }
            store.push(Segment {
                source: source.clone(),
                text: chunk,
                embedding,
            });
            added += 1;
        }
        info!(source = %source, segments = added, "document ingested");
        report.segments_added += added;
        report.sources_ingested += 1;
    }
    store.save().context("failed to persist segment store")?;
    Ok(report)
}

pub async fn ingest_directory(
    store: &mut SegmentStore,
    dir: &Path,
    chunk_chars: usize,
    embeddings: &EmbeddingClient,
) -> Result<IngestReport> {
    let files = discover_documents(dir)?;
    ingest_files(store, &files, chunk_chars, embeddings).await
}
