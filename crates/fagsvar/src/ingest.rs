use std::path::Path;

use anyhow::Result;

use fagsvar_rag::{discover_documents, ingest_files, EmbeddingClient, SegmentStore};

use crate::logging;

pub async fn run(input: String, store_path: String, chunk_chars: usize, embedder: String) -> Result<()> {
    let embeddings = embedding_client(&embedder)?;
    let files = discover_documents(Path::new(&input))?;
    if files.is_empty() {
        logging::info(format!("no .txt documents found under {input}"));
        return Ok(());
    }
    logging::info(format!("discovered {} documents under {input}", files.len()));

    let mut store = SegmentStore::load(&store_path);
    let report = ingest_files(&mut store, &files, chunk_chars, &embeddings).await?;
    logging::info(format!(
        "ingested {} sources, skipped {}, added {} segments ({} chunks failed)",
        report.sources_ingested, report.sources_skipped, report.segments_added, report.chunks_failed
    ));
    logging::verbose(format!(
        "store at {store_path} now holds {} segments",
        store.len()
    ));
    Ok(())
}

fn embedding_client(choice: &str) -> Result<EmbeddingClient> {
    match choice {
        "hash" => Ok(EmbeddingClient::hash()),
        _ => EmbeddingClient::from_env(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_choice_forces_the_hash_backend() {
        let client = embedding_client("hash").unwrap();
        assert_eq!(client.backend_name(), "hash");
    }

    #[tokio::test]
    async fn ingest_creates_store_and_reruns_are_noops() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("docs");
        std::fs::create_dir_all(&docs).unwrap();
        std::fs::write(
            docs.join("sluk.txt"),
            "Hvor ofte skal sluk renses?\n\nSvar: Minst to ganger i året.",
        )
        .unwrap();
        let store_path = dir.path().join("store.json");
        let store_arg = store_path.to_string_lossy().into_owned();
        let docs_arg = docs.to_string_lossy().into_owned();

        run(docs_arg.clone(), store_arg.clone(), 500, "hash".to_string())
            .await
            .unwrap();
        let first = SegmentStore::load(&store_path);
        assert_eq!(first.len(), 2);

        run(docs_arg, store_arg, 500, "hash".to_string())
            .await
            .unwrap();
        let second = SegmentStore::load(&store_path);
        assert_eq!(second.len(), 2);
    }
}
