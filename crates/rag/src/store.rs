use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use fagsvar_core::Segment;

pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.75;

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentMatch {
    pub source: String,
    pub text: String,
    pub score: f32,
}

pub trait SegmentSearch {
    fn find_best_match(&self, query: &[f32], threshold: f32) -> Option<SegmentMatch>;
}

pub struct SegmentStore {
    path: PathBuf,
    segments: Vec<Segment>,
}

impl SegmentStore {
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let segments = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<Vec<Segment>>(&bytes) {
                Ok(segments) => segments,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "segment store corrupt, starting empty");
                    Vec::new()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => Vec::new(),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "segment store unreadable, starting empty");
                Vec::new()
            }
        };
        Self { path, segments }
    }

    pub fn save(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create store directory {}", dir.display()))?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .context("failed to create temporary store file")?;
        serde_json::to_writer_pretty(tmp.as_file_mut(), &self.segments)
            .context("failed to serialize segment store")?;
        tmp.persist(&self.path)
            .with_context(|| format!("failed to replace segment store at {}", self.path.display()))?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    pub fn contains_source(&self, source: &str) -> bool {
        self.segments.iter().any(|segment| segment.source == source)
    }

    pub fn source_count(&self) -> usize {
        self.segments
            .iter()
            .map(|segment| segment.source.as_str())
            .collect::<std::collections::BTreeSet<_>>()
            .len()
    }

    pub fn dimension(&self) -> Option<usize> {
        self.segments.first().map(|segment| segment.embedding.len())
    }
}

impl SegmentSearch for SegmentStore {
    fn find_best_match(&self, query: &[f32], threshold: f32) -> Option<SegmentMatch> {
        let mut best: Option<(&Segment, f32)> = None;
        for segment in &self.segments {
            let score = cosine_similarity(query, &segment.embedding);
            if !score.is_finite() {
                continue;
            }
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((segment, score)),
            }
        }
        let (segment, score) = best?;
        debug!(score, source = %segment.source, "best segment candidate");
        if score < threshold {
            return None;
        }
        Some(SegmentMatch {
            source: segment.source.clone(),
            text: segment.text.clone(),
            score,
        })
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(source: &str, text: &str, embedding: Vec<f32>) -> Segment {
        Segment {
            source: source.to_string(),
            text: text.to_string(),
            embedding,
        }
    }

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = vec![0.3, 0.4, 0.5];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_opposite_vectors_is_minus_one() {
        let v = vec![0.3, 0.4, 0.5];
        let negated: Vec<f32> = v.iter().map(|x| -x).collect();
        assert!((cosine_similarity(&v, &negated) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn zero_vector_scores_zero_not_nan() {
        let score = cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]);
        assert_eq!(score, 0.0);

        let dir = tempfile::tempdir().unwrap();
        let mut store = SegmentStore::load(dir.path().join("store.json"));
        store.push(segment("a.txt", "Svar: a", vec![1.0, 1.0]));
        let hit = store.find_best_match(&[0.0, 0.0], DEFAULT_SIMILARITY_THRESHOLD);
        assert!(hit.is_none());
    }

    #[test]
    fn mismatched_vector_widths_never_match() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);

        let dir = tempfile::tempdir().unwrap();
        let mut store = SegmentStore::load(dir.path().join("store.json"));
        store.push(segment("short.txt", "Svar: kort", vec![1.0]));
        let hit = store.find_best_match(&[1.0, 0.0], DEFAULT_SIMILARITY_THRESHOLD);
        assert!(hit.is_none());
    }

    #[test]
    fn best_match_requires_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SegmentStore::load(dir.path().join("store.json"));
        store.push(segment("a.txt", "Svar: a", vec![1.0, 0.0]));

        let hit = store.find_best_match(&[1.0, 0.0], 1.0);
        assert_eq!(hit.unwrap().source, "a.txt");
        assert!(store.find_best_match(&[1.0, 0.0], 1.01).is_none());
        assert!(store.find_best_match(&[0.0, 1.0], 0.75).is_none());
    }

    #[test]
    fn ties_keep_the_earliest_segment() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SegmentStore::load(dir.path().join("store.json"));
        store.push(segment("first.txt", "first", vec![1.0, 0.0]));
        store.push(segment("second.txt", "second", vec![1.0, 0.0]));

        let hit = store.find_best_match(&[1.0, 0.0], 0.5).unwrap();
        assert_eq!(hit.source, "first.txt");
    }

    #[test]
    fn empty_store_matches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = SegmentStore::load(dir.path().join("store.json"));
        assert!(store.find_best_match(&[1.0, 0.0], 0.0).is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");
        let mut store = SegmentStore::load(&path);
        store.push(segment("a.txt", "Svar: a", vec![0.1, 0.2]));
        store.push(segment("b.txt", "Svar: b", vec![0.3, 0.4]));
        store.save().unwrap();

        let reloaded = SegmentStore::load(&path);
        assert_eq!(reloaded.segments(), store.segments());
        assert_eq!(reloaded.source_count(), 2);
        assert_eq!(reloaded.dimension(), Some(2));
    }

    #[test]
    fn corrupt_store_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "not json at all").unwrap();
        let store = SegmentStore::load(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn missing_store_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SegmentStore::load(dir.path().join("absent.json"));
        assert!(store.is_empty());
        assert_eq!(store.dimension(), None);
    }

    #[test]
    fn contains_source_tracks_pushed_segments() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SegmentStore::load(dir.path().join("store.json"));
        assert!(!store.contains_source("a.txt"));
        store.push(segment("a.txt", "x", vec![1.0]));
        assert!(store.contains_source("a.txt"));
        assert!(!store.contains_source("b.txt"));
    }
}
