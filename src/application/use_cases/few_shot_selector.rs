use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::application::EmbeddingService;
use crate::domain::{DomainError, ExampleStore, ScoredExample};

/// Top-K nearest-neighbour retrieval over the persona examples.
///
/// Every example's rendered context is embedded once when the selector is
/// built; the resulting index is never modified, so a selector can be shared
/// between sessions behind an `Arc`.
pub struct FewShotSelector {
    store: ExampleStore,
    embedding_service: Arc<dyn EmbeddingService>,
    index: Vec<Vec<f32>>,
    min_score: Option<f32>,
}

impl FewShotSelector {
    pub async fn build(
        store: ExampleStore,
        embedding_service: Arc<dyn EmbeddingService>,
    ) -> Result<Self, DomainError> {
        let start_time = Instant::now();

        let contexts: Vec<String> = store.all().iter().map(|e| e.context_text()).collect();
        let index = embedding_service.embed_texts(&contexts).await?;

        if index.len() != store.len() {
            return Err(DomainError::embedding(format!(
                "expected {} embeddings, got {}",
                store.len(),
                index.len()
            )));
        }

        info!(
            "Indexed {} examples with {} in {:.2}s",
            store.len(),
            embedding_service.config().model_name(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(Self {
            store,
            embedding_service,
            index,
            min_score: None,
        })
    }

    /// Drop exemplars scoring below `score`. The best match is always kept.
    pub fn with_min_score(mut self, score: f32) -> Self {
        self.min_score = Some(score);
        self
    }

    /// Returns the `k` examples whose context is most similar to `context`,
    /// best first. Exact ties keep dataset order.
    ///
    /// When `k` exceeds the store size the whole store is returned, ranked.
    pub async fn select(&self, context: &str, k: usize) -> Result<Vec<ScoredExample>, DomainError> {
        if k == 0 {
            return Err(DomainError::invalid_input("k must be at least 1"));
        }

        if self.store.is_empty() {
            return Err(DomainError::insufficient_examples(
                "the example store is empty; at least one example is required",
            ));
        }

        let query = self.embedding_service.embed_text(context).await?;
        let ranked = rank(&query, &self.index);

        let mut results: Vec<ScoredExample> = Vec::with_capacity(k.min(ranked.len()));
        for (position, (idx, score)) in ranked.into_iter().take(k).enumerate() {
            let example = match self.store.get(idx) {
                Some(example) => example.clone(),
                None => continue,
            };
            let scored = ScoredExample::new(idx, score, example);

            if position > 0 {
                if let Some(min_score) = self.min_score {
                    if !scored.is_relevant(min_score) {
                        break;
                    }
                }
            }
            results.push(scored);
        }

        debug!(
            "Selected {} of {} examples: [{}]",
            results.len(),
            self.store.len(),
            results
                .iter()
                .map(|r| r.display_line())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(results)
    }
}

/// Scores every indexed vector against `query`, best first. The sort is
/// stable and falls back to the dataset index, so exact ties keep insertion
/// order.
pub(crate) fn rank(query: &[f32], index: &[Vec<f32>]) -> Vec<(usize, f32)> {
    let mut scored: Vec<(usize, f32)> = index
        .iter()
        .enumerate()
        .map(|(i, vector)| {
            let score = cosine_similarity(query, vector);
            (i, if score.is_nan() { f32::NEG_INFINITY } else { score })
        })
        .collect();

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    scored
}

pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
