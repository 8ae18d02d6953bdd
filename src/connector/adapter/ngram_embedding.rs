use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::application::EmbeddingService;
use crate::domain::{DomainError, EmbeddingConfig};

const MIN_GRAM: usize = 2;
const MAX_GRAM: usize = 3;

/// Character n-gram embedding using signed feature hashing.
///
/// Each lowercased word is padded as `<word>` and split into 2- and 3-grams;
/// every gram is hashed with SHA-256 into one of `dimensions` buckets with a
/// hash-derived sign, and the vector is L2-normalised. The output depends only
/// on the input text, so it is identical across runs and platforms.
pub struct NgramEmbedding {
    config: EmbeddingConfig,
}

impl NgramEmbedding {
    pub fn new() -> Self {
        Self {
            config: EmbeddingConfig::default(),
        }
    }

    pub fn with_dimensions(dimensions: usize) -> Self {
        let defaults = EmbeddingConfig::default();
        Self {
            config: EmbeddingConfig::new(
                defaults.model_name().to_string(),
                dimensions.max(1),
                defaults.max_sequence_length(),
            ),
        }
    }

    fn generate_embedding(&self, text: &str) -> Vec<f32> {
        let dimensions = self.config.dimensions();
        let mut vector = vec![0.0f32; dimensions];

        let text: String = text
            .chars()
            .take(self.config.max_sequence_length())
            .collect::<String>()
            .to_lowercase();

        for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            let padded: Vec<char> = std::iter::once('<')
                .chain(word.chars())
                .chain(std::iter::once('>'))
                .collect();

            for n in MIN_GRAM..=MAX_GRAM {
                for window in padded.windows(n) {
                    let gram: String = window.iter().collect();
                    let (bucket, sign) = hash_gram(&gram, dimensions);
                    vector[bucket] += sign;
                }
            }
        }

        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for x in &mut vector {
                *x /= magnitude;
            }
        }

        vector
    }
}

fn hash_gram(gram: &str, dimensions: usize) -> (usize, f32) {
    let digest = Sha256::digest(gram.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    let bucket = (u64::from_be_bytes(head) % dimensions as u64) as usize;
    let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
    (bucket, sign)
}

impl Default for NgramEmbedding {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingService for NgramEmbedding {
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        Ok(self.generate_embedding(text))
    }

    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
        let results: Vec<Vec<f32>> = texts.iter().map(|t| self.generate_embedding(t)).collect();
        debug!("Generated {} n-gram embeddings", results.len());
        Ok(results)
    }

    fn config(&self) -> &EmbeddingConfig {
        &self.config
    }
}
