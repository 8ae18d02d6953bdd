use serde::Serialize;

use super::ConversationExample;

/// An example picked by the few-shot selector, with its similarity to the
/// live context.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredExample {
    index: usize,
    score: f32,
    example: ConversationExample,
}

impl ScoredExample {
    pub fn new(index: usize, score: f32, example: ConversationExample) -> Self {
        Self {
            index,
            score,
            example,
        }
    }

    /// Position of the example in the dataset.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn example(&self) -> &ConversationExample {
        &self.example
    }

    pub fn is_relevant(&self, threshold: f32) -> bool {
        self.score >= threshold
    }

    pub fn display_line(&self) -> String {
        format!("#{} (score: {:.3})", self.index, self.score)
    }
}
