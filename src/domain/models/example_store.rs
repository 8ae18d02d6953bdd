use std::sync::Arc;

use super::ConversationExample;

/// Read-only collection of persona examples, in dataset order.
///
/// Cloning is cheap and every clone shares the same examples; there are no
/// mutation operations once a store is built.
#[derive(Debug, Clone)]
pub struct ExampleStore {
    examples: Arc<[ConversationExample]>,
}

impl ExampleStore {
    pub fn new(examples: Vec<ConversationExample>) -> Self {
        Self {
            examples: examples.into(),
        }
    }

    pub fn all(&self) -> &[ConversationExample] {
        &self.examples
    }

    pub fn get(&self, index: usize) -> Option<&ConversationExample> {
        self.examples.get(index)
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn total_turns(&self) -> usize {
        self.examples.iter().map(|e| e.context().len()).sum()
    }
}

impl Default for ExampleStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
