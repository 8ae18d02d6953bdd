use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};
use uuid::Uuid;

use crate::application::use_cases::ResponseGenerator;
use crate::domain::{sanitize_input, DomainError, SituationalContext, Transcript};

/// One conversation with the persona. Owns its transcript exclusively.
pub struct ChatSession {
    id: String,
    generator: Arc<ResponseGenerator>,
    transcript: Transcript,
    started_at: Instant,
}

impl ChatSession {
    pub fn new(generator: Arc<ResponseGenerator>) -> Self {
        let id = Uuid::new_v4().to_string();
        info!("Starting chat session {}", id);
        Self {
            id,
            generator,
            transcript: Transcript::new(),
            started_at: Instant::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Runs one turn. Input is sanitised first; input that sanitises to
    /// nothing is rejected without calling the completion service.
    pub async fn send(&mut self, input: &str) -> Result<String, DomainError> {
        let text = sanitize_input(input);
        if text.is_empty() {
            return Err(DomainError::invalid_input("message is empty after sanitising"));
        }

        if text != input.trim() {
            debug!("Sanitised input from {} to {} chars", input.len(), text.len());
        }

        let situation = SituationalContext::capture(self.started_at);
        self.generator
            .generate(&mut self.transcript, &text, &situation)
            .await
    }

    /// Drops the transcript and restarts the session clock.
    pub fn reset(&mut self) {
        info!(
            "Resetting session {} after {} entries",
            self.id,
            self.transcript.len()
        );
        self.id = Uuid::new_v4().to_string();
        self.transcript = Transcript::new();
        self.started_at = Instant::now();
    }
}
