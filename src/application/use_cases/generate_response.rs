use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::application::use_cases::{FewShotSelector, Prompt, PromptBuilder};
use crate::application::ChatClient;
use crate::domain::{
    extract_response, render_entries, DomainError, GeneratorConfig, SituationalContext,
    Speaker, TopicFilter, Transcript, TranscriptEntry, EMPTY_REPLY,
};

/// Produces one persona reply per user turn.
///
/// Selection, prompting and the completion call all happen before the
/// transcript is touched: a turn is either recorded completely (user line and
/// reply) or not at all.
pub struct ResponseGenerator {
    selector: Arc<FewShotSelector>,
    chat_client: Arc<dyn ChatClient>,
    topic_filter: TopicFilter,
    config: GeneratorConfig,
}

impl ResponseGenerator {
    pub fn new(
        selector: Arc<FewShotSelector>,
        chat_client: Arc<dyn ChatClient>,
        config: GeneratorConfig,
    ) -> Self {
        Self {
            selector,
            chat_client,
            topic_filter: TopicFilter::new(),
            config,
        }
    }

    /// Answers `user_text` given the conversation so far.
    ///
    /// On success both the user line and the reply are appended to
    /// `transcript` and the reply is returned. Upstream failures are returned
    /// unchanged and leave `transcript` as it was.
    pub async fn generate(
        &self,
        transcript: &mut Transcript,
        user_text: &str,
        situation: &SituationalContext,
    ) -> Result<String, DomainError> {
        let user_entry = TranscriptEntry::new(Speaker::User, user_text);

        let keep = self.config.context_window().saturating_sub(1);
        let mut window: Vec<TranscriptEntry> = transcript.tail(keep).to_vec();
        window.push(user_entry.clone());

        let exemplars = self
            .selector
            .select(&render_entries(&window), self.config.k())
            .await?;

        let directive = self.topic_filter.directive();
        let prompt = PromptBuilder::new(self.config.persona())
            .with_directive(&directive)
            .with_chain_of_thought(self.config.chain_of_thought())
            .build(&exemplars, &window, situation);

        debug!(
            "Prompt built: {} exemplars, {} context lines, {} chars",
            exemplars.len(),
            window.len(),
            prompt.len()
        );

        let reply = self.complete_filtered(&prompt).await?;

        transcript.push(user_entry);
        transcript.push(TranscriptEntry::new(Speaker::Creator, reply.clone()));

        Ok(reply)
    }

    /// Asks for a completion until one yields a reply that passes the topic
    /// filter, falling back to a canned reply after `max_attempts` rejections.
    /// A completion with no extractable reply counts as a rejection.
    async fn complete_filtered(&self, prompt: &Prompt) -> Result<String, DomainError> {
        let start_time = Instant::now();

        for attempt in 1..=self.config.max_attempts() {
            let raw = self.chat_client.complete(&prompt.system, &prompt.user).await?;
            let reply = extract_response(&raw, self.config.chain_of_thought());

            let rejection = if reply == EMPTY_REPLY {
                Some("No reply found in completion".to_string())
            } else {
                self.topic_filter.check(&reply)
            };

            match rejection {
                None => {
                    info!(
                        "Reply from {} in {:.2}s (attempt {})",
                        self.chat_client.model_name(),
                        start_time.elapsed().as_secs_f64(),
                        attempt
                    );
                    return Ok(reply);
                }
                Some(reason) => {
                    warn!(
                        "Rejected reply on attempt {}/{}: {}",
                        attempt,
                        self.config.max_attempts(),
                        reason
                    );
                }
            }
        }

        warn!("All attempts were rejected; using a safe fallback reply");
        Ok(self.topic_filter.safe_response().to_string())
    }
}
