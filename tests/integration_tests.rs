//! Integration tests for PersonaBot.
//!
//! These tests drive a whole chat turn: dataset file, selector, prompt,
//! completion and transcript.

use std::collections::VecDeque;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use personabot::{
    ChatClient, ChatSession, DomainError, ExampleLoader, ExampleStore, FewShotSelector,
    GeneratorConfig, JsonExampleLoader, NgramEmbedding, ResponseGenerator, Speaker,
};

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/conversations.json")
}

/// Completion service double: replays canned results, records prompts.
struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, DomainError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn new(replies: Vec<Result<String, DomainError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    async fn complete(&self, _system: &str, user: &str) -> Result<String, DomainError> {
        self.prompts.lock().await.push(user.to_string());
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(DomainError::upstream("script exhausted")))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

async fn load_fixture() -> ExampleStore {
    JsonExampleLoader::new()
        .load(&fixture_path())
        .await
        .expect("Failed to load fixture dataset")
}

async fn session_with(client: Arc<ScriptedClient>, store: ExampleStore) -> ChatSession {
    let selector = FewShotSelector::build(store, Arc::new(NgramEmbedding::new()))
        .await
        .expect("Failed to build selector");
    let config = GeneratorConfig::new().with_k(1).with_chain_of_thought(false);
    let generator = ResponseGenerator::new(Arc::new(selector), client, config);
    ChatSession::new(Arc::new(generator))
}

#[tokio::test]
async fn test_fixture_loads_in_dataset_order() {
    let store = load_fixture().await;

    assert_eq!(store.len(), 3);
    let contexts: Vec<String> = store.all().iter().map(|e| e.context_text()).collect();
    assert_eq!(contexts, vec!["User: hi", "User: bye", "User: thanks"]);
}

#[tokio::test]
async fn test_hello_selects_hi_across_runs() {
    for _ in 0..3 {
        let selector = FewShotSelector::build(load_fixture().await, Arc::new(NgramEmbedding::new()))
            .await
            .unwrap();

        let picked = selector.select("User: hello", 1).await.unwrap();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].example().response(), "hey you");
    }
}

#[tokio::test]
async fn test_chat_turn_uses_nearest_example() {
    let client = ScriptedClient::new(vec![Ok("hey hey, you made it".to_string())]);
    let mut session = session_with(client.clone(), load_fixture().await).await;

    let reply = session.send("hello").await.expect("turn should succeed");

    assert_eq!(reply, "hey hey, you made it");
    let prompts = client.prompts.lock().await;
    assert!(prompts[0].contains("Context:\nUser: hi\nResponse: hey you"));
    assert!(!prompts[0].contains("miss you already"));

    let entries = session.transcript().entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].speaker, Speaker::User);
    assert_eq!(entries[0].text, "hello");
    assert_eq!(entries[1].speaker, Speaker::Creator);
}

#[tokio::test]
async fn test_transcript_is_replayed_on_next_turn() {
    let client = ScriptedClient::new(vec![Ok("hi cutie".to_string()), Ok("aww".to_string())]);
    let mut session = session_with(client.clone(), load_fixture().await).await;

    session.send("hello").await.unwrap();
    session.send("thanks for that").await.unwrap();

    let prompts = client.prompts.lock().await;
    assert!(prompts[1].contains("User: hello\nCreator: hi cutie\nUser: thanks for that\nResponse:"));
    assert_eq!(session.transcript().len(), 4);
}

#[tokio::test]
async fn test_upstream_failure_keeps_transcript_and_session() {
    let client = ScriptedClient::new(vec![
        Ok("first".to_string()),
        Err(DomainError::upstream("503 Service Unavailable")),
        Ok("back again".to_string()),
    ]);
    let mut session = session_with(client, load_fixture().await).await;

    session.send("hello").await.unwrap();
    let err = session.send("you there?").await.unwrap_err();
    assert!(err.is_upstream());
    assert_eq!(session.transcript().len(), 2);

    let reply = session.send("you there?").await.unwrap();
    assert_eq!(reply, "back again");
    assert_eq!(session.transcript().len(), 4);
}

#[tokio::test]
async fn test_empty_dataset_fails_turn_with_insufficient_examples() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"[]").unwrap();

    let store = JsonExampleLoader::new().load(file.path()).await.unwrap();
    let client = ScriptedClient::new(vec![Ok("unused".to_string())]);
    let mut session = session_with(client.clone(), store).await;

    let err = session.send("hello").await.unwrap_err();
    assert!(err.is_insufficient_examples());
    assert!(client.prompts.lock().await.is_empty());
    assert!(session.transcript().is_empty());
}

#[tokio::test]
async fn test_malformed_dataset_is_data_load_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(br#"[{ "chat_history": { "messages": "oops" }, "output": "x" }]"#)
        .unwrap();

    let err = JsonExampleLoader::new().load(file.path()).await.unwrap_err();
    assert!(err.is_data_load());
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_sanitised_away_input_is_rejected_without_a_call() {
    let client = ScriptedClient::new(vec![]);
    let mut session = session_with(client.clone(), load_fixture().await).await;

    let err = session.send("<<>>").await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));
    assert!(client.prompts.lock().await.is_empty());
}

#[tokio::test]
async fn test_reset_clears_transcript() {
    let client = ScriptedClient::new(vec![Ok("hey".to_string())]);
    let mut session = session_with(client, load_fixture().await).await;
    let first_id = session.id().to_string();

    session.send("hello").await.unwrap();
    session.reset();

    assert!(session.transcript().is_empty());
    assert_ne!(session.id(), first_id);
}
