use std::time::Duration;

use httpmock::Method::POST;
use httpmock::MockServer;
use serde_json::json;

use personabot::{AnthropicClient, ChatClient, ClientConfig, Provider, TogetherClient};

#[tokio::test]
async fn together_returns_first_choice() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer secret")
                .body_contains("\"model\":\"test-model\"")
                .body_contains("\"role\":\"system\"");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "choices": [ { "message": { "role": "assistant", "content": "hey you" } } ]
                }));
        })
        .await;

    let config = ClientConfig::new("secret")
        .with_base_url(server.base_url())
        .with_model("test-model");
    let client = TogetherClient::new(config).unwrap();

    let reply = client.complete("be nice", "User: hi").await.unwrap();
    mock.assert_async().await;
    assert_eq!(reply, "hey you");
}

#[tokio::test]
async fn together_maps_http_errors_to_upstream() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(401).body("{\"error\":\"invalid api key\"}");
        })
        .await;

    let config = ClientConfig::new("wrong").with_base_url(server.base_url());
    let client = TogetherClient::new(config).unwrap();

    let err = client.complete("sys", "usr").await.unwrap_err();
    assert!(err.is_upstream());
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn together_rejects_empty_choices() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "choices": [] }));
        })
        .await;

    let config = ClientConfig::new("key").with_base_url(server.base_url());
    let client = TogetherClient::new(config).unwrap();

    assert!(client.complete("sys", "usr").await.unwrap_err().is_upstream());
}

#[tokio::test]
async fn together_times_out_as_upstream_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200)
                .delay(Duration::from_millis(500))
                .json_body(json!({ "choices": [] }));
        })
        .await;

    let config = ClientConfig::new("key")
        .with_base_url(server.base_url())
        .with_timeout(Duration::from_millis(50));
    let client = TogetherClient::new(config).unwrap();

    let err = client.complete("sys", "usr").await.unwrap_err();
    assert!(err.is_upstream());
}

#[tokio::test]
async fn unreachable_server_is_upstream_error() {
    // Port 9 (discard) is essentially never listening on localhost.
    let config = ClientConfig::new("key")
        .with_base_url("http://127.0.0.1:9")
        .with_timeout(Duration::from_secs(2));
    let client = TogetherClient::new(config).unwrap();

    assert!(client.complete("sys", "usr").await.unwrap_err().is_upstream());
}

#[tokio::test]
async fn anthropic_joins_content_blocks() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/messages")
                .header("x-api-key", "secret")
                .header("anthropic-version", "2023-06-01")
                .body_contains("\"system\":\"be nice\"");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "content": [ { "type": "text", "text": "hey " }, { "type": "text", "text": "you" } ]
                }));
        })
        .await;

    let config =
        ClientConfig::for_provider(Provider::Anthropic, "secret").with_base_url(server.base_url());
    let client = AnthropicClient::new(config).unwrap();

    let reply = client.complete("be nice", "User: hi").await.unwrap();
    mock.assert_async().await;
    assert_eq!(reply, "hey you");
    assert_eq!(client.model_name(), "claude-haiku-4-5");
}

#[tokio::test]
async fn anthropic_without_text_blocks_is_upstream_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "content": [] }));
        })
        .await;

    let config =
        ClientConfig::for_provider(Provider::Anthropic, "secret").with_base_url(server.base_url());
    let client = AnthropicClient::new(config).unwrap();

    let err = client.complete("sys", "usr").await.unwrap_err();
    assert!(err.is_upstream());
    assert!(err.to_string().contains("no text"));
}

#[tokio::test]
async fn anthropic_maps_http_errors_to_upstream() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(529).body("overloaded");
        })
        .await;

    let config =
        ClientConfig::for_provider(Provider::Anthropic, "secret").with_base_url(server.base_url());
    let client = AnthropicClient::new(config).unwrap();

    let err = client.complete("sys", "usr").await.unwrap_err();
    assert!(err.is_upstream());
    assert!(err.to_string().contains("529"));
}
