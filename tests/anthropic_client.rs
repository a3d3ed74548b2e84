use argochat::api::{AnthropicClient, CompletionRequest, LanguageModel};
use argochat::config::LlmConfig;
use argochat::error::{ArgoChatError, ErrorKind};
use argochat::models::{ContentBlock, Message, ToolDescriptor};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> LlmConfig {
    LlmConfig {
        api_key: "sk-ant-test".to_string(),
        endpoint: format!("{}/v1/messages", server.uri()),
        model: "claude-3-5-haiku-20241022".to_string(),
        max_tokens: 3000,
        temperature: 0.0,
    }
}

#[tokio::test]
async fn test_complete_sends_tools_and_parses_tool_use() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-ant-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "claude-3-5-haiku-20241022",
            "max_tokens": 3000,
            "messages": [{"role": "user", "content": "How many floats are there?"}],
            "tools": [{"name": "get_schema", "description": "Schema", "input_schema": {"type": "object"}}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_01",
            "role": "assistant",
            "content": [
                {"type": "tool_use", "id": "toolu_01", "name": "get_schema", "input": {}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 50, "output_tokens": 12}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AnthropicClient::new(&config(&server)).unwrap();
    let request = CompletionRequest {
        messages: vec![Message::user_text("How many floats are there?")],
        tools: vec![ToolDescriptor {
            name: "get_schema".into(),
            description: "Schema".into(),
            input_schema: json!({"type": "object"}),
        }],
        ..Default::default()
    };

    let response = client.complete(&request).await.unwrap();
    assert_eq!(
        response.content,
        vec![ContentBlock::ToolUse {
            id: "toolu_01".into(),
            name: "get_schema".into(),
            input: json!({}),
        }]
    );
}

#[tokio::test]
async fn test_request_body_omits_empty_optionals() {
    let server = MockServer::start().await;
    let client = AnthropicClient::new(&config(&server)).unwrap();

    let body = client.request_body(&CompletionRequest {
        messages: vec![Message::user_text("hi")],
        temperature: Some(0.0),
        stop_sequences: vec!["\nSQL Result:".into()],
        ..Default::default()
    });
    let value = serde_json::to_value(&body).unwrap();
    assert!(value.get("tools").is_none());
    assert!(value.get("system").is_none());
    assert_eq!(value["stop_sequences"], json!(["\nSQL Result:"]));
}

#[tokio::test]
async fn test_error_status_becomes_model_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "type": "error",
            "error": {"type": "rate_limit_error", "message": "Rate limited"}
        })))
        .mount(&server)
        .await;

    let client = AnthropicClient::new(&config(&server)).unwrap();
    let err = client
        .complete(&CompletionRequest {
            messages: vec![Message::user_text("hi")],
            ..Default::default()
        })
        .await
        .unwrap_err();

    match &err {
        ArgoChatError::Api { status, message } => {
            assert_eq!(*status, 429);
            assert_eq!(message, "Rate limited");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::Model);
}

#[tokio::test]
async fn test_unparseable_body_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = AnthropicClient::new(&config(&server)).unwrap();
    let err = client
        .complete(&CompletionRequest {
            messages: vec![Message::user_text("hi")],
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ArgoChatError::MalformedResponse(_)));
}
