use argochat::chat::ChatClient;
use argochat::config::ClientConfig;
use argochat::error::ArgoChatError;
use argochat::models::Message;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ChatClient {
    ChatClient::new(&ClientConfig {
        server_url: server.uri(),
        timeout_secs: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn test_query_adopts_server_history_and_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_json(json!({"query": "How many floats?"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": "sess-1",
            "status": "complete",
            "messages": [
                {"role": "user", "content": "How many floats?"},
                {"role": "assistant", "content": [
                    {"type": "tool_use", "id": "toolu_1", "name": "get_schema", "input": {}}
                ]},
                {"role": "user", "content": [
                    {"type": "tool_result", "tool_use_id": "toolu_1", "content": "CREATE TABLE argo_profile (x TEXT)"}
                ]},
                {"role": "assistant", "content": "There are 3 floats."}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_json(json!({"query": "And in 2024?", "session_id": "sess-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": "sess-1",
            "status": "complete",
            "messages": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client(&server);
    let response = client.query("How many floats?").await.unwrap();
    assert_eq!(response.status, "complete");
    assert_eq!(client.session_id(), Some("sess-1"));
    assert_eq!(client.history().len(), 4);

    let visible: Vec<&str> = client.history().iter().filter_map(Message::text).collect();
    assert_eq!(visible, vec!["How many floats?", "There are 3 floats."]);

    client.query("And in 2024?").await.unwrap();
}

#[tokio::test]
async fn test_tools_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tools"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tools": [{"name": "get_schema", "description": "Schema", "input_schema": {"type": "object"}}]
        })))
        .mount(&server)
        .await;

    let tools = client(&server).tools().await.unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name, "get_schema");
}

#[tokio::test]
async fn test_server_error_surfaces_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(
            ResponseTemplate::new(502).set_body_json(json!({"error": "Transport error: tool host closed the channel"})),
        )
        .mount(&server)
        .await;

    let mut client = client(&server);
    let err = client.query("hi").await.unwrap_err();
    match err {
        ArgoChatError::Api { status, message } => {
            assert_eq!(status, 502);
            assert!(message.contains("tool host closed"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(client.session_id().is_none());
}

#[tokio::test]
async fn test_timeout_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(std::time::Duration::from_secs(3))
                .set_body_json(json!({"session_id": "s", "status": "complete", "messages": []})),
        )
        .mount(&server)
        .await;

    let mut client = ChatClient::new(&ClientConfig {
        server_url: server.uri(),
        timeout_secs: 1,
    })
    .unwrap();
    let err = client.query("slow question").await.unwrap_err();
    assert!(matches!(err, ArgoChatError::Timeout(1)), "{err:?}");
}

#[tokio::test]
async fn test_expired_session_resets_client() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_json(json!({"query": "first"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": "old",
            "status": "complete",
            "messages": [
                {"role": "user", "content": "first"},
                {"role": "assistant", "content": "ok"}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_json(json!({"query": "second", "session_id": "old"})))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Session 'old' not found"})))
        .mount(&server)
        .await;

    let mut client = client(&server);
    client.query("first").await.unwrap();
    let err = client.query("second").await.unwrap_err();
    assert!(matches!(err, ArgoChatError::SessionNotFound(ref id) if id == "old"));
    assert!(client.session_id().is_none());
    assert!(client.history().is_empty());
}
