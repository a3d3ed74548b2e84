mod common;

use argochat::api::LanguageModel;
use argochat::compiler::QueryCompiler;
use argochat::config::{DatabaseConfig, ToolHostLaunch};
use argochat::database::DatabaseGateway;
use argochat::error::{ArgoChatError, ErrorKind};
use argochat::mcp::{serve, TransportSession};
use argochat::tools::{ToolInvoker, ToolRegistry};
use common::{text_turn, ScriptedModel};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn registry(dir: &TempDir, model: ScriptedModel) -> ToolRegistry {
    let path = common::argo_database(dir.path());
    let gateway = Arc::new(
        DatabaseGateway::open(&DatabaseConfig {
            path,
            sample_rows: 3,
        })
        .unwrap(),
    );
    let llm: Arc<dyn LanguageModel> = Arc::new(model);
    let compiler = Arc::new(QueryCompiler::new(llm, Arc::clone(&gateway)));
    ToolRegistry::argo(gateway, compiler).unwrap()
}

#[tokio::test]
async fn test_in_process_session() {
    let dir = TempDir::new().unwrap();
    let registry = registry(
        &dir,
        ScriptedModel::new(vec![text_turn("SELECT COUNT(*) FROM argo_profile")]),
    );

    let (client_end, server_end) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server_end);
    let host = tokio::spawn(async move { serve(&registry, server_read, server_write).await });

    let (client_read, client_write) = tokio::io::split(client_end);
    let session = TransportSession::connect(
        Box::new(client_read),
        Box::new(client_write),
        Duration::from_secs(10),
    )
    .await
    .unwrap();
    assert_eq!(session.server_info().unwrap().name, "argochat-tools");

    session.ping().await.unwrap();

    let tools = session.list_tools().await.unwrap();
    assert_eq!(tools.len(), 3);
    assert_eq!(tools[2].name, "get_sql_response");
    assert_eq!(tools[2].input_schema["required"], json!(["sql_query"]));

    let sql = session
        .call_tool("get_sql_query", &json!({"query": "how many profiles?"}))
        .await
        .unwrap();
    assert_eq!(sql.text(), "SELECT COUNT(*) FROM argo_profile");

    let rows = session
        .call_tool("get_sql_response", &json!({"sql_query": sql.text()}))
        .await
        .unwrap();
    assert!(!rows.is_error);
    assert_eq!(rows.text(), "[(4,)]");

    let unknown = session.call_tool("nope", &json!({})).await.unwrap();
    assert!(unknown.is_error);

    // JSON-RPC level failures are transport errors
    let err = session.request("resources/list", None).await.unwrap_err();
    assert!(matches!(err, ArgoChatError::Rpc { code: -32601, .. }));
    assert_eq!(err.kind(), ErrorKind::Transport);

    session.close().await.unwrap();
    host.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_closed_channel_is_transport_error() {
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir, ScriptedModel::new(vec![]));

    let (client_end, server_end) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server_end);
    let host = tokio::spawn(async move { serve(&registry, server_read, server_write).await });

    let (client_read, client_write) = tokio::io::split(client_end);
    let session = TransportSession::connect(
        Box::new(client_read),
        Box::new(client_write),
        Duration::from_secs(10),
    )
    .await
    .unwrap();

    session.close().await.unwrap();
    host.await.unwrap().unwrap();

    let err = session.list_tools().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_request_timeout() {
    // A peer that never answers.
    let (client_end, _silent_peer) = tokio::io::duplex(64 * 1024);
    let (client_read, client_write) = tokio::io::split(client_end);
    let result = TransportSession::connect(
        Box::new(client_read),
        Box::new(client_write),
        Duration::from_millis(200),
    )
    .await;
    match result {
        Err(ArgoChatError::Timeout(_)) => {}
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("handshake should not succeed"),
    }
}

#[tokio::test]
async fn test_spawned_tool_host_process() {
    let dir = TempDir::new().unwrap();
    let db_path = common::argo_database(dir.path());

    let llm = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_01",
            "role": "assistant",
            "content": [{"type": "text", "text": "SELECT DISTINCT platform_number FROM argo_profile ORDER BY platform_number"}],
            "stop_reason": "stop_sequence"
        })))
        .mount(&llm)
        .await;

    let launch = ToolHostLaunch {
        command: env!("CARGO_BIN_EXE_argochat-tools").to_string(),
        args: vec![
            "--database".to_string(),
            db_path.to_string_lossy().into_owned(),
        ],
        env: HashMap::from([
            ("ANTHROPIC_API_KEY".to_string(), "sk-ant-test".to_string()),
            ("ANTHROPIC_BASE_URL".to_string(), llm.uri()),
            ("RUST_LOG".to_string(), "warn".to_string()),
        ]),
        timeout_secs: 30,
    };

    let session = TransportSession::spawn(&launch).await.unwrap();

    let names: Vec<String> = session
        .list_tools()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["get_schema", "get_sql_query", "get_sql_response"]);

    let schema = session.call_tool("get_schema", &json!({})).await.unwrap();
    assert!(schema.text().contains("CREATE TABLE argo_profile"));

    let sql = session
        .call_tool("get_sql_query", &json!({"query": "list all distinct platform numbers"}))
        .await
        .unwrap();
    assert!(!sql.is_error, "{}", sql.text());

    let rows = session
        .call_tool("get_sql_response", &json!({"sql_query": sql.text()}))
        .await
        .unwrap();
    assert_eq!(rows.text(), "[('1900683',), ('2902112',), ('5904321',)]");

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_write_timeout_closes_channel() {
    // A host that completes the handshake and then stops reading its input.
    let (client_end, host_end) = tokio::io::duplex(1024);
    let (host_read, mut host_write) = tokio::io::split(host_end);
    let host = tokio::spawn(async move {
        let mut lines = BufReader::new(host_read).lines();
        let init: Value = serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        let reply = json!({
            "jsonrpc": "2.0",
            "id": init["id"],
            "result": {
                "protocolVersion": "2024-11-05",
                "capabilities": {"tools": {}},
                "serverInfo": {"name": "stalled-host", "version": "0.0.0"}
            }
        });
        host_write
            .write_all(format!("{}\n", reply).as_bytes())
            .await
            .unwrap();
        let _initialized = lines.next_line().await.unwrap();
        std::future::pending::<()>().await;
        drop((lines, host_write));
    });

    let (client_read, client_write) = tokio::io::split(client_end);
    let session = TransportSession::connect(
        Box::new(client_read),
        Box::new(client_write),
        Duration::from_millis(300),
    )
    .await
    .unwrap();
    assert_eq!(session.server_info().unwrap().name, "stalled-host");

    // far larger than the pipe buffer, so the write cannot finish
    let huge = "x".repeat(256 * 1024);
    let err = session
        .call_tool("get_sql_response", &json!({"sql_query": huge}))
        .await
        .unwrap_err();
    assert!(matches!(err, ArgoChatError::Timeout(_)), "{err}");

    // nothing more is written after a partial line
    let err = session.ping().await.unwrap_err();
    assert!(matches!(err, ArgoChatError::Transport(_)), "{err}");

    host.abort();
}
