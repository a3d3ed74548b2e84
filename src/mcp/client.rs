use async_trait::async_trait;
use serde_json::{json, Value};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::time::{timeout, Duration};

use super::types::{
    InitializeResult, JsonRpcRequest, JsonRpcResponse, ServerInfo, ToolListResponse,
    MCP_PROTOCOL_VERSION,
};
use crate::config::ToolHostLaunch;
use crate::error::{ArgoChatError, Result};
use crate::models::{ToolDescriptor, ToolOutput};
use crate::tools::ToolInvoker;

const CLIENT_NAME: &str = "argochat-server";
const CLOSE_GRACE: Duration = Duration::from_secs(5);

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

struct Channel {
    writer: Option<BoxedWriter>,
    reader: Lines<BufReader<BoxedReader>>,
}

impl Channel {
    async fn send(&mut self, message: &JsonRpcRequest) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| ArgoChatError::Transport("channel already closed".to_string()))?;
        let mut encoded = serde_json::to_string(message)?;
        encoded.push('\n');
        writer
            .write_all(encoded.as_bytes())
            .await
            .map_err(|e| ArgoChatError::Transport(format!("write to tool host failed: {}", e)))?;
        writer
            .flush()
            .await
            .map_err(|e| ArgoChatError::Transport(format!("write to tool host failed: {}", e)))
    }

    /// Read lines until the response with id `expected` arrives. Safe to cancel:
    /// a line is either consumed whole or left for the next reader.
    async fn receive(&mut self, expected: &Value) -> Result<Value> {
        loop {
            let line = self
                .reader
                .next_line()
                .await
                .map_err(|e| ArgoChatError::Transport(format!("read from tool host failed: {}", e)))?
                .ok_or_else(|| ArgoChatError::Transport("tool host closed the channel".to_string()))?;
            if line.trim().is_empty() {
                continue;
            }

            let response: JsonRpcResponse = match serde_json::from_str(&line) {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring non-protocol output from tool host");
                    continue;
                }
            };

            // Late answers to requests that already timed out.
            if &response.id != expected {
                tracing::debug!(id = %response.id, "skipping stale response");
                continue;
            }

            if let Some(error) = response.error {
                return Err(ArgoChatError::Rpc {
                    code: error.code,
                    message: error.message,
                });
            }
            return response.result.ok_or_else(|| {
                ArgoChatError::Transport("response carried neither result nor error".to_string())
            });
        }
    }
}

/// Long-lived channel to the tool host process.
///
/// Requests are serialized: one is in flight at a time. Dropping the session
/// kills the child; `close` shuts it down gracefully.
pub struct TransportSession {
    channel: Mutex<Channel>,
    child: Mutex<Option<Child>>,
    next_id: AtomicU64,
    request_timeout: Duration,
    server_info: Option<ServerInfo>,
}

impl TransportSession {
    /// Launch the tool host and complete the handshake.
    pub async fn spawn(launch: &ToolHostLaunch) -> Result<Self> {
        let mut cmd = Command::new(&launch.command);
        cmd.args(&launch.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        for (key, value) in &launch.env {
            tracing::debug!(key = %key, "setting tool host env var (value hidden)");
            cmd.env(key, value);
        }

        let mut child = cmd.spawn().map_err(|e| {
            ArgoChatError::Transport(format!(
                "failed to start tool host '{}': {}",
                launch.command, e
            ))
        })?;
        tracing::info!(command = %launch.command, pid = child.id(), "tool host started");

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ArgoChatError::Transport("tool host stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ArgoChatError::Transport("tool host stdout unavailable".to_string()))?;

        let mut session = Self::from_streams(
            Box::new(stdout),
            Box::new(stdin),
            Duration::from_secs(launch.timeout_secs),
        );
        session.child = Mutex::new(Some(child));

        // On handshake failure the child is killed when `session` drops.
        session.handshake().await?;
        Ok(session)
    }

    /// Run over already-open streams and complete the handshake.
    pub async fn connect(
        reader: BoxedReader,
        writer: BoxedWriter,
        request_timeout: Duration,
    ) -> Result<Self> {
        let mut session = Self::from_streams(reader, writer, request_timeout);
        session.handshake().await?;
        Ok(session)
    }

    fn from_streams(reader: BoxedReader, writer: BoxedWriter, request_timeout: Duration) -> Self {
        Self {
            channel: Mutex::new(Channel {
                writer: Some(writer),
                reader: BufReader::new(reader).lines(),
            }),
            child: Mutex::new(None),
            next_id: AtomicU64::new(1),
            request_timeout,
            server_info: None,
        }
    }

    async fn handshake(&mut self) -> Result<()> {
        let init_params = json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": CLIENT_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        });

        let response = self.request("initialize", Some(init_params)).await?;
        let init_result: InitializeResult = serde_json::from_value(response)
            .map_err(|e| ArgoChatError::Transport(format!("bad initialize result: {}", e)))?;
        tracing::info!(
            name = %init_result.server_info.name,
            version = %init_result.server_info.version,
            protocol = %init_result.protocol_version,
            "connected to tool host"
        );

        self.channel
            .lock()
            .await
            .send(&JsonRpcRequest::notification("notifications/initialized"))
            .await?;
        self.server_info = Some(init_result.server_info);
        Ok(())
    }

    pub fn server_info(&self) -> Option<&ServerInfo> {
        self.server_info.as_ref()
    }

    pub async fn request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = JsonRpcRequest::new(id, method, params);

        let mut channel = self.channel.lock().await;
        let Ok(sent) = timeout(self.request_timeout, channel.send(&request)).await else {
            // Part of the line may already be on the wire; anything written after it
            // would be read as garbage, so the channel is unusable from here on.
            tracing::warn!(method, id, "timed out writing to tool host, closing channel");
            channel.writer = None;
            return Err(ArgoChatError::Timeout(self.request_timeout.as_secs()));
        };
        sent?;

        let expected = Value::from(id);
        match timeout(self.request_timeout, channel.receive(&expected)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(method, id, "tool host request timed out");
                Err(ArgoChatError::Timeout(self.request_timeout.as_secs()))
            }
        }
    }

    pub async fn ping(&self) -> Result<()> {
        self.request("ping", None).await.map(|_| ())
    }

    /// End stdin, give the host a moment to exit, then kill it.
    pub async fn close(&self) -> Result<()> {
        {
            let mut channel = self.channel.lock().await;
            if let Some(mut writer) = channel.writer.take() {
                let _ = writer.shutdown().await;
            }
        }

        let child = self.child.lock().await.take();
        if let Some(mut child) = child {
            match timeout(CLOSE_GRACE, child.wait()).await {
                Ok(Ok(status)) => tracing::info!(%status, "tool host exited"),
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => {
                    tracing::warn!("tool host did not exit in time, killing it");
                    child.kill().await?;
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ToolInvoker for TransportSession {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
        let response = self.request("tools/list", None).await?;
        let tool_list: ToolListResponse = serde_json::from_value(response)
            .map_err(|e| ArgoChatError::Transport(format!("bad tools/list result: {}", e)))?;
        Ok(tool_list.tools.into_iter().map(ToolDescriptor::from).collect())
    }

    async fn call_tool(&self, name: &str, arguments: &Value) -> Result<ToolOutput> {
        let params = json!({
            "name": name,
            "arguments": arguments,
        });
        let response = self.request("tools/call", Some(params)).await?;
        serde_json::from_value(response)
            .map_err(|e| ArgoChatError::Transport(format!("bad tools/call result: {}", e)))
    }
}
