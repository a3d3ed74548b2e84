use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{ApiError, AppState};
use crate::error::ArgoChatError;
use crate::models::{Message, ToolDescriptor};
use crate::orchestrator;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub session_id: String,
    pub status: String,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsResponse {
    pub tools: Vec<ToolDescriptor>,
}

pub(super) async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(super) async fn list_tools(State(st): State<AppState>) -> Json<ToolsResponse> {
    Json(ToolsResponse {
        tools: st.context.tool_descriptors.clone(),
    })
}

pub(super) async fn query(
    State(st): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let handle = match &request.session_id {
        Some(id) => st
            .sessions
            .get(id)
            .ok_or_else(|| ArgoChatError::SessionNotFound(id.clone()))?,
        None => st.sessions.create(),
    };

    // One query per session at a time; a second one is turned away, not queued.
    let Ok(mut session) = handle.try_lock() else {
        let id = request.session_id.unwrap_or_default();
        return Err(ArgoChatError::SessionBusy(id).into());
    };

    tracing::info!(session_id = %session.id, "query received");
    let outcome = orchestrator::run(&st.context, &mut session.messages, &request.query).await?;
    session.touch();

    Ok(Json(QueryResponse {
        session_id: session.id.clone(),
        status: outcome.status().to_string(),
        messages: session.messages.clone(),
    }))
}

pub(super) async fn delete_session(
    State(st): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if st.sessions.remove(&id) {
        tracing::info!(session_id = %id, "session deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ArgoChatError::SessionNotFound(id).into())
    }
}
