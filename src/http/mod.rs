mod routes;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::error::{ArgoChatError, ErrorKind};
use crate::orchestrator::OrchestratorContext;
use crate::session::SessionStore;

pub use routes::{QueryRequest, QueryResponse, ToolsResponse};

pub const HEALTH_PATH: &str = "/health";
pub const TOOLS_PATH: &str = "/tools";
pub const QUERY_PATH: &str = "/query";
pub const SESSION_PATH: &str = "/sessions/{id}";

/// Shared by every handler. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub context: Arc<OrchestratorContext>,
    pub sessions: Arc<dyn SessionStore>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(routes::health))
        .route(TOOLS_PATH, get(routes::list_tools))
        .route(QUERY_PATH, post(routes::query))
        .route(SESSION_PATH, delete(routes::delete_session))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Error body `{"error": "..."}` with a status derived from the failure class.
#[derive(Debug)]
pub struct ApiError(pub ArgoChatError);

impl From<ArgoChatError> for ApiError {
    fn from(e: ArgoChatError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ArgoChatError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ArgoChatError::SessionBusy(_) => StatusCode::CONFLICT,
            other => match other.kind() {
                ErrorKind::Transport | ErrorKind::Model => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.status();
        if code.is_server_error() {
            tracing::error!(status = code.as_u16(), error = %self.0, "request failed");
        }
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (code, body).into_response()
    }
}
