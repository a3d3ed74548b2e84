#![allow(dead_code)]

use async_trait::async_trait;
use rusqlite::Connection;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use argochat::api::{CompletionRequest, CompletionResponse, LanguageModel};
use argochat::error::{ArgoChatError, Result};
use argochat::models::{ContentBlock, ToolDescriptor, ToolOutput};
use argochat::tools::ToolInvoker;

/// Replays canned turns in order and records every request it saw.
pub struct ScriptedModel {
    turns: Mutex<VecDeque<Result<CompletionResponse>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    pub fn new(turns: Vec<CompletionResponse>) -> Self {
        Self::with_results(turns.into_iter().map(Ok).collect())
    }

    pub fn with_results(turns: Vec<Result<CompletionResponse>>) -> Self {
        Self {
            turns: Mutex::new(turns.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.turns
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ArgoChatError::MalformedResponse("script exhausted".into())))
    }
}

pub fn text_turn(text: &str) -> CompletionResponse {
    CompletionResponse::from_blocks(vec![ContentBlock::Text { text: text.into() }])
}

pub fn tool_turn(calls: &[(&str, &str, Value)]) -> CompletionResponse {
    CompletionResponse::from_blocks(
        calls
            .iter()
            .map(|(id, name, input)| ContentBlock::ToolUse {
                id: id.to_string(),
                name: name.to_string(),
                input: input.clone(),
            })
            .collect(),
    )
}

/// In-memory tool channel with fixed answers per tool name.
pub struct FakeTools {
    descriptors: Vec<ToolDescriptor>,
    answers: HashMap<String, String>,
    broken: Option<String>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl FakeTools {
    pub fn new(answers: &[(&str, &str)]) -> Self {
        Self {
            descriptors: answers
                .iter()
                .map(|(name, _)| ToolDescriptor {
                    name: name.to_string(),
                    description: format!("{} tool", name),
                    input_schema: serde_json::json!({"type": "object"}),
                })
                .collect(),
            answers: answers
                .iter()
                .map(|(name, answer)| (name.to_string(), answer.to_string()))
                .collect(),
            broken: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Calls to `name` fail as if the channel had dropped.
    pub fn with_broken_channel_on(mut self, name: &str) -> Self {
        self.broken = Some(name.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolInvoker for FakeTools {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
        Ok(self.descriptors.clone())
    }

    async fn call_tool(&self, name: &str, arguments: &Value) -> Result<ToolOutput> {
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), arguments.clone()));
        if self.broken.as_deref() == Some(name) {
            return Err(ArgoChatError::Transport("tool host closed the channel".into()));
        }
        Ok(match self.answers.get(name) {
            Some(answer) => ToolOutput::success(answer.clone()),
            None => ToolOutput::error(format!("Tool '{}' not found", name)),
        })
    }
}

/// A small ARGO database on disk with two tables.
pub fn argo_database(dir: &Path) -> PathBuf {
    let path = dir.join("argo.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE argo_profile (
             platform_number TEXT,
             cycle_number INTEGER,
             juld TEXT,
             latitude REAL,
             longitude REAL
         );
         INSERT INTO argo_profile VALUES ('1900683', 1, '2024-01-03T10:00:00', -12.5, 71.25);
         INSERT INTO argo_profile VALUES ('1900683', 2, '2024-01-13T10:05:00', -12.75, 71.5);
         INSERT INTO argo_profile VALUES ('2902112', 1, '2024-02-01T04:30:00', 8.0, 88.0);
         INSERT INTO argo_profile VALUES ('5904321', 7, NULL, NULL, NULL);
         CREATE TABLE argo_measurement (
             platform_number TEXT,
             cycle_number INTEGER,
             pres REAL,
             temp REAL,
             psal REAL
         );
         INSERT INTO argo_measurement VALUES ('1900683', 1, 5.0, 28.1, 35.2);
         INSERT INTO argo_measurement VALUES ('1900683', 1, 10.0, 27.9, 35.3);",
    )
    .unwrap();
    path
}
