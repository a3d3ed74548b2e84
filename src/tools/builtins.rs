use serde_json::{json, Value};
use std::sync::Arc;

use super::registry::ToolRegistry;
use crate::compiler::QueryCompiler;
use crate::database::DatabaseGateway;
use crate::error::Result;
use crate::models::ToolDescriptor;

pub const GET_SCHEMA: &str = "get_schema";
pub const GET_SQL_QUERY: &str = "get_sql_query";
pub const GET_SQL_RESPONSE: &str = "get_sql_response";

fn string_argument(args: &Value, name: &str) -> std::result::Result<String, String> {
    args.get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| format!("Missing required argument: {}", name))
}

impl ToolRegistry {
    /// The ARGO tool set: schema lookup, SQL generation and SQL execution.
    pub fn argo(gateway: Arc<DatabaseGateway>, compiler: Arc<QueryCompiler>) -> Result<Self> {
        let mut registry = ToolRegistry::new();

        let schema_gateway = Arc::clone(&gateway);
        registry.register(
            ToolDescriptor {
                name: GET_SCHEMA.to_string(),
                description: "Get the schema of the ARGO database: every table with its columns \
                              and a few example rows."
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {},
                    "additionalProperties": false
                }),
            },
            Box::new(move |_args| {
                let gateway = Arc::clone(&schema_gateway);
                Box::pin(async move {
                    tokio::task::spawn_blocking(move || gateway.get_schema())
                        .await
                        .map_err(|e| format!("schema lookup did not complete: {}", e))
                })
            }),
        )?;

        registry.register(
            ToolDescriptor {
                name: GET_SQL_QUERY.to_string(),
                description: "Write a SQL query for the ARGO database that answers a \
                              natural-language question. Returns the SQL text without running it."
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "The user's question in natural language"
                        }
                    },
                    "required": ["query"],
                    "additionalProperties": false
                }),
            },
            Box::new(move |args| {
                let compiler = Arc::clone(&compiler);
                let question = string_argument(args, "query");
                Box::pin(async move {
                    let question = question?;
                    compiler
                        .get_sql_query(&question)
                        .await
                        .map_err(|e| e.to_string())
                })
            }),
        )?;

        registry.register(
            ToolDescriptor {
                name: GET_SQL_RESPONSE.to_string(),
                description: "Run a SQL query against the ARGO database and return the rows. \
                              Errors from the database are returned as text."
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "sql_query": {
                            "type": "string",
                            "description": "The SQL query to execute"
                        }
                    },
                    "required": ["sql_query"],
                    "additionalProperties": false
                }),
            },
            Box::new(move |args| {
                let gateway = Arc::clone(&gateway);
                let sql = string_argument(args, "sql_query");
                Box::pin(async move {
                    let sql = sql?;
                    tokio::task::spawn_blocking(move || gateway.get_sql_response(&sql))
                        .await
                        .map_err(|e| format!("query did not complete: {}", e))
                })
            }),
        )?;

        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_argument() {
        assert_eq!(
            string_argument(&json!({"sql_query": "SELECT 1"}), "sql_query").unwrap(),
            "SELECT 1"
        );
        assert_eq!(
            string_argument(&json!({}), "sql_query").unwrap_err(),
            "Missing required argument: sql_query"
        );
    }
}
