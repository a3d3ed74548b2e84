use rusqlite::{Connection, OpenFlags};
use std::sync::{Mutex, MutexGuard};

use super::render::{render_rows_within, render_sample_block, SqlValue};
use crate::config::DatabaseConfig;
use crate::error::{ArgoChatError, Result};

/// Rows fetched for a tool-facing query before the rest are dropped.
pub const MAX_RESULT_ROWS: usize = 1000;
/// Upper bound on the rendered result text handed back to the model.
pub const MAX_RESULT_CHARS: usize = 20_000;

/// Columns and rows of an executed query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

/// Read access to the ARGO relational store.
///
/// The connection is opened once and shared by every tool call of the process.
pub struct DatabaseGateway {
    conn: Mutex<Connection>,
    sample_rows: usize,
}

impl DatabaseGateway {
    /// Open the configured SQLite file read-only.
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        let conn = Connection::open_with_flags(
            &config.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        tracing::info!(path = %config.path.display(), "opened ARGO database");
        Ok(Self::from_connection(conn, config.sample_rows))
    }

    pub fn from_connection(conn: Connection, sample_rows: usize) -> Self {
        Self {
            conn: Mutex::new(conn),
            sample_rows,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ArgoChatError::Tool("database connection lock poisoned".to_string()))
    }

    /// User tables, in name order.
    pub fn table_names(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Table definitions followed by a few example rows per table.
    pub fn schema_text(&self) -> Result<String> {
        let tables = {
            let conn = self.lock()?;
            let mut stmt = conn.prepare(
                "SELECT name, sql FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            )?;
            let tables = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            tables
        };

        let mut sections = Vec::with_capacity(tables.len());
        for (name, create_sql) in tables {
            let mut section = create_sql.unwrap_or_default().trim_end().to_string();
            if self.sample_rows > 0 {
                let sample = self.run_query(&format!(
                    "SELECT * FROM {} LIMIT {}",
                    quote_identifier(&name),
                    self.sample_rows
                ))?;
                section.push_str("\n\n");
                section.push_str(&render_sample_block(&name, &sample.columns, &sample.rows));
            }
            sections.push(section);
        }

        Ok(sections.join("\n\n"))
    }

    /// Tool-facing schema lookup: the schema text, or the error message on failure.
    pub fn get_schema(&self) -> String {
        match self.schema_text() {
            Ok(schema) => schema,
            Err(e) => {
                tracing::warn!(error = %e, "schema lookup failed");
                e.to_string()
            }
        }
    }

    pub fn run_query(&self, sql: &str) -> Result<QueryResult> {
        self.fetch(sql, usize::MAX).map(|(result, _)| result)
    }

    /// Read at most `max_rows` rows; the flag says whether more were available.
    fn fetch(&self, sql: &str, max_rows: usize) -> Result<(QueryResult, bool)> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let column_count = columns.len();

        let mut rows = Vec::new();
        let mut more = false;
        let mut cursor = stmt.query([])?;
        while let Some(row) = cursor.next()? {
            if rows.len() == max_rows {
                more = true;
                break;
            }
            let mut values = Vec::with_capacity(column_count);
            for index in 0..column_count {
                values.push(SqlValue::from(row.get_ref(index)?));
            }
            rows.push(values);
        }

        Ok((QueryResult { columns, rows }, more))
    }

    /// Execute a query and render its rows. Failures come back as the error text.
    ///
    /// Large results are cut to fit [`MAX_RESULT_ROWS`] and [`MAX_RESULT_CHARS`], with
    /// a trailing note telling the model to narrow the query.
    pub fn get_sql_response(&self, sql: &str) -> String {
        match self.fetch(sql, MAX_RESULT_ROWS) {
            Ok((result, more)) => {
                let fetched = result.rows.len();
                let (mut text, shown) = render_rows_within(&result.rows, MAX_RESULT_CHARS);
                if more || shown < fetched {
                    let total = if more {
                        format!("more than {}", fetched)
                    } else {
                        fetched.to_string()
                    };
                    tracing::info!(shown, total = %total, "query result truncated");
                    text.push_str(&format!(
                        "\n(result truncated: showing {} of {} rows; \
                         narrow the query with WHERE, aggregates or LIMIT)",
                        shown, total
                    ));
                } else {
                    tracing::debug!(rows = fetched, "query executed");
                }
                text
            }
            Err(e) => {
                tracing::info!(error = %e, "query failed");
                match e {
                    ArgoChatError::Database(db_err) => db_err.to_string(),
                    other => other.to_string(),
                }
            }
        }
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> DatabaseGateway {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE argo_profile (platform_number TEXT, cycle_number INTEGER, pres REAL);
             INSERT INTO argo_profile VALUES ('1900683', 1, 5.0);
             INSERT INTO argo_profile VALUES ('1900683', 2, 10.5);",
        )
        .unwrap();
        DatabaseGateway::from_connection(conn, 3)
    }

    #[test]
    fn test_run_query_columns_and_rows() {
        let result = gateway()
            .run_query("SELECT cycle_number, pres FROM argo_profile ORDER BY cycle_number")
            .unwrap();
        assert_eq!(result.columns, vec!["cycle_number", "pres"]);
        assert_eq!(
            result.rows,
            vec![
                vec![SqlValue::Integer(1), SqlValue::Real(5.0)],
                vec![SqlValue::Integer(2), SqlValue::Real(10.5)],
            ]
        );
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("argo \"x\""), "\"argo \"\"x\"\"\"");
    }
}
