use rusqlite::types::ValueRef;

const SAMPLE_VALUE_MAX_CHARS: usize = 100;
const RESULT_VALUE_MAX_CHARS: usize = 300;

/// A single cell read from the store, detached from the statement.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(usize),
}

impl From<ValueRef<'_>> for SqlValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => SqlValue::Null,
            ValueRef::Integer(i) => SqlValue::Integer(i),
            ValueRef::Real(f) => SqlValue::Real(f),
            ValueRef::Text(bytes) => SqlValue::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => SqlValue::Blob(bytes.len()),
        }
    }
}

impl SqlValue {
    /// Literal form used inside result tuples: quoted text, `None` for NULL.
    /// Text longer than 300 characters is cut.
    pub fn to_literal(&self) -> String {
        match self {
            SqlValue::Null => "None".to_string(),
            SqlValue::Integer(i) => i.to_string(),
            SqlValue::Real(f) => format_real(*f),
            SqlValue::Text(s) => quote_text(&truncate(s, RESULT_VALUE_MAX_CHARS)),
            SqlValue::Blob(len) => format!("<blob {} bytes>", len),
        }
    }

    /// Bare form used in the schema sample rows.
    pub fn to_plain(&self) -> String {
        match self {
            SqlValue::Text(s) => truncate(s, SAMPLE_VALUE_MAX_CHARS),
            other => other.to_literal(),
        }
    }
}

fn format_real(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let rendered = value.to_string();
    if rendered.contains('.') {
        rendered
    } else {
        format!("{}.0", rendered)
    }
}

fn quote_text(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\t', "\\t");
    if escaped.contains('\'') && !escaped.contains('"') {
        format!("\"{}\"", escaped)
    } else {
        format!("'{}'", escaped.replace('\'', "\\'"))
    }
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() > max_chars {
        format!("{}...", value.chars().take(max_chars).collect::<String>())
    } else {
        value.to_string()
    }
}

/// Render a result set as a list of tuples, e.g. `[('1900683', 12.5), ('1900684', None)]`.
/// An empty result renders as an empty string.
pub fn render_rows(rows: &[Vec<SqlValue>]) -> String {
    render_rows_within(rows, usize::MAX).0
}

/// Like [`render_rows`], but stops before the text would grow past `max_chars`.
/// Returns the text and how many rows it holds. At least one row is always kept.
pub fn render_rows_within(rows: &[Vec<SqlValue>], max_chars: usize) -> (String, usize) {
    if rows.is_empty() {
        return (String::new(), 0);
    }

    let mut out = String::from("[");
    let mut shown = 0;
    for row in rows {
        let tuple = render_tuple(row);
        let separator = if shown == 0 { 0 } else { 2 };
        if shown > 0 && out.len() + separator + tuple.len() + 1 > max_chars {
            break;
        }
        if shown > 0 {
            out.push_str(", ");
        }
        out.push_str(&tuple);
        shown += 1;
    }
    out.push(']');
    (out, shown)
}

fn render_tuple(row: &[SqlValue]) -> String {
    let values: Vec<String> = row.iter().map(SqlValue::to_literal).collect();
    if values.len() == 1 {
        format!("({},)", values[0])
    } else {
        format!("({})", values.join(", "))
    }
}

/// The comment block appended under each `CREATE TABLE` statement in the schema text.
pub fn render_sample_block(table: &str, columns: &[String], rows: &[Vec<SqlValue>]) -> String {
    let mut lines = vec![
        format!("{} rows from {} table:", rows.len(), table),
        columns.join("\t"),
    ];
    for row in rows {
        lines.push(
            row.iter()
                .map(SqlValue::to_plain)
                .collect::<Vec<_>>()
                .join("\t"),
        );
    }
    format!("/*\n{}\n*/", lines.join("\n"))
}
