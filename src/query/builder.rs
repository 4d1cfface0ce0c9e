//! Incremental SQL statement builder with positional parameter binding.
//!
//! Statement text and the parameter vector live behind one owned object so
//! placeholder numbering and parameter order can never drift apart. Values
//! are always bound, never interpolated into the text.

use rusqlite::types::Value;

/// Accumulates SQL text plus bound parameter values, assigning each value the
/// next 1-based `?N` placeholder at the point it is appended. One instance
/// serves a whole statement: condition clauses, path clause and sort clause
/// are all appended to the same builder.
#[derive(Debug, Default)]
pub struct SqlBuilder {
    text: String,
    params: Vec<Value>,
    needs_param_comma: bool,
}

impl SqlBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// The statement text accumulated so far.
    pub fn sql(&self) -> &str {
        &self.text
    }

    /// The bound values, in placeholder order.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Appends a fragment of statement text. A fragment that does not start
    /// with whitespace is put on a new line to keep the statement readable in
    /// logs.
    pub fn append_sql(&mut self, sql: &str) {
        if sql.is_empty() {
            return;
        }

        if !matches!(sql.as_bytes()[0], b' ' | b'\n') && !self.text.is_empty() {
            self.text.push('\n');
        }
        self.text.push_str(sql);

        self.needs_param_comma = false;
    }

    /// Appends a bound value, emitting its `?N` placeholder. Consecutive
    /// parameters with no text between them are comma-separated so `IN`
    /// lists can be built by repeated calls.
    pub fn append_param(&mut self, value: impl Into<Value>) {
        if self.needs_param_comma {
            self.text.push(',');
        }

        self.text.push('?');
        self.text.push_str(&(self.params.len() + 1).to_string());

        self.params.push(value.into());
        self.needs_param_comma = true;
    }
}
