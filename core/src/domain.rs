//! Domain models shared by the executor and the services

use serde::{Deserialize, Serialize};

/// Which driver path a raw SQL statement takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatementKind {
    /// Returns rows (`SELECT`, `SHOW`)
    Read,
    /// Everything else
    Write,
}

impl StatementKind {
    /// Classify by the first whitespace-delimited token, ignoring case
    pub fn classify(sql: &str) -> Self {
        match sql.split_whitespace().next() {
            Some(token)
                if token.eq_ignore_ascii_case("SELECT") || token.eq_ignore_ascii_case("SHOW") =>
            {
                StatementKind::Read
            }
            _ => StatementKind::Write,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Read => "READ",
            StatementKind::Write => "WRITE",
        }
    }
}

/// Rows returned by the read path, decoded into JSON values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl ResultSet {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First column of the first row, if any
    pub fn first_value(&self) -> Option<&serde_json::Value> {
        self.rows.first().and_then(|row| row.first())
    }
}

/// Outcome of `exec_sql`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryOutcome {
    Rows(ResultSet),
    Affected { rows: u64 },
}

/// Exit code and captured output lines of one external command run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub lines: Vec<String>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}
