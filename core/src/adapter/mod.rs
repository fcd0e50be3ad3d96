//! Database driver abstraction for the query/exec paths

use crate::domain::ResultSet;
use async_trait::async_trait;

pub mod mysql;

pub use mysql::MySqlDriver;

/// Connection-level driver operations
///
/// One implementation owns exactly one live connection. Errors are
/// returned raw so the caller can attach the statement that failed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SqlDriver: Send {
    /// Run a statement that does not return rows; yields affected rows
    async fn execute(&mut self, sql: &str) -> Result<u64, sqlx::Error>;

    /// Run a statement and collect its rows
    async fn fetch(&mut self, sql: &str) -> Result<ResultSet, sqlx::Error>;
}

/// Quote a value as a MySQL string literal.
///
/// Escapes the same characters as the client library's
/// `mysql_real_escape_string`.
pub fn quote_literal(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for ch in value.chars() {
        match ch {
            '\0' => quoted.push_str("\\0"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '"' => quoted.push_str("\\\""),
            '\x1a' => quoted.push_str("\\Z"),
            _ => quoted.push(ch),
        }
    }
    quoted.push('\'');
    quoted
}

/// Quote an identifier with backticks
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}
