//! MySQL driver implementation

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Column, ConnectOptions, Executor, Row, ValueRef};
use tracing::info;

use crate::adapter::SqlDriver;
use crate::config::ConnectionParams;
use crate::domain::ResultSet;
use crate::error::{CoreError, Result};

/// Session initialisation issued right after connecting
const SESSION_INIT: &str = "SET NAMES utf8";

/// Driver holding one exclusively owned MySQL connection
///
/// No database is selected when connecting; the executor issues `USE`
/// before every statement.
pub struct MySqlDriver {
    conn: MySqlConnection,
}

impl MySqlDriver {
    /// Connect to the server named in `params`
    pub async fn connect(params: &ConnectionParams) -> Result<Self> {
        let mut options = MySqlConnectOptions::new()
            .host(params.host())
            .username(params.user());
        if let Some(port) = params.port() {
            options = options.port(port);
        }
        if let Some(password) = params.password() {
            options = options.password(password);
        }

        let connection_failed = |source| CoreError::ConnectionFailed {
            host: params.host().to_string(),
            user: params.user().to_string(),
            source,
        };

        let mut conn = options.connect().await.map_err(connection_failed)?;
        (&mut conn)
            .execute(SESSION_INIT)
            .await
            .map_err(connection_failed)?;

        info!(
            "Connected to MySQL at {}{}",
            params.host(),
            params.port().map(|p| format!(":{}", p)).unwrap_or_default()
        );
        Ok(Self { conn })
    }

    fn decode_row(row: &MySqlRow) -> Vec<serde_json::Value> {
        (0..row.columns().len())
            .map(|index| Self::decode_value(row, index))
            .collect()
    }

    /// Best-effort conversion of one column value into JSON
    fn decode_value(row: &MySqlRow, index: usize) -> serde_json::Value {
        match row.try_get_raw(index) {
            Ok(raw) if !raw.is_null() => {}
            _ => return serde_json::Value::Null,
        }

        if let Ok(v) = row.try_get::<i64, _>(index) {
            return v.into();
        }
        if let Ok(v) = row.try_get::<u64, _>(index) {
            return v.into();
        }
        if let Ok(v) = row.try_get::<f64, _>(index) {
            return serde_json::Number::from_f64(v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null);
        }
        if let Ok(v) = row.try_get::<String, _>(index) {
            return v.into();
        }

        // DECIMAL, temporal and binary columns arrive as text over the plain query protocol
        match row.try_get_unchecked::<Vec<u8>, _>(index) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned().into(),
            Err(_) => serde_json::Value::Null,
        }
    }
}

#[async_trait]
impl SqlDriver for MySqlDriver {
    async fn execute(&mut self, sql: &str) -> std::result::Result<u64, sqlx::Error> {
        let result = (&mut self.conn).execute(sql).await?;
        Ok(result.rows_affected())
    }

    async fn fetch(&mut self, sql: &str) -> std::result::Result<ResultSet, sqlx::Error> {
        let rows = (&mut self.conn).fetch_all(sql).await?;

        let columns = rows
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|column| column.name().to_string())
                    .collect()
            })
            .unwrap_or_default();

        Ok(ResultSet {
            columns,
            rows: rows.iter().map(Self::decode_row).collect(),
        })
    }
}
