//! Database command executor
//!
//! Imports and exports go through the MySQL command line tools with one
//! retry; raw statements go through a single persistent driver connection.

use std::path::Path;
use tracing::{debug, info};

use crate::adapter::{quote_identifier, quote_literal, MySqlDriver, SqlDriver};
use crate::command::{export_command, import_command};
use crate::config::ConnectionParams;
use crate::domain::{QueryOutcome, ResultSet, StatementKind};
use crate::error::{CoreError, Result};
use crate::runner::{run_with_retry, CommandRunner, ShellRunner};

/// Executor for imports, exports and raw SQL against the shop database
pub struct DatabaseHandler<D = MySqlDriver, R = ShellRunner> {
    params: ConnectionParams,
    driver: D,
    runner: R,
}

impl DatabaseHandler {
    /// Open the driver connection; fails fast with `ConnectionFailed`
    pub async fn connect(params: ConnectionParams) -> Result<Self> {
        let driver = MySqlDriver::connect(&params).await?;
        Ok(Self::with_parts(params, driver, ShellRunner))
    }
}

impl<D: SqlDriver, R: CommandRunner> DatabaseHandler<D, R> {
    /// Assemble a handler from an already connected driver and a runner
    pub fn with_parts(params: ConnectionParams, driver: D, runner: R) -> Self {
        Self {
            params,
            driver,
            runner,
        }
    }

    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    /// Charset used by `import` when none is given
    pub fn charset_mode(&self) -> &str {
        self.params.charset_mode()
    }

    /// Load a SQL file into the configured database
    pub async fn import(&mut self, file: impl AsRef<Path>, charset_mode: Option<&str>) -> Result<()> {
        let file = file.as_ref();
        if !file.exists() {
            return Err(CoreError::FileNotFound(file.to_path_buf()));
        }

        let charset_mode = charset_mode
            .filter(|mode| !mode.is_empty())
            .unwrap_or_else(|| self.charset_mode());
        let command = import_command(&self.params, file, charset_mode);
        run_with_retry(&self.runner, &command).await?;

        info!("Imported {} into {}", file.display(), self.params.database());
        Ok(())
    }

    /// Dump the configured database, or only `tables` when non-empty, into `file`
    pub async fn export(&mut self, file: impl AsRef<Path>, tables: &[String]) -> Result<()> {
        let file = file.as_ref();
        let command = export_command(&self.params, file, tables);
        run_with_retry(&self.runner, &command).await?;

        info!("Exported {} to {}", self.params.database(), file.display());
        Ok(())
    }

    /// Run a row-returning statement
    pub async fn query(&mut self, sql: &str) -> Result<ResultSet> {
        self.use_configured_database().await?;
        self.driver
            .fetch(sql)
            .await
            .map_err(|source| CoreError::ExecutionFailed {
                sql: sql.to_string(),
                source,
            })
    }

    /// Run a write statement; returns the affected row count
    pub async fn exec(&mut self, sql: &str) -> Result<u64> {
        self.use_configured_database().await?;
        self.driver
            .execute(sql)
            .await
            .map_err(|source| CoreError::ExecutionFailed {
                sql: sql.to_string(),
                source,
            })
    }

    /// Route `sql` to `query` or `exec` by its leading keyword
    pub async fn exec_sql(&mut self, sql: &str) -> Result<QueryOutcome> {
        let kind = StatementKind::classify(sql);
        debug!("Executing {} statement", kind.as_str());

        match kind {
            StatementKind::Read => self.query(sql).await.map(QueryOutcome::Rows),
            StatementKind::Write => self
                .exec(sql)
                .await
                .map(|rows| QueryOutcome::Affected { rows }),
        }
    }

    /// Quote `value` as a string literal for hand-built SQL
    pub fn escape(&self, value: &str) -> String {
        quote_literal(value)
    }

    /// Drop and create the configured database
    pub async fn recreate_database(&mut self) -> Result<()> {
        let database = quote_identifier(self.params.database());
        let statements = [
            format!("DROP DATABASE IF EXISTS {}", database),
            format!(
                "CREATE DATABASE {} CHARACTER SET {}",
                database,
                quote_identifier(self.params.charset_mode())
            ),
        ];

        for sql in statements {
            let result = self.driver.execute(&sql).await;
            result.map_err(|source| CoreError::ExecutionFailed { sql, source })?;
        }

        info!("Recreated database {}", self.params.database());
        Ok(())
    }

    /// Select the database on every call: it may have been dropped and
    /// recreated since the connection was opened.
    async fn use_configured_database(&mut self) -> Result<()> {
        let sql = format!("USE {}", quote_identifier(self.params.database()));
        self.driver
            .execute(&sql)
            .await
            .map(|_| ())
            .map_err(|source| CoreError::DatabaseUnavailable {
                database: self.params.database().to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::MockSqlDriver;
    use crate::domain::CommandOutput;
    use crate::runner::MockCommandRunner;
    use mockall::predicate::eq;
    use mockall::Sequence;

    fn params() -> ConnectionParams {
        ConnectionParams::new("localhost", "root", "oxid")
            .unwrap()
            .with_password(Some("pw".to_string()))
    }

    fn ok_output() -> CommandOutput {
        CommandOutput {
            exit_code: 0,
            lines: Vec::new(),
        }
    }

    fn handler(
        driver: MockSqlDriver,
        runner: MockCommandRunner,
    ) -> DatabaseHandler<MockSqlDriver, MockCommandRunner> {
        DatabaseHandler::with_parts(params(), driver, runner)
    }

    #[tokio::test]
    async fn test_import_missing_file_runs_nothing() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().times(0);

        let mut db = handler(MockSqlDriver::new(), runner);
        let err = db
            .import("/nonexistent/dir/dump.sql", None)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_import_uses_default_charset() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd| cmd.as_str().contains("--default-character-set='utf8'"))
            .times(1)
            .returning(|_| Ok(ok_output()));

        let mut db = handler(MockSqlDriver::new(), runner);
        db.import(file.path(), None).await.unwrap();
    }

    #[tokio::test]
    async fn test_import_explicit_charset() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd| cmd.as_str().contains("--default-character-set='latin1'"))
            .times(1)
            .returning(|_| Ok(ok_output()));

        let mut db = handler(MockSqlDriver::new(), runner);
        db.import(file.path(), Some("latin1")).await.unwrap();
    }

    #[tokio::test]
    async fn test_import_empty_charset_falls_back_to_default() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd| cmd.as_str().contains("--default-character-set='utf8'"))
            .times(1)
            .returning(|_| Ok(ok_output()));

        let mut db = handler(MockSqlDriver::new(), runner);
        db.import(file.path(), Some("")).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_failing_twice() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().times(2).returning(|_| {
            Ok(CommandOutput {
                exit_code: 1,
                lines: vec!["mysqldump: Got error: 1049".to_string()],
            })
        });

        let mut db = handler(MockSqlDriver::new(), runner);
        let err = db.export("/tmp/out.sql", &[]).await.unwrap_err();
        assert!(matches!(err, CoreError::CommandExecutionFailed { .. }));
    }

    #[tokio::test]
    async fn test_export_passes_tables() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd| cmd.as_str().contains("'oxid' 'users' 'orders' >"))
            .times(1)
            .returning(|_| Ok(ok_output()));

        let mut db = handler(MockSqlDriver::new(), runner);
        let tables = vec!["users".to_string(), "orders".to_string()];
        db.export("/tmp/out.sql", &tables).await.unwrap();
    }

    #[tokio::test]
    async fn test_exec_sql_routes_select_to_read_path() {
        let mut driver = MockSqlDriver::new();
        driver
            .expect_execute()
            .with(eq("USE `oxid`"))
            .times(2)
            .returning(|_| Ok(0));
        driver.expect_fetch().times(2).returning(|_| {
            Ok(ResultSet {
                columns: vec!["1".to_string()],
                rows: vec![vec![serde_json::json!(1)]],
            })
        });

        let mut db = handler(driver, MockCommandRunner::new());
        let outcome = db.exec_sql("SELECT * FROM orders").await.unwrap();
        assert!(matches!(outcome, QueryOutcome::Rows(_)));
        let outcome = db.exec_sql("select 1").await.unwrap();
        assert!(matches!(outcome, QueryOutcome::Rows(_)));
    }

    #[tokio::test]
    async fn test_exec_sql_routes_update_to_write_path() {
        let mut driver = MockSqlDriver::new();
        let mut seq = Sequence::new();
        driver
            .expect_execute()
            .with(eq("USE `oxid`"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(0));
        driver
            .expect_execute()
            .with(eq("UPDATE orders SET x=1"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(4));
        driver.expect_fetch().times(0);

        let mut db = handler(driver, MockCommandRunner::new());
        let outcome = db.exec_sql("UPDATE orders SET x=1").await.unwrap();
        assert_eq!(outcome, QueryOutcome::Affected { rows: 4 });
    }

    #[tokio::test]
    async fn test_every_call_reasserts_database() {
        let mut driver = MockSqlDriver::new();
        let mut seq = Sequence::new();
        for _ in 0..3 {
            driver
                .expect_execute()
                .with(eq("USE `oxid`"))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_| Ok(0));
            driver
                .expect_execute()
                .with(eq("DELETE FROM oxsessions"))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_| Ok(1));
        }

        let mut db = handler(driver, MockCommandRunner::new());
        for _ in 0..3 {
            db.exec("DELETE FROM oxsessions").await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_driver_error_becomes_execution_failed() {
        let mut driver = MockSqlDriver::new();
        driver
            .expect_execute()
            .with(eq("USE `oxid`"))
            .returning(|_| Ok(0));
        driver
            .expect_execute()
            .with(eq("INSERT INTO broken"))
            .returning(|_| Err(sqlx::Error::Protocol("syntax error".to_string())));

        let mut db = handler(driver, MockCommandRunner::new());
        let err = db.exec_sql("INSERT INTO broken").await.unwrap_err();
        match err {
            CoreError::ExecutionFailed { sql, .. } => assert_eq!(sql, "INSERT INTO broken"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_database_reported() {
        let mut driver = MockSqlDriver::new();
        driver
            .expect_execute()
            .returning(|_| Err(sqlx::Error::Protocol("Unknown database".to_string())));
        driver.expect_fetch().times(0);

        let mut db = handler(driver, MockCommandRunner::new());
        let err = db.query("SHOW TABLES").await.unwrap_err();
        assert!(matches!(err, CoreError::DatabaseUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_recreate_database_skips_use() {
        let mut driver = MockSqlDriver::new();
        let mut seq = Sequence::new();
        driver
            .expect_execute()
            .with(eq("DROP DATABASE IF EXISTS `oxid`"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(0));
        driver
            .expect_execute()
            .with(eq("CREATE DATABASE `oxid` CHARACTER SET `utf8`"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(1));

        let mut db = handler(driver, MockCommandRunner::new());
        db.recreate_database().await.unwrap();
    }

    #[test]
    fn test_escape() {
        let db = handler(MockSqlDriver::new(), MockCommandRunner::new());
        assert_eq!(db.escape("O'Reilly"), r"'O\'Reilly'");
    }
}
