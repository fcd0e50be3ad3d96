//! External command execution with a single retry

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::command::ShellCommand;
use crate::domain::CommandOutput;
use crate::error::{CoreError, Result};

/// Pause between the first failed attempt and the retry
pub const RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Runs a composed command line and reports its exit code and output
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &ShellCommand) -> Result<CommandOutput>;
}

/// Runs commands through `sh -c`
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &ShellCommand) -> Result<CommandOutput> {
        debug!("Running {}", command);

        let output = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(command.as_str())
            .output()
            .await?;

        let mut lines: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect();
        lines.extend(
            String::from_utf8_lossy(&output.stderr)
                .lines()
                .map(str::to_string),
        );

        Ok(CommandOutput {
            // Killed by a signal
            exit_code: output.status.code().unwrap_or(-1),
            lines,
        })
    }
}

/// Run `command`; on a non-zero exit wait `RETRY_BACKOFF` and run it exactly once more.
///
/// Output lines of both attempts are kept for the error.
pub async fn run_with_retry<R>(runner: &R, command: &ShellCommand) -> Result<CommandOutput>
where
    R: CommandRunner + ?Sized,
{
    let first = runner.run(command).await?;
    if first.success() {
        return Ok(first);
    }

    warn!(
        exit_code = first.exit_code,
        "Command failed, retrying once: {}", command
    );
    tokio::time::sleep(RETRY_BACKOFF).await;

    let second = runner.run(command).await?;
    if second.success() {
        return Ok(second);
    }

    let mut lines = first.lines;
    lines.extend(second.lines);
    Err(CoreError::CommandExecutionFailed {
        command: command.redacted().to_string(),
        output: lines.join("\n"),
    })
}
