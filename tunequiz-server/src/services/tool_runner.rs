//! External command-line tool invocation
//!
//! Every tool call goes through [`run_tool`], which bounds it with a timeout,
//! kills the child when the timeout fires, and turns nonzero exits into a
//! [`ToolError`] carrying truncated combined output.

use std::process::{Output, Stdio};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command;
use tunequiz_common::text;

/// Tool invocation errors
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{tool} not found on PATH")]
    NotFound { tool: String },

    #[error("failed to launch {tool}: {message}")]
    Spawn { tool: String, message: String },

    #[error("{tool} exited with {status}: {output}")]
    Failed {
        tool: String,
        status: String,
        output: String,
    },

    #[error("{tool} timed out after {seconds}s")]
    Timeout { tool: String, seconds: u64 },

    #[error("{tool} produced no output")]
    EmptyOutput { tool: String },

    #[error("{tool} output could not be parsed: {message}")]
    Malformed { tool: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stdout followed by stderr, lossily decoded
pub fn combined_output(output: &Output) -> String {
    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        if !combined.is_empty() {
            combined.push('\n');
        }
        combined.push_str(&stderr);
    }
    combined
}

/// Run `command` to completion within `limit`
///
/// Returns the raw output on a zero exit status.
pub async fn run_tool(tool: &str, mut command: Command, limit: Duration) -> Result<Output, ToolError> {
    command.kill_on_drop(true).stdin(Stdio::null());

    let started = Instant::now();
    tracing::debug!(tool = %tool, timeout_secs = limit.as_secs(), "Invoking external tool");

    let output = match tokio::time::timeout(limit, command.output()).await {
        Err(_) => {
            tracing::warn!(tool = %tool, timeout_secs = limit.as_secs(), "External tool timed out");
            return Err(ToolError::Timeout {
                tool: tool.to_string(),
                seconds: limit.as_secs(),
            });
        }
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ToolError::NotFound {
                tool: tool.to_string(),
            });
        }
        Ok(Err(e)) => {
            return Err(ToolError::Spawn {
                tool: tool.to_string(),
                message: e.to_string(),
            });
        }
        Ok(Ok(output)) => output,
    };

    let combined = combined_output(&output);
    tracing::debug!(
        tool = %tool,
        elapsed_ms = started.elapsed().as_millis() as u64,
        status = %output.status,
        output = %text::diagnostic(&combined),
        "External tool finished"
    );

    if !output.status.success() {
        return Err(ToolError::Failed {
            tool: tool.to_string(),
            status: output.status.to_string(),
            output: text::diagnostic(&combined),
        });
    }

    Ok(output)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_command() {
        let mut command = Command::new("sh");
        command.arg("-c").arg("echo hello");
        let output = run_tool("sh", command, Duration::from_secs(5)).await.unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_failed_with_output() {
        let mut command = Command::new("sh");
        command.arg("-c").arg("echo broken >&2; exit 3");
        let err = run_tool("sh", command, Duration::from_secs(5)).await.unwrap_err();
        match err {
            ToolError::Failed { output, .. } => assert!(output.contains("broken")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout() {
        let mut command = Command::new("sh");
        command.arg("-c").arg("sleep 5");
        let err = run_tool("sh", command, Duration::from_millis(100)).await.unwrap_err();
        assert!(matches!(err, ToolError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_timed_out_child_is_killed() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("finished");

        let mut command = Command::new("sh");
        command
            .arg("-c")
            .arg(format!("sleep 1; touch '{}'", marker.display()));
        let err = run_tool("sh", command, Duration::from_millis(100)).await.unwrap_err();
        assert!(matches!(err, ToolError::Timeout { .. }));

        // a surviving shell would create the marker once its sleep ends
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let command = Command::new("definitely-not-a-real-tool-binary");
        let err = run_tool("fake", command, Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_failed_output_is_bounded() {
        let mut command = Command::new("sh");
        command.arg("-c").arg("head -c 5000 /dev/zero | tr '\\0' 'x'; exit 1");
        let err = run_tool("sh", command, Duration::from_secs(5)).await.unwrap_err();
        match err {
            ToolError::Failed { output, .. } => {
                assert!(output.chars().count() <= text::DIAGNOSTIC_LIMIT + 3)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
