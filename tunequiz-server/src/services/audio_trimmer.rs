//! Audio trimming tool (ffmpeg)

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

use super::tool_runner::{run_tool, ToolError};

const TOOL_NAME: &str = "ffmpeg";

/// Clip extraction seam
#[async_trait]
pub trait AudioTrimmer: Send + Sync {
    /// Write the first `seconds` of `input` (or all of it, if shorter) to `output`
    async fn trim(&self, input: &Path, seconds: u32, output: &Path) -> Result<PathBuf, ToolError>;
}

/// ffmpeg backed implementation producing MP3
pub struct FfmpegTrimmer {
    binary: String,
    timeout: Duration,
}

impl FfmpegTrimmer {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }
}

#[async_trait]
impl AudioTrimmer for FfmpegTrimmer {
    async fn trim(&self, input: &Path, seconds: u32, output: &Path) -> Result<PathBuf, ToolError> {
        let mut command = Command::new(&self.binary);
        command
            .arg("-y")
            .arg("-i")
            .arg(input)
            .arg("-ss")
            .arg("0")
            .arg("-t")
            .arg(seconds.to_string())
            .arg("-acodec")
            .arg("libmp3lame")
            .arg(output);

        run_tool(TOOL_NAME, command, self.timeout).await?;

        let produced = tokio::fs::metadata(output)
            .await
            .map(|meta| meta.len() > 0)
            .unwrap_or(false);
        if !produced {
            return Err(ToolError::EmptyOutput {
                tool: TOOL_NAME.to_string(),
            });
        }

        Ok(output.to_path_buf())
    }
}
