//! Media search/download tool (yt-dlp)
//!
//! Search and duration probes read the tool's `-J` JSON dump. The dump can
//! be preceded by stray warning lines, so parsing starts at the first `{`
//! when the whole output is not valid JSON.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

use super::tool_runner::{run_tool, ToolError};
use crate::models::SearchHit;

const TOOL_NAME: &str = "yt-dlp";

/// Media search and download seam
#[async_trait]
pub trait MediaTool: Send + Sync {
    /// Up to `top_k` results for a free-text query
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>, ToolError>;

    /// Length of a single source in seconds, if the tool reports one
    async fn probe_duration(&self, source_ref: &str) -> Result<Option<u32>, ToolError>;

    /// Fetch the best audio stream into `dest_dir`, returning the file path
    async fn download(&self, source_ref: &str, dest_dir: &Path) -> Result<PathBuf, ToolError>;
}

/// Parse the first JSON object in `raw`, skipping any leading noise
pub fn parse_json_with_recovery(raw: &[u8]) -> Result<Value, ToolError> {
    let text = String::from_utf8_lossy(raw);
    if let Ok(value) = serde_json::from_str::<Value>(&text) {
        return Ok(value);
    }

    let malformed = |message: String| ToolError::Malformed {
        tool: TOOL_NAME.to_string(),
        message,
    };

    let start = text
        .find('{')
        .ok_or_else(|| malformed("no JSON object in output".to_string()))?;
    serde_json::Deserializer::from_str(&text[start..])
        .into_iter::<Value>()
        .next()
        .ok_or_else(|| malformed("empty JSON stream".to_string()))?
        .map_err(|e| malformed(e.to_string()))
}

/// Positive whole-second duration from any of the fields the tool uses
fn duration_of(info: &Value) -> Option<u32> {
    ["duration", "duration_seconds", "length"]
        .iter()
        .filter_map(|key| info.get(*key).and_then(Value::as_f64))
        .find(|secs| *secs > 0.0)
        .map(|secs| secs.round() as u32)
}

fn str_field(info: &Value, key: &str) -> String {
    info.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn hit_from_entry(entry: &Value) -> Option<SearchHit> {
    let source_ref = entry
        .get("webpage_url")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| {
            entry
                .get("id")
                .and_then(Value::as_str)
                .map(|id| format!("https://www.youtube.com/watch?v={}", id))
        })?;

    Some(SearchHit {
        source_ref,
        title: str_field(entry, "title"),
        uploader: str_field(entry, "uploader"),
        duration_seconds: duration_of(entry),
    })
}

/// Search hits from a `-J` dump: the `entries` list, else the top-level object
pub fn hits_from_info(info: &Value) -> Vec<SearchHit> {
    match info.get("entries").and_then(Value::as_array) {
        Some(entries) => entries.iter().filter_map(hit_from_entry).collect(),
        None => hit_from_entry(info).into_iter().collect(),
    }
}

/// yt-dlp backed implementation
pub struct YtDlpTool {
    binary: String,
    search_timeout: Duration,
    probe_timeout: Duration,
    download_timeout: Duration,
}

impl YtDlpTool {
    pub fn new(
        binary: impl Into<String>,
        search_timeout: Duration,
        probe_timeout: Duration,
        download_timeout: Duration,
    ) -> Self {
        Self {
            binary: binary.into(),
            search_timeout,
            probe_timeout,
            download_timeout,
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.binary);
        command.arg("--no-warnings");
        command
    }
}

#[async_trait]
impl MediaTool for YtDlpTool {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>, ToolError> {
        let mut command = self.command();
        command.arg("-J").arg(format!("ytsearch{}:{}", top_k.max(1), query));

        let output = run_tool(TOOL_NAME, command, self.search_timeout).await?;
        let info = parse_json_with_recovery(&output.stdout)?;
        let mut hits = hits_from_info(&info);
        hits.truncate(top_k.max(1));

        tracing::debug!(query = %query, hits = hits.len(), "Media search finished");
        Ok(hits)
    }

    async fn probe_duration(&self, source_ref: &str) -> Result<Option<u32>, ToolError> {
        let mut command = self.command();
        command.arg("-J").arg(source_ref);

        let output = run_tool(TOOL_NAME, command, self.probe_timeout).await?;
        let info = parse_json_with_recovery(&output.stdout)?;
        Ok(duration_of(&info))
    }

    async fn download(&self, source_ref: &str, dest_dir: &Path) -> Result<PathBuf, ToolError> {
        let mut command = self.command();
        command
            .arg("-f")
            .arg("bestaudio")
            .arg("-o")
            .arg("%(id)s.%(ext)s")
            .arg(source_ref)
            .current_dir(dest_dir);

        run_tool(TOOL_NAME, command, self.download_timeout).await?;

        let mut entries = tokio::fs::read_dir(dest_dir).await?;
        let mut downloaded = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let partial = path.extension().is_some_and(|ext| ext == "part");
            if entry.file_type().await?.is_file() && !partial {
                downloaded.push(path);
            }
        }
        downloaded.sort();

        downloaded.into_iter().next().ok_or_else(|| ToolError::EmptyOutput {
            tool: TOOL_NAME.to_string(),
        })
    }
}
