//! Background clip preparation
//!
//! One task per round: download the best audio stream into
//! `{scratch_dir}/{round_id}`, trim it to `clip.mp3`, then commit the single
//! terminal state through the [`RoundStore`]. Failures are never retried.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tunequiz_common::text;

use super::audio_trimmer::AudioTrimmer;
use super::media_tool::MediaTool;
use super::round_store::RoundStore;
use super::tool_runner::ToolError;

/// File name of the trimmed clip inside a round directory
pub const CLIP_FILE_NAME: &str = "clip.mp3";

/// Clip preparation job
#[derive(Debug, Clone)]
pub struct ClipJob {
    pub round_id: String,
    pub source_ref: String,
    pub clip_length_seconds: u32,
}

/// Spawns and runs clip preparation tasks
#[derive(Clone)]
pub struct ClipPreparer {
    rounds: Arc<RoundStore>,
    media: Arc<dyn MediaTool>,
    trimmer: Arc<dyn AudioTrimmer>,
    scratch_dir: PathBuf,
}

impl ClipPreparer {
    pub fn new(
        rounds: Arc<RoundStore>,
        media: Arc<dyn MediaTool>,
        trimmer: Arc<dyn AudioTrimmer>,
        scratch_dir: PathBuf,
    ) -> Self {
        Self {
            rounds,
            media,
            trimmer,
            scratch_dir,
        }
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Start preparation in the background
    pub fn spawn(&self, job: ClipJob) -> JoinHandle<()> {
        let preparer = self.clone();
        tokio::spawn(async move { preparer.run(job).await })
    }

    /// Prepare the clip and record the outcome
    pub async fn run(&self, job: ClipJob) {
        let started = Instant::now();
        tracing::info!(
            round_id = %job.round_id,
            source_ref = %job.source_ref,
            clip_length = job.clip_length_seconds,
            "Clip preparation started"
        );

        let outcome = match self.prepare(&job).await {
            Ok(clip_path) => {
                tracing::info!(
                    round_id = %job.round_id,
                    clip = %clip_path.display(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Clip ready"
                );
                self.rounds.mark_ready(&job.round_id, clip_path).await
            }
            Err(e) => {
                let detail = text::diagnostic(&e.to_string());
                tracing::warn!(
                    round_id = %job.round_id,
                    error = %detail,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Clip preparation failed"
                );
                self.rounds.mark_failed(&job.round_id, detail).await
            }
        };

        if let Err(e) = outcome {
            tracing::error!(round_id = %job.round_id, error = %e, "Could not record clip outcome");
        }
    }

    async fn prepare(&self, job: &ClipJob) -> Result<PathBuf, ToolError> {
        let round_dir = self.scratch_dir.join(&job.round_id);
        tokio::fs::create_dir_all(&round_dir).await?;

        let raw = self.media.download(&job.source_ref, &round_dir).await?;
        tracing::debug!(round_id = %job.round_id, raw = %raw.display(), "Audio downloaded");

        let clip_path = round_dir.join(CLIP_FILE_NAME);
        self.trimmer
            .trim(&raw, job.clip_length_seconds, &clip_path)
            .await
    }
}
