//! Round lifecycle state machine
//!
//! A round is created already carrying its resolved song, in `Pending`.
//! Clip preparation moves it exactly once to `Ready` or `Failed`:
//!
//! ```text
//! PENDING ──► READY  (clip on disk)
//!    └──────► FAILED (bounded diagnostic)
//! ```
//!
//! The clip location and the error detail live inside the terminal variants,
//! so "clip set iff ready" and "error set iff failed" hold by construction.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Round lookup and transition errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoundError {
    #[error("round not found: {0}")]
    NotFound(String),

    #[error("round {0} already finished")]
    AlreadyTerminal(String),

    #[error("round {0} can only move to a terminal state")]
    InvalidTransition(String),
}

/// Clip preparation state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipState {
    /// Preparation in flight
    Pending,
    /// Clip prepared at the given path
    Ready { clip_path: PathBuf },
    /// Preparation failed; detail is already truncated
    Failed { detail: String },
}

impl ClipState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ClipState::Pending)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClipState::Pending => "PENDING",
            ClipState::Ready { .. } => "READY",
            ClipState::Failed { .. } => "FAILED",
        }
    }
}

/// One play instance
#[derive(Debug, Clone)]
pub struct Round {
    pub id: String,
    pub title: String,
    pub artist: String,
    /// Resolved media page URL
    pub source_ref: String,
    pub clip_length_seconds: u32,
    state: ClipState,
    pub created_at: DateTime<Utc>,
    /// Set when a terminal state is reached
    pub finished_at: Option<DateTime<Utc>>,
}

impl Round {
    pub fn new(
        id: String,
        title: String,
        artist: String,
        source_ref: String,
        clip_length_seconds: u32,
    ) -> Self {
        Self {
            id,
            title,
            artist,
            source_ref,
            clip_length_seconds,
            state: ClipState::Pending,
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn state(&self) -> &ClipState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ClipState::Ready { .. })
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn clip_path(&self) -> Option<&Path> {
        match &self.state {
            ClipState::Ready { clip_path } => Some(clip_path),
            _ => None,
        }
    }

    pub fn error_detail(&self) -> Option<&str> {
        match &self.state {
            ClipState::Failed { detail } => Some(detail),
            _ => None,
        }
    }

    /// Move from `Pending` to a terminal state
    ///
    /// Rejects a second transition and leaves the round untouched.
    pub fn finish(&mut self, terminal: ClipState) -> Result<(), RoundError> {
        if self.state.is_terminal() {
            return Err(RoundError::AlreadyTerminal(self.id.clone()));
        }
        if !terminal.is_terminal() {
            return Err(RoundError::InvalidTransition(self.id.clone()));
        }
        self.state = terminal;
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    pub fn status(&self) -> RoundStatus {
        RoundStatus {
            ready: self.is_ready(),
            error: self.error_detail().map(str::to_string),
        }
    }
}

/// Polling view of a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundStatus {
    pub ready: bool,
    pub error: Option<String>,
}
