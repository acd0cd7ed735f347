//! Data models for tunequiz-server
//!
//! - Song candidates and search hits flowing through resolution
//! - Round lifecycle state machine

pub mod round;
pub mod song;

pub use round::{ClipState, Round, RoundError, RoundStatus};
pub use song::{ResolvedSong, SearchHit, SongCandidate};
