//! Common error types for TuneQuiz

use thiserror::Error;

/// Common result type for TuneQuiz operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across TuneQuiz crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
