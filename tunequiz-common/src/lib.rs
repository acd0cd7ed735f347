//! # TuneQuiz Common Library
//!
//! Shared code for the TuneQuiz services:
//! - Error type used by configuration loading
//! - Bootstrap TOML configuration and config file discovery
//! - Bounded text helpers for logging and diagnostics

pub mod config;
pub mod error;
pub mod text;

pub use error::{Error, Result};
