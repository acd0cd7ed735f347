//! HTTP API handlers for tunequiz-server

pub mod cache;
pub mod health;
pub mod rounds;

pub use cache::cache_routes;
pub use health::health_routes;
pub use rounds::round_routes;

use crate::error::{ApiError, ApiResult};

/// Required, non-blank query parameter
pub(crate) fn required_param(value: Option<String>, name: &str) -> ApiResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("missing {}", name)))
}
