//! Bounded text helpers
//!
//! External tools and services can produce arbitrarily large output. Anything
//! that ends up in a log line or in a client-visible diagnostic goes through
//! [`truncate`] first.

/// Default bound for logged tool output and client-visible diagnostics
pub const DIAGNOSTIC_LIMIT: usize = 800;

/// Truncate `text` to at most `limit` characters, appending `...` when cut
///
/// Counts characters rather than bytes so multi-byte output (song titles in
/// non-Latin scripts are common) is never split mid-codepoint.
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Truncate to [`DIAGNOSTIC_LIMIT`]
pub fn diagnostic(text: &str) -> String {
    truncate(text, DIAGNOSTIC_LIMIT)
}
