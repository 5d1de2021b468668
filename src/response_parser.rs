//! Best-effort JSON extraction from free-text model output.
//!
//! The upstream model is only *asked* to reply with pure JSON; this module
//! recovers whatever standalone object it actually produced.

use crate::logging::log_debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

// Matching rule: the first non-greedy `{...}` span, with `.` matching
// newlines. This is a heuristic, not a JSON tokenizer: a nested object stops
// at the first `}` and the truncated span then fails to parse, yielding None.
// Accepted approximation; kept isolated here so it can be swapped for a real
// streaming JSON scanner without touching callers.
static JSON_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*?\}").expect("hard-coded pattern compiles"));

/// Return the first parseable `{...}` object in `text`, or `None`.
///
/// "No match" and "match but invalid JSON" are both normal outcomes; this
/// function never fails.
pub fn extract_first_json(text: &str) -> Option<Value> {
    let candidate = JSON_SPAN.find(text)?.as_str();

    match serde_json::from_str::<Value>(candidate) {
        Ok(value) => Some(value),
        Err(e) => {
            log_debug!(
                candidate_length = candidate.len(),
                error = %e,
                "Matched JSON span did not parse"
            );
            None
        }
    }
}
