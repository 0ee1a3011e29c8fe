//! Tolerant JSON extraction from model output.
//!
//! Chat models frequently wrap their JSON payload in markdown fencing or
//! surrounding prose. This module isolates the recovery logic in one place
//! with a fixed fallback order: direct parse, fenced block, first
//! balanced-brace object, then failure carrying a truncated snippet of the
//! raw text for diagnostics.

use regex::Regex;
use serde_json::Value as JsonValue;
use std::sync::OnceLock;
use thiserror::Error;

/// Maximum characters of raw model output carried in an extraction error.
const SNIPPET_CHARS: usize = 200;

#[derive(Debug, Error, PartialEq)]
pub enum ExtractError {
    #[error("no parseable JSON object in model output: {snippet}")]
    NoJson { snippet: String },
}

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        // ```json ... ``` or bare ``` ... ```; tolerate leading language tags.
        Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)\s*```").expect("fence regex compiles")
    })
}

/// Extracts the first JSON object from free-form model output.
pub fn extract_json(text: &str) -> Result<JsonValue, ExtractError> {
    let trimmed = text.trim();

    // Fast path: the whole response is already JSON.
    if let Ok(value) = serde_json::from_str::<JsonValue>(trimmed)
        && value.is_object()
    {
        return Ok(value);
    }

    // Known fence markers.
    if let Some(captures) = fence_regex().captures(trimmed)
        && let Some(inner) = captures.get(1)
        && let Ok(value) = serde_json::from_str::<JsonValue>(inner.as_str().trim())
        && value.is_object()
    {
        return Ok(value);
    }

    // Scan for the first balanced-brace object in the text.
    if let Some(candidate) = first_balanced_object(trimmed)
        && let Ok(value) = serde_json::from_str::<JsonValue>(candidate)
    {
        return Ok(value);
    }

    Err(ExtractError::NoJson {
        snippet: truncate_chars(trimmed, SNIPPET_CHARS),
    })
}

/// Returns the first substring spanning a balanced `{...}` object, honoring
/// string literals and escapes so braces inside strings do not count.
fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match byte {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Character-safe truncation for diagnostics.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max).collect();
        format!("{}...", truncated)
    }
}
