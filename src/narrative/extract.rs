//! @acp:module "Narrative Extraction"
//! @acp:summary "Pull the section JSON object out of a generator response"
//! @acp:domain subsidy
//! @acp:layer logic
//!
//! Two stages: a fenced code block wins if present; otherwise the first
//! complete top-level JSON object found by a string-aware brace scan. A
//! response that fails to parse yields an empty mapping, never an error.

use std::sync::LazyLock;

use regex::Regex;

use super::NarrativeSections;

/// Fenced code block, optionally tagged json; group 1 is the body
static FENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?[ \t]*\r?\n?(.*?)\r?\n?\s*```").unwrap()
});

/// Extract recognized sections from a generator response
pub fn parse_json_response(response: &str) -> NarrativeSections {
    let candidate = match FENCE_PATTERN.captures(response) {
        Some(caps) => caps.get(1).map(|m| m.as_str()),
        None => find_json_object(response),
    };

    let Some(json) = candidate else {
        tracing::warn!("No JSON object found in narrative response");
        return NarrativeSections::new();
    };

    match serde_json::from_str::<serde_json::Value>(json.trim()) {
        Ok(serde_json::Value::Object(object)) => NarrativeSections::from_json_object(&object),
        Ok(_) => {
            tracing::warn!("Narrative response JSON is not an object");
            NarrativeSections::new()
        }
        Err(e) => {
            tracing::warn!("Failed to parse narrative response JSON: {}", e);
            NarrativeSections::new()
        }
    }
}

/// First balanced `{...}` span, ignoring braces inside JSON strings
pub fn find_json_object(text: &str) -> Option<&str> {
    let mut start = None;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if start.is_none() {
            if ch == '{' {
                start = Some(i);
                depth = 1;
            }
            continue;
        }

        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let begin = start?;
                    return Some(&text[begin..=i]);
                }
            }
            _ => {}
        }
    }

    None
}
