//! Parsing model replies.
//!
//! Models asked for JSON still sometimes wrap it in a markdown code fence or
//! add a sentence around it. These helpers recover the payload.

use serde::de::DeserializeOwned;

use crate::{Error, Result};

/// Strip one surrounding markdown code fence (with optional language tag).
pub fn strip_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json", "python", ...) on the opening line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Parse a JSON value out of a reply.
pub fn parse_json<T: DeserializeOwned>(reply: &str) -> Result<T> {
    let body = strip_fences(reply);
    match serde_json::from_str(body) {
        Ok(value) => Ok(value),
        Err(first) => {
            let Some(candidate) = embedded_json(body).or_else(|| embedded_json(reply)) else {
                return Err(Error::Serialization(first));
            };
            Ok(serde_json::from_str(candidate)?)
        }
    }
}

/// The outermost `{...}` or `[...]` span inside surrounding prose.
fn embedded_json(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let close = if text[start..].starts_with('{') { '}' } else { ']' };
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}
