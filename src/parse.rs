//! Lenient parsing of model output into a title/body pair.
//!
//! Models are asked for bare JSON but routinely wrap it in code fences or
//! surround it with prose. Parsing tries the cheapest interpretation first
//! and degrades to treating the raw text as the post body.

use anyhow::{anyhow, Result};
use serde_json::Value;

/// Parsed post content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleBody {
    pub title: String,
    pub body: String,
}

/// Drops triple-backtick fence lines when the text is wrapped in a fenced
/// block, leaving the fenced content.
fn strip_code_fences(text: &str) -> String {
    let cleaned = text.trim();
    if !cleaned.starts_with("```") {
        return cleaned.to_string();
    }
    cleaned
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Extracts a JSON object from free-form model text.
///
/// Tries a direct parse first; on failure parses the substring between the
/// first `{` and the last `}`.
pub fn parse_json_from_text(text: &str) -> Result<Value> {
    let cleaned = strip_code_fences(text);
    if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
        if value.is_object() {
            return Ok(value);
        }
    }
    if let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}')) {
        if end > start {
            if let Ok(value) = serde_json::from_str::<Value>(&cleaned[start..=end]) {
                if value.is_object() {
                    return Ok(value);
                }
            }
        }
    }
    Err(anyhow!("Could not parse JSON from model response"))
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Reads the `title` and `body` keys, coercing non-string values to text.
pub fn title_body_from_json(value: &Value) -> (String, String) {
    let title = value.get("title").map(value_to_string).unwrap_or_default();
    let body = value.get("body").map(value_to_string).unwrap_or_default();
    (title, body)
}

/// Splits a leading `#` heading off a Markdown body.
///
/// When the first non-blank line is a heading, returns its text (leading
/// `#`s stripped) and the remainder with leading blank lines trimmed.
/// Otherwise returns an empty title and the body unchanged.
pub fn split_leading_heading(body: &str) -> (String, String) {
    let lines: Vec<&str> = body.lines().collect();
    for (idx, line) in lines.iter().enumerate() {
        let stripped = line.trim();
        if stripped.is_empty() {
            continue;
        }
        if let Some(heading) = stripped.strip_prefix('#') {
            let title = heading.trim_start_matches('#').trim().to_string();
            let remaining = lines[idx + 1..].join("\n").trim_start().to_string();
            return (title, remaining);
        }
        break;
    }
    (String::new(), body.to_string())
}

/// Full fallback chain from raw model text to a usable title/body pair.
///
/// JSON parse failure degrades to raw-text-as-body; a missing title is
/// derived from a leading heading; a body still opening with `#` has that
/// heading stripped; the last resort title is `Daily Post <date>`.
pub fn resolve_title_body(raw: &str, date_label: &str) -> TitleBody {
    let (mut title, mut body) = match parse_json_from_text(raw) {
        Ok(value) => title_body_from_json(&value),
        Err(_) => (String::new(), raw.trim().to_string()),
    };
    if body.is_empty() {
        body = raw.trim().to_string();
    }
    if title.is_empty() {
        let (derived, rest) = split_leading_heading(&body);
        title = derived;
        body = rest;
    }
    if body.trim_start().starts_with('#') {
        let (_, rest) = split_leading_heading(&body);
        body = rest;
    }
    if title.is_empty() {
        title = format!("Daily Post {date_label}");
    }
    TitleBody { title, body }
}
