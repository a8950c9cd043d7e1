use autopost::llm::{extension_for_mime, text_from_gemini, text_from_openai};
use autopost::parse::{
    parse_json_from_text, resolve_title_body, split_leading_heading, title_body_from_json,
};
use serde_json::json;

#[test]
fn fenced_json_is_extracted_exactly() {
    let raw = "```json\n{\"title\": \"My Post\", \"body\": \"First paragraph.\"}\n```";
    let value = parse_json_from_text(raw).expect("should parse");
    let (title, body) = title_body_from_json(&value);
    assert_eq!(title, "My Post");
    assert_eq!(body, "First paragraph.");
}

#[test]
fn json_embedded_in_prose_is_extracted() {
    let raw = "Sure! Here is the post:\n{\"title\": \"T\", \"body\": \"B\"}\nHope that helps.";
    let value = parse_json_from_text(raw).expect("should parse");
    let (title, body) = title_body_from_json(&value);
    assert_eq!(title, "T");
    assert_eq!(body, "B");
}

#[test]
fn plain_prose_is_a_parse_error() {
    assert!(parse_json_from_text("Just some text without braces.").is_err());
    assert!(parse_json_from_text("mismatched } then {").is_err());
}

#[test]
fn leading_heading_splits_into_title_and_trimmed_body() {
    let (title, body) = split_leading_heading("\n\n## The Heading\n\n\nRest of it.\nMore.");
    assert_eq!(title, "The Heading");
    assert_eq!(body, "Rest of it.\nMore.");
}

#[test]
fn body_without_heading_is_unchanged() {
    let (title, body) = split_leading_heading("Plain first line.\n# Not a leading heading");
    assert_eq!(title, "");
    assert_eq!(body, "Plain first line.\n# Not a leading heading");
}

#[test]
fn resolve_uses_json_when_available() {
    let raw = "{\"title\": \"From JSON\", \"body\": \"Markdown body.\"}";
    let parsed = resolve_title_body(raw, "2026-08-29");
    assert_eq!(parsed.title, "From JSON");
    assert_eq!(parsed.body, "Markdown body.");
}

#[test]
fn resolve_degrades_to_heading_extraction() {
    let raw = "# Fallback Title\n\nThe actual body.";
    let parsed = resolve_title_body(raw, "2026-08-29");
    assert_eq!(parsed.title, "Fallback Title");
    assert_eq!(parsed.body, "The actual body.");
}

#[test]
fn resolve_strips_stray_h1_from_json_body() {
    let raw = "{\"title\": \"Given\", \"body\": \"# Duplicate\\n\\nReal body.\"}";
    let parsed = resolve_title_body(raw, "2026-08-29");
    assert_eq!(parsed.title, "Given");
    assert_eq!(parsed.body, "Real body.");
}

#[test]
fn resolve_falls_back_to_dated_title() {
    let parsed = resolve_title_body("No heading, no JSON here.", "2026-08-29");
    assert_eq!(parsed.title, "Daily Post 2026-08-29");
    assert_eq!(parsed.body, "No heading, no JSON here.");
}

#[test]
fn gemini_text_concatenates_candidate_parts() {
    let payload = json!({
        "candidates": [{
            "content": { "parts": [
                { "text": "chunk one" },
                { "inlineData": { "mimeType": "image/png", "data": "aaaa" } },
                { "text": "chunk two" }
            ]}
        }]
    });
    assert_eq!(text_from_gemini(&payload), "chunk one\nchunk two");
    assert_eq!(text_from_gemini(&json!({ "candidates": [] })), "");
}

#[test]
fn openai_text_prefers_output_text_field() {
    let payload = json!({ "output_text": "  the reply  " });
    assert_eq!(text_from_openai(&payload), "the reply");

    let nested = json!({
        "output": [{
            "type": "message",
            "content": [
                { "type": "output_text", "text": "nested reply" }
            ]
        }]
    });
    assert_eq!(text_from_openai(&nested), "nested reply");
    assert_eq!(text_from_openai(&json!({})), "");
}

#[test]
fn mime_types_map_to_extensions() {
    assert_eq!(extension_for_mime("image/jpeg"), "jpg");
    assert_eq!(extension_for_mime("image/webp"), "webp");
    assert_eq!(extension_for_mime("image/png"), "png");
    assert_eq!(extension_for_mime("application/octet-stream"), "png");
}
