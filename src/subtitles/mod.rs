use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub mod timedtext;
pub mod vtt;

/// One parsed transcript segment.
///
/// Timestamps are kept as opaque strings exactly as they appeared in the
/// source file (or were derived from it) and are omitted from JSON output
/// when the source format did not carry them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleCue {
    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

impl SubtitleCue {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start: None,
            end: None,
        }
    }
}

/// Inline timestamp tags embedded in rolling captions, e.g. `<00:00:01.000>`
static TIMESTAMP_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}:)?\d{2}:\d{2}\.\d{3}$").unwrap());

/// Parse raw subtitle file content in whichever format it arrived.
///
/// Dispatch: a WEBVTT header or a `-->` timestamp arrow means WebVTT; content
/// that parses as JSON is treated as a raw transcript (flat array or the
/// `events` shape); `<text ...>` elements mean timed-text XML; anything else
/// falls back to the VTT parser, which yields nothing for unrecognized input.
pub fn parse_subtitles(content: &str) -> Vec<SubtitleCue> {
    if content.trim().is_empty() {
        return Vec::new();
    }
    if content.trim_start().starts_with("WEBVTT") || content.contains("-->") {
        return vtt::parse_vtt(content);
    }
    if let Some(cues) = timedtext::parse_json_transcript(content) {
        return cues;
    }
    if content.contains("<text") {
        return timedtext::parse_timedtext_xml(content);
    }
    vtt::parse_vtt(content)
}

/// Strip inline markup from one cue's text and decode HTML entities.
///
/// Entities are decoded before tag stripping so that encoded angle brackets
/// (`&lt;3`) are not mistaken for markup. A `<...>` span is removed unless the
/// character after `<` is not a letter, `/` or `!`, in which case the literal
/// `<` is kept; timestamp-style tags are always removed.
pub fn sanitize_transcript_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let decoded: Vec<char> = decode_html_entities(text).chars().collect();
    let mut result = String::with_capacity(decoded.len());
    let mut i = 0;
    while i < decoded.len() {
        let ch = decoded[i];
        if ch != '<' {
            result.push(ch);
            i += 1;
            continue;
        }
        let close = match decoded[i + 1..].iter().position(|&c| c == '>') {
            Some(offset) => i + 1 + offset,
            None => {
                result.push(ch);
                i += 1;
                continue;
            }
        };
        let tag_body: String = decoded[i + 1..close].iter().collect();
        if TIMESTAMP_TAG_RE.is_match(&tag_body) {
            i = close + 1;
            continue;
        }
        match decoded.get(i + 1) {
            Some(&next) if next.is_ascii_alphabetic() || next == '/' || next == '!' => {
                i = close + 1;
            }
            _ => {
                result.push(ch);
                i += 1;
            }
        }
    }
    result.trim().to_string()
}

/// Decode the small fixed set of HTML entities YouTube captions actually use.
///
/// Character scan without backtracking; anything that does not terminate in a
/// `;` within 10 characters is left alone.
pub fn decode_html_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        if ch != '&' {
            result.push(ch);
            i += 1;
            continue;
        }
        let semi = chars[i + 1..].iter().position(|&c| c == ';');
        let semi = match semi {
            Some(offset) if offset + 1 <= 10 => i + 1 + offset,
            _ => {
                result.push(ch);
                i += 1;
                continue;
            }
        };
        let entity: String = chars[i + 1..semi].iter().collect();
        match entity.as_str() {
            "amp" => {
                result.push('&');
                i = semi + 1;
            }
            "quot" => {
                result.push('"');
                i = semi + 1;
            }
            "#39" | "#x27" => {
                result.push('\'');
                i = semi + 1;
            }
            "lt" => {
                result.push('<');
                i = semi + 1;
            }
            "gt" => {
                result.push('>');
                i = semi + 1;
            }
            _ => {
                result.push(ch);
                i += 1;
            }
        }
    }
    result
}
