use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::{decode_html_entities, SubtitleCue};

static TEXT_ELEMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<text start="([\d.]+)" dur="([\d.]+)".*?>(.*?)</text>"#).unwrap()
});

/// Flat transcript item as returned by transcript-scraping libraries
#[derive(Debug, Deserialize)]
struct FlatCue {
    start: Option<f64>,
    duration: Option<f64>,
    text: Option<String>,
}

/// Timed-text `events` document (the `json3` caption format)
#[derive(Debug, Deserialize)]
struct TimedTextDoc {
    events: Vec<TimedTextEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimedTextEvent {
    t_start_ms: Option<f64>,
    d_duration_ms: Option<f64>,
    segs: Option<Vec<TextSegment>>,
}

#[derive(Debug, Deserialize)]
struct TextSegment {
    utf8: Option<String>,
}

fn format_seconds(value: f64) -> String {
    format!("{:.3}", value)
}

/// Parse legacy timed-text XML into cues.
///
/// Elements that do not match the expected `<text start dur>` shape are
/// skipped rather than failing the whole document.
pub fn parse_timedtext_xml(xml: &str) -> Vec<SubtitleCue> {
    TEXT_ELEMENT_RE
        .captures_iter(xml)
        .filter_map(|caps| {
            let start: f64 = caps[1].parse().ok()?;
            let dur: f64 = caps[2].parse().ok()?;
            Some(SubtitleCue {
                text: decode_html_entities(&caps[3]),
                start: Some(format_seconds(start)),
                end: Some(format_seconds(start + dur)),
            })
        })
        .collect()
}

/// Parse a raw JSON transcript, if the content is one.
///
/// Two shapes are understood: a flat array of `{start, duration, text}`
/// items, and the `{"events": [...]}` document with millisecond offsets and
/// segmented text runs. Returns `None` when the content is not JSON in either
/// shape.
pub fn parse_json_transcript(content: &str) -> Option<Vec<SubtitleCue>> {
    if let Ok(items) = serde_json::from_str::<Vec<FlatCue>>(content) {
        return Some(
            items
                .into_iter()
                .map(|item| {
                    let end = match (item.start, item.duration) {
                        (Some(start), Some(duration)) => Some(format_seconds(start + duration)),
                        _ => None,
                    };
                    SubtitleCue {
                        text: item.text.unwrap_or_default(),
                        start: item.start.map(format_seconds),
                        end,
                    }
                })
                .collect(),
        );
    }

    if let Ok(doc) = serde_json::from_str::<TimedTextDoc>(content) {
        return Some(
            doc.events
                .into_iter()
                .filter_map(|event| {
                    let text: String = event
                        .segs
                        .unwrap_or_default()
                        .into_iter()
                        .filter_map(|seg| seg.utf8)
                        .collect();
                    if text.is_empty() {
                        return None;
                    }
                    let start = event.t_start_ms.map(|ms| ms / 1000.0);
                    let end = match (start, event.d_duration_ms) {
                        (Some(start), Some(ms)) => Some(format_seconds(start + ms / 1000.0)),
                        _ => None,
                    };
                    Some(SubtitleCue {
                        text,
                        start: start.map(format_seconds),
                        end,
                    })
                })
                .collect(),
        );
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timedtext_xml() {
        let xml = concat!(
            r#"<?xml version="1.0" encoding="utf-8"?><transcript>"#,
            r#"<text start="0.08" dur="2.64">Hello &amp; welcome</text>"#,
            r#"<text start="2.72" dur="1.2">second line</text>"#,
            "</transcript>"
        );
        let cues = parse_timedtext_xml(xml);
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text, "Hello & welcome");
        assert_eq!(cues[0].start.as_deref(), Some("0.080"));
        assert_eq!(cues[0].end.as_deref(), Some("2.720"));
        assert_eq!(cues[1].text, "second line");
    }

    #[test]
    fn test_parse_timedtext_xml_skips_malformed_elements() {
        // Missing dur attribute: the element is skipped, not fatal
        let xml = concat!(
            r#"<text start="0.0">no duration</text>"#,
            r#"<text start="1.0" dur="2.0">kept</text>"#
        );
        let cues = parse_timedtext_xml(xml);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "kept");
    }

    #[test]
    fn test_parse_json_transcript_flat_array() {
        let json = r#"[{"start":1.0,"duration":2.5,"text":"one"},{"start":3.5,"duration":1.0,"text":"two"}]"#;
        let cues = parse_json_transcript(json).unwrap();
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text, "one");
        assert_eq!(cues[0].start.as_deref(), Some("1.000"));
        assert_eq!(cues[0].end.as_deref(), Some("3.500"));
    }

    #[test]
    fn test_parse_json_transcript_events() {
        let json = concat!(
            r#"{"events":["#,
            r#"{"tStartMs":0,"dDurationMs":1500,"segs":[{"utf8":"first "},{"utf8":"event"}]},"#,
            r#"{"tStartMs":1500,"dDurationMs":500},"#,
            r#"{"tStartMs":2000,"dDurationMs":1000,"segs":[{"utf8":"last"}]}"#,
            "]}"
        );
        let cues = parse_json_transcript(json).unwrap();
        // The segment-less event produces no text and is dropped
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text, "first event");
        assert_eq!(cues[0].start.as_deref(), Some("0.000"));
        assert_eq!(cues[0].end.as_deref(), Some("1.500"));
        assert_eq!(cues[1].text, "last");
        assert_eq!(cues[1].start.as_deref(), Some("2.000"));
    }

    #[test]
    fn test_parse_json_transcript_rejects_non_json() {
        assert!(parse_json_transcript("WEBVTT\n").is_none());
        assert!(parse_json_transcript("<text start=\"0\">x</text>").is_none());
        assert!(parse_json_transcript("{\"other\":true}").is_none());
    }
}
