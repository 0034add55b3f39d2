use once_cell::sync::Lazy;
use regex::Regex;

use super::{sanitize_transcript_text, SubtitleCue};

/// Cue timing line, e.g. `00:00:00.000 --> 00:00:02.000 align:start position:0%`
static CUE_TIMING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}:\d{2}:\d{2}\.\d{3})\s-->\s(\d{2}:\d{2}:\d{2}\.\d{3})").unwrap()
});

/// Parse a WebVTT document into sanitized text cues.
///
/// A timing line opens a new cue; subsequent non-blank lines are appended
/// space-joined until a blank line or the next timing line. Cues whose
/// sanitized text is empty are dropped.
pub fn parse_vtt(vtt_text: &str) -> Vec<SubtitleCue> {
    let mut items: Vec<SubtitleCue> = Vec::new();
    let mut current: Option<SubtitleCue> = None;

    for raw_line in vtt_text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            if let Some(cue) = current.take() {
                items.push(cue);
            }
            continue;
        }
        if line == "WEBVTT" {
            continue;
        }

        if let Some(caps) = CUE_TIMING_RE.captures(line) {
            if let Some(cue) = current.take() {
                items.push(cue);
            }
            current = Some(SubtitleCue {
                text: String::new(),
                start: Some(caps[1].to_string()),
                end: Some(caps[2].to_string()),
            });
        } else if let Some(cue) = current.as_mut() {
            if !cue.text.is_empty() {
                cue.text.push(' ');
            }
            cue.text.push_str(line);
        }
    }
    if let Some(cue) = current.take() {
        items.push(cue);
    }

    items
        .into_iter()
        .map(|cue| SubtitleCue {
            text: sanitize_transcript_text(&cue.text),
            start: cue.start,
            end: cue.end,
        })
        .filter(|cue| !cue.text.is_empty())
        .collect()
}
