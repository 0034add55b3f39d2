use serde::Deserialize;

/// Marker token introducing the embedded player-response object
const PLAYER_RESPONSE_MARKER: &str = "ytInitialPlayerResponse";

/// Subset of the embedded player response the pipeline cares about
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub captions: Option<Captions>,
    pub video_details: Option<VideoDetails>,
    pub microformat: Option<Microformat>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Captions {
    pub player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TracklistRenderer {
    #[serde(default)]
    pub caption_tracks: Vec<RawCaptionTrack>,
    #[serde(default)]
    pub audio_tracks: Vec<RawAudioTrack>,
}

/// One caption track as advertised by the platform
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCaptionTrack {
    pub language_code: Option<String>,
    pub name: Option<TrackName>,
    pub kind: Option<String>,
    pub base_url: Option<String>,
}

impl RawCaptionTrack {
    /// Auto-generated (speech recognition) tracks carry kind "asr"
    pub fn is_auto(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }

    pub fn display_name(&self) -> Option<String> {
        self.name.as_ref().and_then(TrackName::display)
    }
}

/// Track names arrive either as `simpleText` or as a list of text runs
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackName {
    pub simple_text: Option<String>,
    pub runs: Option<Vec<TextRun>>,
}

impl TrackName {
    pub fn display(&self) -> Option<String> {
        if let Some(simple) = &self.simple_text {
            return Some(simple.trim().to_string());
        }
        self.runs.as_ref().map(|runs| {
            runs.iter()
                .map(|run| run.text.as_str())
                .collect::<String>()
                .trim()
                .to_string()
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextRun {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAudioTrack {
    pub audio_track_type: Option<String>,
    pub caption_track_indices: Option<Vec<i64>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Microformat {
    pub player_microformat_renderer: Option<MicroformatRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MicroformatRenderer {
    pub title: Option<SimpleText>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleText {
    pub simple_text: Option<String>,
}

impl PlayerResponse {
    pub fn caption_tracks(&self) -> &[RawCaptionTrack] {
        self.captions
            .as_ref()
            .and_then(|c| c.player_captions_tracklist_renderer.as_ref())
            .map(|r| r.caption_tracks.as_slice())
            .unwrap_or(&[])
    }

    pub fn audio_tracks(&self) -> &[RawAudioTrack] {
        self.captions
            .as_ref()
            .and_then(|c| c.player_captions_tracklist_renderer.as_ref())
            .map(|r| r.audio_tracks.as_slice())
            .unwrap_or(&[])
    }
}

/// Extract the embedded player-response object from a watch-page HTML blob.
///
/// The object contains nested braces and braces inside string literals, so a
/// regex will not do; this scans for the matching closing brace while
/// tracking string-literal and escape state.
pub fn extract_player_response(html: &str) -> Option<PlayerResponse> {
    let marker_index = html.find(PLAYER_RESPONSE_MARKER)?;
    let brace_offset = html[marker_index..].find('{')?;
    let brace_start = marker_index + brace_offset;

    let bytes = html.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaping = false;

    for i in brace_start..bytes.len() {
        let byte = bytes[i];
        if in_string {
            if escaping {
                escaping = false;
            } else if byte == b'\\' {
                escaping = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    let json_text = &html[brace_start..=i];
                    return serde_json::from_str(json_text).ok();
                }
            }
            _ => {}
        }
    }
    None
}
