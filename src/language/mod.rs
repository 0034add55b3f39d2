use serde::{Deserialize, Serialize};

use crate::metadata::player::{RawAudioTrack, RawCaptionTrack};
use crate::metadata::CaptionTrack;

const DEFAULT_AUDIO_TRACK_TYPE: &str = "AUDIO_TRACK_TYPE_DEFAULT";

/// One selectable caption language, deduplicated across manual/auto variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageOption {
    pub code: String,
    pub name: String,
    #[serde(rename = "isAuto")]
    pub is_auto: bool,
}

/// Pick the default caption language for a video.
///
/// Precedence: the default (or first) audio track's referenced caption
/// tracks, preferring a manually-authored one and falling back to the first
/// referenced index; then the first manual track in the full list; then the
/// first track of any kind. `None` when the video has no caption tracks —
/// the caller falls back to its configured preference list.
pub fn pick_caption_language(
    tracks: &[RawCaptionTrack],
    audio_tracks: &[RawAudioTrack],
) -> Option<String> {
    if tracks.is_empty() {
        return None;
    }

    let default_audio = audio_tracks
        .iter()
        .find(|track| track.audio_track_type.as_deref() == Some(DEFAULT_AUDIO_TRACK_TYPE))
        .or_else(|| audio_tracks.first());

    if let Some(indices) = default_audio.and_then(|audio| audio.caption_track_indices.as_ref()) {
        for &index in indices {
            if let Some(track) = usize::try_from(index).ok().and_then(|i| tracks.get(i)) {
                if !track.is_auto() {
                    return track.language_code.clone();
                }
            }
        }
        if let Some(track) = indices
            .first()
            .and_then(|&index| usize::try_from(index).ok())
            .and_then(|i| tracks.get(i))
        {
            return track.language_code.clone();
        }
    }

    if let Some(manual) = tracks.iter().find(|track| !track.is_auto()) {
        return manual.language_code.clone();
    }
    tracks.first().and_then(|track| track.language_code.clone())
}

/// Build the deduplicated language list exposed for selection UIs.
///
/// Tracks sharing a code are merged with the manual entry winning; entries
/// are sorted by display name.
pub fn build_language_options(caption_tracks: &[CaptionTrack]) -> Vec<LanguageOption> {
    let mut options: Vec<LanguageOption> = Vec::new();

    for track in caption_tracks {
        if track.code.is_empty() {
            continue;
        }
        match options.iter_mut().find(|option| option.code == track.code) {
            Some(existing) => {
                if existing.is_auto && !track.is_auto {
                    existing.is_auto = false;
                    if let Some(name) = track.name.as_deref().filter(|name| !name.is_empty()) {
                        existing.name = name.to_string();
                    }
                }
            }
            None => options.push(LanguageOption {
                code: track.code.clone(),
                name: track
                    .name
                    .clone()
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| track.code.clone()),
                is_auto: track.is_auto,
            }),
        }
    }

    options.sort_by(|a, b| a.name.cmp(&b.name));
    options
}
