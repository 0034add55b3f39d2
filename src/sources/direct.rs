use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::TranscriptSource;
use crate::metadata::{CaptionTrack, VideoMetadata};
use crate::subtitles::{parse_subtitles, SubtitleCue};
use crate::utils::validate_and_normalize_url;
use crate::{Result, TranscriptError};

/// Transcript acquisition without the external tool: fetch a caption
/// track's timed-text URL straight from the player response.
///
/// Less capable than yt-dlp (no fallback language list, no cookies) but
/// useful when the tool is not installed.
pub struct DirectSource {
    client: Client,
    timeout: Duration,
}

impl DirectSource {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl TranscriptSource for DirectSource {
    async fn fetch_transcript(
        &self,
        _video_id: &str,
        language_spec: &str,
        metadata: &VideoMetadata,
    ) -> Result<Vec<SubtitleCue>> {
        let track = choose_track(&metadata.caption_tracks, language_spec)
            .ok_or(TranscriptError::NoCaptionTrack)?;
        let base_url = track
            .base_url
            .as_deref()
            .ok_or(TranscriptError::NoCaptionTrack)?;
        let url = validate_and_normalize_url(base_url)?;

        tracing::debug!("Fetching timed text for {} from track {}", track.code, url);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .context("Failed to fetch timed text")?;
        if !response.status().is_success() {
            anyhow::bail!("Timed-text request failed: HTTP {}", response.status());
        }
        let body = response.text().await.context("Failed to read timed text")?;

        let cues = parse_subtitles(&body);
        if cues.is_empty() {
            return Err(TranscriptError::NoReadableTranscript.into());
        }
        Ok(cues)
    }

    fn source_name(&self) -> &'static str {
        "direct"
    }
}

/// Choose which caption track to fetch: the first code of the requested
/// specifier that matches, then an English track, then the first track.
fn choose_track<'a>(tracks: &'a [CaptionTrack], language_spec: &str) -> Option<&'a CaptionTrack> {
    for code in language_spec.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        if let Some(track) = tracks.iter().find(|t| t.code.eq_ignore_ascii_case(code)) {
            return Some(track);
        }
    }
    tracks
        .iter()
        .find(|t| t.code == "en" || t.code.starts_with("en-"))
        .or_else(|| tracks.first())
}
