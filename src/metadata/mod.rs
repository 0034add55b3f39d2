use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;

use crate::language;
use crate::subtitles::decode_html_entities;
use crate::utils::watch_url;

pub mod player;

use player::{extract_player_response, PlayerResponse};

/// Title used when the watch page cannot be fetched or parsed
pub const FALLBACK_TITLE: &str = "YouTube Video";

static HTML_TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<title>(.*?)</title>").unwrap());

static TITLE_SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*-\s*YouTube\s*$").unwrap());

/// Metadata derived from a video's watch page
#[derive(Debug, Clone)]
pub struct VideoMetadata {
    pub title: String,
    pub caption_language: Option<String>,
    pub caption_tracks: Vec<CaptionTrack>,
}

impl VideoMetadata {
    /// Metadata is an enhancement, not a requirement; this is what callers
    /// get when the watch page is unreachable.
    pub fn fallback() -> Self {
        Self {
            title: FALLBACK_TITLE.to_string(),
            caption_language: None,
            caption_tracks: Vec::new(),
        }
    }
}

/// One available subtitle track
#[derive(Debug, Clone)]
pub struct CaptionTrack {
    pub code: String,
    pub name: Option<String>,
    pub is_auto: bool,
    /// Raw timed-text URL, used by the direct fetch source
    pub base_url: Option<String>,
}

/// Fetches watch pages and derives title and caption track info.
///
/// Never fails hard: any network, status, timeout or parse problem yields
/// the fallback metadata.
pub struct MetadataResolver {
    client: Client,
    timeout: Duration,
}

impl MetadataResolver {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, timeout })
    }

    pub async fn fetch(&self, video_id: &str) -> VideoMetadata {
        let url = watch_url(video_id);
        tracing::debug!("Fetching metadata from: {}", url);

        let response = match self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Metadata request failed: {}", e);
                return VideoMetadata::fallback();
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Metadata request returned HTTP {}", response.status());
            return VideoMetadata::fallback();
        }

        match response.text().await {
            Ok(html) => metadata_from_html(&html),
            Err(e) => {
                tracing::debug!("Metadata body read failed: {}", e);
                VideoMetadata::fallback()
            }
        }
    }
}

/// Derive metadata from raw watch-page HTML
pub fn metadata_from_html(html: &str) -> VideoMetadata {
    let player_response = extract_player_response(html);

    let (caption_language, caption_tracks) = match &player_response {
        Some(response) => {
            let raw_tracks = response.caption_tracks();
            let language =
                language::pick_caption_language(raw_tracks, response.audio_tracks());
            (language, extract_caption_tracks(raw_tracks))
        }
        None => (None, Vec::new()),
    };

    let title = preferred_title(player_response.as_ref(), html)
        .unwrap_or_else(|| FALLBACK_TITLE.to_string());

    VideoMetadata {
        title,
        caption_language,
        caption_tracks,
    }
}

/// Title preference: structured video details, then microformat, then the
/// HTML `<title>` tag (entity-decoded). A trailing " - YouTube" is stripped.
fn preferred_title(player_response: Option<&PlayerResponse>, html: &str) -> Option<String> {
    let html_title = HTML_TITLE_RE
        .captures(html)
        .map(|caps| decode_html_entities(&caps[1]));

    let details_title = player_response.and_then(|response| {
        response
            .video_details
            .as_ref()
            .and_then(|details| details.title.clone())
    });
    let microformat_title = player_response.and_then(|response| {
        response
            .microformat
            .as_ref()
            .and_then(|m| m.player_microformat_renderer.as_ref())
            .and_then(|r| r.title.as_ref())
            .and_then(|t| t.simple_text.clone())
    });

    for candidate in [details_title, microformat_title, html_title]
        .into_iter()
        .flatten()
    {
        let trimmed = candidate.trim();
        if !trimmed.is_empty() {
            return Some(TITLE_SUFFIX_RE.replace(trimmed, "").to_string());
        }
    }
    None
}

fn extract_caption_tracks(raw_tracks: &[player::RawCaptionTrack]) -> Vec<CaptionTrack> {
    raw_tracks
        .iter()
        .filter_map(|track| {
            let code = track.language_code.clone()?;
            Some(CaptionTrack {
                code,
                name: track.display_name(),
                is_auto: track.is_auto(),
                base_url: track.base_url.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(player_json: &str, html_title: &str) -> String {
        format!(
            "<html><head><title>{}</title></head><body><script>var ytInitialPlayerResponse = {};</script></body></html>",
            html_title, player_json
        )
    }

    #[test]
    fn test_title_prefers_video_details() {
        let html = page(
            r#"{"videoDetails":{"title":"Real Title"},"microformat":{"playerMicroformatRenderer":{"title":{"simpleText":"Micro Title"}}}}"#,
            "Html Title - YouTube",
        );
        assert_eq!(metadata_from_html(&html).title, "Real Title");
    }

    #[test]
    fn test_title_falls_back_to_microformat() {
        let html = page(
            r#"{"microformat":{"playerMicroformatRenderer":{"title":{"simpleText":"Micro Title"}}}}"#,
            "Html Title",
        );
        assert_eq!(metadata_from_html(&html).title, "Micro Title");
    }

    #[test]
    fn test_title_falls_back_to_html_title_with_entities() {
        let html = "<html><title>Cats &amp; Dogs - YouTube</title></html>";
        assert_eq!(metadata_from_html(html).title, "Cats & Dogs");
    }

    #[test]
    fn test_title_fallback_when_nothing_found() {
        assert_eq!(metadata_from_html("<html></html>").title, FALLBACK_TITLE);
        assert_eq!(
            metadata_from_html("<html><title>   </title></html>").title,
            FALLBACK_TITLE
        );
    }

    #[test]
    fn test_strips_youtube_suffix_from_structured_title() {
        let html = page(r#"{"videoDetails":{"title":"My Video - YouTube"}}"#, "x");
        assert_eq!(metadata_from_html(&html).title, "My Video");
    }

    #[test]
    fn test_caption_tracks_and_language() {
        let html = page(
            concat!(
                r#"{"videoDetails":{"title":"T"},"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":["#,
                r#"{"languageCode":"en","kind":"asr","name":{"simpleText":"English (auto-generated)"}},"#,
                r#"{"languageCode":"de","name":{"simpleText":"German"}}]}}}"#
            ),
            "x",
        );
        let metadata = metadata_from_html(&html);
        assert_eq!(metadata.caption_tracks.len(), 2);
        assert!(metadata.caption_tracks[0].is_auto);
        assert_eq!(metadata.caption_tracks[1].code, "de");
        // Manual track preferred for the default language
        assert_eq!(metadata.caption_language.as_deref(), Some("de"));
    }

    #[test]
    fn test_no_captions_yields_usable_fallback() {
        let html = page(r#"{"videoDetails":{"title":"T"}}"#, "x");
        let metadata = metadata_from_html(&html);
        assert_eq!(metadata.title, "T");
        assert!(metadata.caption_language.is_none());
        assert!(metadata.caption_tracks.is_empty());
    }
}
