use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

use crate::cli::SourceKind;
use crate::config::Config;
use crate::language::{self, LanguageOption};
use crate::metadata::MetadataResolver;
use crate::sources::{direct::DirectSource, ytdlp::YtDlpSource, TranscriptSource};
use crate::subtitles::SubtitleCue;
use crate::utils;
use crate::TranscriptError;

/// Successful transcript response
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptResult {
    pub title: String,
    pub segments: Vec<SubtitleCue>,
}

/// Metadata-only response listing a video's caption languages
#[derive(Debug, Clone, Serialize)]
pub struct LanguageSummary {
    #[serde(rename = "defaultLang")]
    pub default_lang: String,
    pub languages: Vec<LanguageOption>,
}

/// Orchestrates one transcript request end to end.
///
/// Built once at startup: the external tool path and the working directory
/// are resolved here and never re-resolved mid-request.
pub struct TranscriptPipeline {
    config: Config,
    resolver: MetadataResolver,
    source: Box<dyn TranscriptSource>,
    // Keeps the fallback working directory alive for the pipeline's lifetime
    _temp_dir: Option<TempDir>,
}

impl TranscriptPipeline {
    pub async fn new(config: Config, source_kind: SourceKind) -> Result<Self> {
        let timeout = Duration::from_secs(config.extraction.metadata_timeout_secs);
        let resolver = MetadataResolver::new(&config.extraction.user_agent, timeout)?;

        let (work_dir, temp_dir) = match &config.app.work_dir {
            Some(dir) => {
                fs_err::create_dir_all(dir)?;
                (fs_err::canonicalize(dir)?, None)
            }
            None => {
                let temp = TempDir::new().context("Failed to create working directory")?;
                (fs_err::canonicalize(temp.path())?, Some(temp))
            }
        };

        let source: Box<dyn TranscriptSource> = match source_kind {
            SourceKind::Ytdlp => {
                let tool_path = resolve_tool_path(&config)?;
                tracing::debug!("Using yt-dlp at: {}", tool_path.display());
                Box::new(YtDlpSource::new(
                    tool_path,
                    work_dir,
                    config.extraction.cookies_file.clone(),
                ))
            }
            SourceKind::Direct => {
                Box::new(DirectSource::new(&config.extraction.user_agent, timeout)?)
            }
        };

        Ok(Self {
            config,
            resolver,
            source,
            _temp_dir: temp_dir,
        })
    }

    /// Fetch a transcript for a video, optionally overriding the caption
    /// language. Input validation happens before any network or process
    /// work.
    pub async fn transcript(
        &self,
        video_id: &str,
        lang: Option<&str>,
    ) -> Result<TranscriptResult> {
        utils::validate_video_id(video_id)?;
        let override_lang = normalize_language_override(lang)?;

        tracing::info!("Fetching transcript for: {}", video_id);

        let metadata = self.resolver.fetch(video_id).await;
        if override_lang.is_none() {
            if let Some(language) = &metadata.caption_language {
                tracing::info!("Auto-selected subtitle language: {}", language);
            }
        }
        let language_spec = effective_language_spec(
            override_lang.as_deref(),
            metadata.caption_language.as_deref(),
            &self.config.extraction.default_languages,
        );

        let segments = self
            .source
            .fetch_transcript(video_id, &language_spec, &metadata)
            .await?;

        Ok(TranscriptResult {
            title: metadata.title,
            segments,
        })
    }

    /// List a video's caption languages without performing extraction
    pub async fn languages(&self, video_id: &str) -> Result<LanguageSummary> {
        utils::validate_video_id(video_id)?;

        let metadata = self.resolver.fetch(video_id).await;
        Ok(LanguageSummary {
            default_lang: metadata.caption_language.clone().unwrap_or_default(),
            languages: language::build_language_options(&metadata.caption_tracks),
        })
    }
}

/// Resolve the external tool once at startup: explicit config path first,
/// then PATH discovery.
fn resolve_tool_path(config: &Config) -> Result<PathBuf> {
    if let Some(path) = &config.extraction.ytdlp_path {
        if path.exists() {
            return Ok(path.clone());
        }
        tracing::warn!("Configured yt-dlp path not found: {}", path.display());
    }

    let names: &[&str] = if cfg!(windows) {
        &["yt-dlp.exe", "yt-dlp"]
    } else {
        &["yt-dlp"]
    };
    utils::find_executable_in_path(names).ok_or_else(|| TranscriptError::ToolUnavailable.into())
}

/// Normalize the caller's language parameter: validated, trimmed, with the
/// literal "auto" (and emptiness) meaning "no override".
fn normalize_language_override(lang: Option<&str>) -> Result<Option<String>> {
    let lang = match lang.map(str::trim) {
        Some(lang) if !lang.is_empty() => lang,
        _ => return Ok(None),
    };
    utils::validate_lang_param(lang)?;
    if lang.eq_ignore_ascii_case("auto") {
        Ok(None)
    } else {
        Ok(Some(lang.to_string()))
    }
}

/// The specifier handed to the acquisition source: explicit override, then
/// the metadata-derived default, then the configured preference list.
fn effective_language_spec(
    override_lang: Option<&str>,
    metadata_lang: Option<&str>,
    default_languages: &str,
) -> String {
    override_lang
        .or(metadata_lang)
        .unwrap_or(default_languages)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_language_override() {
        assert_eq!(normalize_language_override(None).unwrap(), None);
        assert_eq!(normalize_language_override(Some("")).unwrap(), None);
        assert_eq!(normalize_language_override(Some("  ")).unwrap(), None);
        assert_eq!(normalize_language_override(Some("auto")).unwrap(), None);
        assert_eq!(normalize_language_override(Some("AUTO")).unwrap(), None);
        assert_eq!(
            normalize_language_override(Some("de")).unwrap(),
            Some("de".to_string())
        );
        assert_eq!(
            normalize_language_override(Some(" en,en-US ")).unwrap(),
            Some("en,en-US".to_string())
        );
        assert!(normalize_language_override(Some("en us")).is_err());
    }

    #[test]
    fn test_effective_language_spec_precedence() {
        assert_eq!(
            effective_language_spec(Some("de"), Some("fr"), "en,en-US,en-GB"),
            "de"
        );
        assert_eq!(
            effective_language_spec(None, Some("fr"), "en,en-US,en-GB"),
            "fr"
        );
        assert_eq!(
            effective_language_spec(None, None, "en,en-US,en-GB"),
            "en,en-US,en-GB"
        );
    }

    #[test]
    fn test_transcript_result_serializes_to_expected_shape() {
        let result = TranscriptResult {
            title: "T".to_string(),
            segments: vec![SubtitleCue::text_only("hello")],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["title"], "T");
        assert_eq!(json["segments"][0]["text"], "hello");
        assert!(json["segments"][0].get("start").is_none());
    }

    #[test]
    fn test_language_summary_serializes_default_lang_key() {
        let summary = LanguageSummary {
            default_lang: "en".to_string(),
            languages: Vec::new(),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["defaultLang"], "en");
        assert!(json["languages"].as_array().unwrap().is_empty());
    }
}
