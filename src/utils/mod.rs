use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use url::Url;

use crate::TranscriptError;

static VIDEO_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").unwrap());

static LANG_PARAM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9,-]+$").unwrap());

/// Validate an 11-character YouTube video identifier.
///
/// Rejected requests must fail here before any network or filesystem work.
pub fn validate_video_id(video_id: &str) -> Result<()> {
    if VIDEO_ID_RE.is_match(video_id) {
        Ok(())
    } else {
        Err(TranscriptError::InvalidVideoId.into())
    }
}

/// Validate a caller-supplied language parameter (codes, commas, hyphens).
pub fn validate_lang_param(lang: &str) -> Result<()> {
    if LANG_PARAM_RE.is_match(lang) {
        Ok(())
    } else {
        Err(TranscriptError::InvalidLanguage.into())
    }
}

/// Canonical watch page URL for a video id
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Validate a URL and return normalized version
pub fn validate_and_normalize_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url)
        .map_err(|_| anyhow::anyhow!("Invalid URL format: {}", url))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("URL must use HTTP or HTTPS protocol");
    }

    Ok(parsed.to_string())
}

/// Locate the first matching executable name in PATH
pub fn find_executable_in_path(names: &[&str]) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for entry in std::env::split_paths(&path_var) {
        for name in names {
            let candidate = entry.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

/// Check if the current environment has required tools
pub async fn check_dependencies() -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available("yt-dlp").await {
        missing.push("yt-dlp - required for subtitle extraction".to_string());
    }

    missing
}

/// Check if a command is available in PATH
pub async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
