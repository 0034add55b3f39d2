use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use super::{InvocationHandle, TranscriptSource};
use crate::metadata::VideoMetadata;
use crate::subtitles::{parse_subtitles, SubtitleCue};
use crate::utils::watch_url;
use crate::{Result, TranscriptError};

const ERROR_DETAIL_LIMIT: usize = 200;
const SUBTITLE_EXTENSION: &str = ".vtt";

/// Transcript acquisition by shelling out to yt-dlp.
///
/// The tool is asked to skip the media download and write both manual and
/// auto-generated subtitles as VTT under the invocation's unique base name;
/// the richest resulting file wins.
pub struct YtDlpSource {
    tool_path: PathBuf,
    work_dir: PathBuf,
    cookies_file: Option<PathBuf>,
}

impl YtDlpSource {
    pub fn new(tool_path: PathBuf, work_dir: PathBuf, cookies_file: Option<PathBuf>) -> Self {
        Self {
            tool_path,
            work_dir,
            cookies_file,
        }
    }

    fn build_args(&self, handle: &InvocationHandle, language_spec: &str, url: &str) -> Vec<String> {
        let mut args = vec![
            "--skip-download".to_string(),
            "--write-subs".to_string(),
            "--write-auto-subs".to_string(),
            "--sub-lang".to_string(),
            language_spec.to_string(),
            "--sub-format".to_string(),
            "vtt".to_string(),
        ];

        if let Some(cookies) = &self.cookies_file {
            if cookies.exists() {
                args.push("--cookies".to_string());
                args.push(cookies.to_string_lossy().into_owned());
            } else {
                tracing::warn!("Configured cookies file not found: {}", cookies.display());
            }
        }

        args.push("--output".to_string());
        args.push(handle.base_path().to_string_lossy().into_owned());
        args.push(url.to_string());
        args
    }
}

#[async_trait]
impl TranscriptSource for YtDlpSource {
    async fn fetch_transcript(
        &self,
        video_id: &str,
        language_spec: &str,
        _metadata: &VideoMetadata,
    ) -> Result<Vec<SubtitleCue>> {
        // Owns every file the tool writes; dropped (and cleaned up) on every
        // exit path, including caller cancellation.
        let handle = InvocationHandle::new(&self.work_dir, video_id);
        let url = watch_url(video_id);
        let args = self.build_args(&handle, language_spec, &url);

        tracing::debug!(
            "Invoking {} for {} (langs: {})",
            self.tool_path.display(),
            video_id,
            language_spec
        );

        let output = Command::new(&self.tool_path)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .context("Failed to run yt-dlp")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!("[yt-dlp] {}", stderr.trim());
            return Err(extraction_error(&stderr).into());
        }

        select_best_candidate(handle.dir(), handle.prefix())
    }

    fn source_name(&self) -> &'static str {
        "yt-dlp"
    }
}

/// Map a failed invocation's stderr to the caller-visible error.
///
/// yt-dlp prints diagnostics as `ERROR: <detail>` lines; the first one wins,
/// truncated to 200 characters. Without such a line the raw output is used.
fn extraction_error(stderr: &str) -> TranscriptError {
    let detail = stderr
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("ERROR:"))
        .map(|line| line.trim_start_matches("ERROR:").trim_start().to_string())
        .unwrap_or_else(|| stderr.trim().to_string());

    let truncated: String = detail.chars().take(ERROR_DETAIL_LIMIT).collect();
    if truncated.is_empty() {
        TranscriptError::ExtractionFailed(String::new())
    } else {
        TranscriptError::ExtractionFailed(format!(" {}", truncated))
    }
}

/// Find and parse the best subtitle file for one invocation.
///
/// The tool may emit several language variants per run; each candidate is
/// parsed and scored by total cue-text length, ties broken by filename so
/// selection is deterministic. Candidates that cannot be read are skipped.
fn select_best_candidate(dir: &Path, prefix: &str) -> Result<Vec<SubtitleCue>> {
    let entries = fs_err::read_dir(dir).context("Failed to list working directory")?;

    let mut file_names: Vec<String> = entries
        .flatten()
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.starts_with(prefix) && name.ends_with(SUBTITLE_EXTENSION))
        .collect();
    file_names.sort();

    if file_names.is_empty() {
        return Err(TranscriptError::NoTranscript.into());
    }

    let mut best: Option<(usize, String, Vec<SubtitleCue>)> = None;
    for name in file_names {
        let content = match fs_err::read_to_string(dir.join(&name)) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!("Skipping unreadable candidate {}: {}", name, e);
                continue;
            }
        };
        let parsed = parse_subtitles(&content);
        let score: usize = parsed.iter().map(|cue| cue.text.chars().count()).sum();
        let better = match &best {
            Some((best_score, _, _)) => score > *best_score,
            None => true,
        };
        if better {
            best = Some((score, name, parsed));
        }
    }

    match best {
        Some((_, name, cues)) => {
            tracing::info!("Reading subtitle file: {}", name);
            Ok(cues)
        }
        None => Err(TranscriptError::NoReadableTranscript.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vtt_with_text(text: &str) -> String {
        format!("WEBVTT\n\n00:00:00.000 --> 00:00:02.000\n{}\n", text)
    }

    #[test]
    fn test_build_args_flags_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let source = YtDlpSource::new(PathBuf::from("yt-dlp"), dir.path().to_path_buf(), None);
        let handle = InvocationHandle::new(dir.path(), "dQw4w9WgXcQ");
        let args = source.build_args(&handle, "en,en-US", "https://www.youtube.com/watch?v=dQw4w9WgXcQ");

        assert_eq!(args[0], "--skip-download");
        assert!(args.contains(&"--write-subs".to_string()));
        assert!(args.contains(&"--write-auto-subs".to_string()));
        let lang_index = args.iter().position(|a| a == "--sub-lang").unwrap();
        assert_eq!(args[lang_index + 1], "en,en-US");
        let format_index = args.iter().position(|a| a == "--sub-format").unwrap();
        assert_eq!(args[format_index + 1], "vtt");
        let output_index = args.iter().position(|a| a == "--output").unwrap();
        assert!(args[output_index + 1].contains(handle.prefix()));
        assert_eq!(args.last().unwrap(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }

    #[test]
    fn test_build_args_cookies_only_when_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let handle = InvocationHandle::new(dir.path(), "dQw4w9WgXcQ");

        let missing = YtDlpSource::new(
            PathBuf::from("yt-dlp"),
            dir.path().to_path_buf(),
            Some(dir.path().join("nope.txt")),
        );
        let args = missing.build_args(&handle, "en", "url");
        assert!(!args.contains(&"--cookies".to_string()));

        let cookies = dir.path().join("cookies.txt");
        fs_err::write(&cookies, "# Netscape HTTP Cookie File\n").unwrap();
        let present = YtDlpSource::new(
            PathBuf::from("yt-dlp"),
            dir.path().to_path_buf(),
            Some(cookies.clone()),
        );
        let args = present.build_args(&handle, "en", "url");
        let cookie_index = args.iter().position(|a| a == "--cookies").unwrap();
        assert_eq!(args[cookie_index + 1], cookies.to_string_lossy());
        // Cookies come before the output template, like the tool expects
        assert!(cookie_index < args.iter().position(|a| a == "--output").unwrap());
    }

    #[test]
    fn test_extraction_error_prefers_error_line() {
        let stderr = "WARNING: something\nERROR: Video unavailable\nmore noise\n";
        let err = extraction_error(stderr);
        assert_eq!(
            err.to_string(),
            "Subtitle download failed. Video unavailable"
        );
    }

    #[test]
    fn test_extraction_error_truncates_detail() {
        let detail = "x".repeat(250);
        let err = extraction_error(&format!("ERROR: {}", detail));
        let message = err.to_string();
        assert!(message.ends_with(&"x".repeat(200)));
        assert_eq!(message.len(), "Subtitle download failed. ".len() + 200);
    }

    #[test]
    fn test_extraction_error_falls_back_to_raw_stderr() {
        let err = extraction_error("  segmentation fault  \n");
        assert_eq!(
            err.to_string(),
            "Subtitle download failed. segmentation fault"
        );
        let err = extraction_error("");
        assert_eq!(err.to_string(), "Subtitle download failed.");
    }

    #[test]
    fn test_select_best_candidate_richest_wins() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = "temp_dQw4w9WgXcQ_1700000000000_abc123";
        fs_err::write(
            dir.path().join(format!("{}.en.vtt", prefix)),
            vtt_with_text("short"),
        )
        .unwrap();
        fs_err::write(
            dir.path().join(format!("{}.es.vtt", prefix)),
            vtt_with_text("a much longer transcript body"),
        )
        .unwrap();

        let cues = select_best_candidate(dir.path(), prefix).unwrap();
        assert_eq!(cues[0].text, "a much longer transcript body");
    }

    #[test]
    fn test_select_best_candidate_tie_breaks_lexically() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = "temp_dQw4w9WgXcQ_1700000000000_abc123";
        fs_err::write(
            dir.path().join(format!("{}.en-US.vtt", prefix)),
            vtt_with_text("same length"),
        )
        .unwrap();
        fs_err::write(
            dir.path().join(format!("{}.en-GB.vtt", prefix)),
            vtt_with_text("same length"),
        )
        .unwrap();

        // Both parse to identical text; en-GB sorts before en-US
        let cues = select_best_candidate(dir.path(), prefix).unwrap();
        assert_eq!(cues[0].text, "same length");
    }

    #[test]
    fn test_select_best_candidate_ignores_other_prefixes() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = "temp_dQw4w9WgXcQ_1700000000000_abc123";
        fs_err::write(
            dir.path().join("temp_otherVideo_1_zzzzzz.en.vtt"),
            vtt_with_text("not ours"),
        )
        .unwrap();

        let err = select_best_candidate(dir.path(), prefix).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TranscriptError>(),
            Some(TranscriptError::NoTranscript)
        ));
    }

    #[test]
    fn test_select_best_candidate_all_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = "temp_dQw4w9WgXcQ_1700000000000_abc123";
        // A directory masquerading as a candidate cannot be read as a file
        fs_err::create_dir(dir.path().join(format!("{}.en.vtt", prefix))).unwrap();

        let err = select_best_candidate(dir.path(), prefix).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TranscriptError>(),
            Some(TranscriptError::NoReadableTranscript)
        ));
    }
}
