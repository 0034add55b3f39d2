//! Tubetext - A Rust CLI tool for extracting YouTube video transcripts
//!
//! This library drives an external subtitle-extraction tool (yt-dlp) to fetch
//! a video's caption track, picks the best output among the files the tool
//! produces, and parses the raw subtitle markup into clean text segments.

pub mod cli;
pub mod config;
pub mod language;
pub mod metadata;
pub mod output;
pub mod pipeline;
pub mod sources;
pub mod subtitles;
pub mod utils;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use metadata::{CaptionTrack, VideoMetadata};
pub use pipeline::{LanguageSummary, TranscriptPipeline, TranscriptResult};
pub use subtitles::SubtitleCue;

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to transcript extraction
#[derive(thiserror::Error, Debug)]
pub enum TranscriptError {
    #[error("Invalid videoId format")]
    InvalidVideoId,

    #[error("Invalid lang format")]
    InvalidLanguage,

    #[error("yt-dlp is not available")]
    ToolUnavailable,

    /// The external tool exited non-zero; carries a truncated diagnostic.
    #[error("Subtitle download failed.{0}")]
    ExtractionFailed(String),

    /// The tool succeeded but wrote no matching subtitle files.
    #[error("No transcript found")]
    NoTranscript,

    /// Matching files existed but none could be read or parsed.
    #[error("No readable transcript found")]
    NoReadableTranscript,

    #[error("No caption track available for video")]
    NoCaptionTrack,
}
