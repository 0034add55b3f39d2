use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tubetext",
    about = "Tubetext - Extract YouTube video transcripts (caption tracks) as plain text",
    version,
    long_about = "A CLI tool that fetches a YouTube video's caption track via yt-dlp (or a direct timed-text request), picks the best available subtitle file, and emits the transcript as clean text segments."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a video's transcript
    Transcript {
        /// 11-character YouTube video id (the `v=` parameter)
        #[arg(value_name = "VIDEO_ID")]
        video_id: String,

        /// Caption language code(s), e.g. "de" or "en,en-US"; "auto" or
        /// omitted picks the video's default
        #[arg(short, long, value_name = "LANG")]
        lang: Option<String>,

        /// Transcript acquisition strategy
        #[arg(long, value_enum, default_value = "ytdlp")]
        source: SourceKind,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List a video's available caption languages
    Languages {
        /// 11-character YouTube video id
        #[arg(value_name = "VIDEO_ID")]
        video_id: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show or edit configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// JSON with segment timestamps where available
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SourceKind {
    /// Shell out to yt-dlp (default)
    Ytdlp,
    /// Fetch the caption track's timed-text URL directly
    Direct,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Ytdlp => write!(f, "ytdlp"),
            SourceKind::Direct => write!(f, "direct"),
        }
    }
}
