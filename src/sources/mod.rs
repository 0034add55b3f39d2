use async_trait::async_trait;

pub mod direct;
pub mod handle;
pub mod ytdlp;

pub use handle::InvocationHandle;

use crate::metadata::VideoMetadata;
use crate::subtitles::SubtitleCue;
use crate::Result;

/// A strategy for acquiring a video's transcript
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch and parse the transcript for a video.
    ///
    /// `language_spec` is the specifier chosen by the pipeline: an explicit
    /// override, the metadata-derived default, or a comma-joined preference
    /// list.
    async fn fetch_transcript(
        &self,
        video_id: &str,
        language_spec: &str,
        metadata: &VideoMetadata,
    ) -> Result<Vec<SubtitleCue>>;

    /// Short name for logs and error context
    fn source_name(&self) -> &'static str;
}
