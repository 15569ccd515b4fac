use std::sync::Arc;
use tempfile::TempDir;
use tracing::{info, warn};

use crate::artifacts::ArtifactStore;
use crate::captions;
use crate::media::{extract_video_id, MediaProvider};
use crate::transcript::{TranscriptResult, TranscriptSegment, TranscriptSource};
use crate::transcription::{FallbackTranscriber, ModelSize};
use crate::{PipelineError, Result};

/// Acquisition strategies, tried in order; first success wins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AcquisitionStrategy {
    /// Pre-existing caption tracks (fast path)
    Captions,
    /// Audio extraction + speech-to-text (always available)
    Audio,
}

/// Orchestrates transcript acquisition for a media URL.
///
/// Collaborator handles (media provider, transcription engines, artifact
/// store) are injected; the orchestrator only sequences them.
pub struct TranscriptAcquirer {
    provider: Arc<dyn MediaProvider>,
    transcriber: FallbackTranscriber,
    artifacts: ArtifactStore,
}

impl TranscriptAcquirer {
    pub fn new(
        provider: Arc<dyn MediaProvider>,
        transcriber: FallbackTranscriber,
        artifacts: ArtifactStore,
    ) -> Self {
        Self {
            provider,
            transcriber,
            artifacts,
        }
    }

    /// Produce a timestamped transcript for `url`.
    ///
    /// Caption tracks are preferred when `prefer_captions` is set; any
    /// failure on that path is swallowed and acquisition falls through to
    /// audio extraction + transcription. A failure on the audio path is
    /// fatal for the whole operation. Either a complete result or an error
    /// comes back, never a partial transcript.
    pub async fn prepare_from_url(
        &self,
        url: &str,
        language: Option<&str>,
        model_size: ModelSize,
        prefer_captions: bool,
    ) -> Result<TranscriptResult> {
        let video_id = extract_video_id(url);
        if video_id.is_none() {
            info!("No video identifier recognized in URL, continuing without one");
        }

        let strategies = if prefer_captions {
            vec![AcquisitionStrategy::Captions, AcquisitionStrategy::Audio]
        } else {
            vec![AcquisitionStrategy::Audio]
        };

        let last = strategies.len() - 1;
        for (index, strategy) in strategies.iter().enumerate() {
            let outcome = match strategy {
                AcquisitionStrategy::Captions => self.acquire_from_captions(url, language).await,
                AcquisitionStrategy::Audio => {
                    self.acquire_from_audio(url, language, model_size).await
                }
            };

            match outcome {
                Ok((source, segments)) => {
                    let result = TranscriptResult {
                        segments,
                        source,
                        video_id,
                    };
                    // Best-effort side effect; the result does not depend on it
                    if let Err(e) = self.artifacts.save_transcript(&result).await {
                        warn!("Failed to persist transcript record: {}", e);
                    }
                    return Ok(result);
                }
                Err(e) if index < last => {
                    warn!("{:?} strategy failed, falling back: {}", strategy, e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(PipelineError::Transcription(
            "no acquisition strategy available".to_string(),
        ))
    }

    /// Strategy 1: fetch and parse existing caption tracks
    async fn acquire_from_captions(
        &self,
        url: &str,
        language: Option<&str>,
    ) -> Result<(TranscriptSource, Vec<TranscriptSegment>)> {
        let scratch = TempDir::new()?;
        let tracks = self
            .provider
            .fetch_caption_tracks(url, language, scratch.path())
            .await?;
        let Some(track) = tracks.first() else {
            return Err(PipelineError::CaptionsUnavailable(
                "provider returned no tracks".to_string(),
            ));
        };

        let document = tokio::fs::read_to_string(track).await?;
        let segments = captions::parse_vtt(&document);
        if segments.is_empty() {
            return Err(PipelineError::CaptionsUnavailable(
                "caption track parsed to zero segments".to_string(),
            ));
        }

        info!(
            "📝 Parsed {} segments from caption track {}",
            segments.len(),
            track.display()
        );
        Ok((TranscriptSource::Captions, segments))
    }

    /// Strategy 2: extract audio and run speech-to-text
    async fn acquire_from_audio(
        &self,
        url: &str,
        language: Option<&str>,
        model_size: ModelSize,
    ) -> Result<(TranscriptSource, Vec<TranscriptSegment>)> {
        tokio::fs::create_dir_all(self.artifacts.dir()).await?;
        let audio = self.provider.extract_audio(url, self.artifacts.dir()).await?;
        info!("🎵 Audio ready: {}", audio.display());

        let segments = self
            .transcriber
            .transcribe(&audio, language, model_size)
            .await?;
        Ok((TranscriptSource::Asr, segments))
    }
}
