use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::media::extract_video_id;
use crate::search::SearchHit;
use crate::timestamp::{display_timestamp, watch_link};
use crate::transcript::{TranscriptResult, TranscriptSegment, TranscriptSource};
use crate::Result;

/// Working-directory store for pipeline artifacts.
///
/// Each request gets its own namespace directory so concurrent requests
/// never clobber each other's records.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

/// On-disk transcript record: `{source, segments}`
#[derive(Serialize)]
struct TranscriptRecord<'a> {
    source: TranscriptSource,
    segments: &'a [TranscriptSegment],
}

/// Row shape of the persisted match-results record
#[derive(Debug, Clone, Serialize)]
pub struct MatchRecord {
    pub timestamp_hhmmss: String,
    pub timestamp_sec: f64,
    pub keyword: String,
    pub text: String,
    pub link: String,
}

impl MatchRecord {
    pub fn from_hit(hit: &SearchHit, video_id: Option<&str>) -> Self {
        Self {
            timestamp_hhmmss: display_timestamp(hit.start),
            timestamp_sec: (hit.start * 100.0).round() / 100.0,
            keyword: hit.keyword.clone(),
            text: hit.context.clone(),
            link: watch_link(video_id, hit.start),
        }
    }
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at `root/<namespace>`, one namespace per request: the
    /// video id when the URL carries one, else a slug of the URL itself.
    pub fn for_request(root: &Path, url: &str) -> Self {
        let namespace = extract_video_id(url).unwrap_or_else(|| request_slug(url));
        Self {
            dir: root.join(namespace),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist the transcript record as human-diffable JSON
    pub async fn save_transcript(&self, result: &TranscriptResult) -> Result<PathBuf> {
        let record = TranscriptRecord {
            source: result.source,
            segments: &result.segments,
        };
        self.write_json("transcript.json", &record).await
    }

    /// Persist search match records as human-diffable JSON
    pub async fn save_matches(&self, records: &[MatchRecord]) -> Result<PathBuf> {
        self.write_json("matches.json", &records).await
    }

    async fn write_json<T: Serialize>(&self, filename: &str, value: &T) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(filename);
        let json = serde_json::to_string_pretty(value)?;
        tokio::fs::write(&path, json).await?;
        info!("💾 Saved {}", path.display());
        Ok(path)
    }
}

/// Filesystem-safe namespace for URLs without a recognizable video id
fn request_slug(url: &str) -> String {
    let mut slug: String = url
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    slug.truncate(64);
    if slug.is_empty() {
        slug.push_str("request");
    }
    slug
}
