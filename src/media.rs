use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::process::Command;
use tracing::{debug, info};

use crate::{PipelineError, Result};

/// External caption/audio acquisition engine.
///
/// The pipeline receives a provider handle and never provisions tools
/// itself. Both methods are handed an existing destination directory.
#[async_trait]
pub trait MediaProvider: Send + Sync {
    /// Fetch subtitle documents for `url` into `dest`, preferring manual
    /// tracks over auto-generated ones. `language` filters the tracks; when
    /// absent, all languages are requested. Returns the retrieved files.
    async fn fetch_caption_tracks(
        &self,
        url: &str,
        language: Option<&str>,
        dest: &Path,
    ) -> Result<Vec<PathBuf>>;

    /// Extract an audio-only stream for `url` into `dest` and return the
    /// extracted file.
    async fn extract_audio(&self, url: &str, dest: &Path) -> Result<PathBuf>;
}

/// `yt-dlp` command-line media provider
#[derive(Debug, Clone)]
pub struct YtDlpCli {
    /// Program name or path
    program: String,
    /// Subtitle format requested from the downloader
    sub_format: String,
    /// Audio container for extracted tracks
    audio_format: String,
}

impl YtDlpCli {
    pub fn new() -> Self {
        Self {
            program: "yt-dlp".to_string(),
            sub_format: "vtt".to_string(),
            audio_format: "m4a".to_string(),
        }
    }

    /// Use a custom program name or path
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Check whether the downloader binary is runnable
    pub async fn check_availability(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// One subtitle fetch pass: manual tracks or auto-generated tracks
    async fn run_subtitle_pass(
        &self,
        url: &str,
        language: Option<&str>,
        dest: &Path,
        auto_generated: bool,
    ) -> Result<()> {
        let subs_flag = if auto_generated {
            "--write-auto-subs"
        } else {
            "--write-subs"
        };

        let mut cmd = Command::new(&self.program);
        cmd.arg("--skip-download")
            .arg(subs_flag)
            .arg("--sub-langs")
            .arg(language.unwrap_or("all"))
            .arg("--sub-format")
            .arg(&self.sub_format)
            .arg("-o")
            .arg(dest.join("%(id)s.%(ext)s"))
            .arg(url);

        debug!("Running subtitle fetch: {:?}", cmd);
        let status = cmd
            .status()
            .await
            .map_err(|e| PipelineError::CaptionsUnavailable(format!("failed to spawn {}: {}", self.program, e)))?;

        if !status.success() {
            return Err(PipelineError::CaptionsUnavailable(format!(
                "{} exited with {}",
                self.program, status
            )));
        }

        Ok(())
    }

    /// Collect files in `dir` matching `extension`
    async fn collect_by_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == extension) {
                files.push(path);
            }
        }

        Ok(files)
    }
}

impl Default for YtDlpCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaProvider for YtDlpCli {
    async fn fetch_caption_tracks(
        &self,
        url: &str,
        language: Option<&str>,
        dest: &Path,
    ) -> Result<Vec<PathBuf>> {
        // Manual tracks first, auto-generated tracks second
        for auto_generated in [false, true] {
            if let Err(e) = self
                .run_subtitle_pass(url, language, dest, auto_generated)
                .await
            {
                debug!(
                    "Subtitle pass failed (auto_generated={}): {}",
                    auto_generated, e
                );
                continue;
            }

            let tracks = Self::collect_by_extension(dest, &self.sub_format).await?;
            if !tracks.is_empty() {
                info!("📝 Retrieved {} caption track(s)", tracks.len());
                return Ok(tracks);
            }
        }

        Err(PipelineError::CaptionsUnavailable(
            "no subtitle tracks retrieved".to_string(),
        ))
    }

    async fn extract_audio(&self, url: &str, dest: &Path) -> Result<PathBuf> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-x")
            .arg("--audio-format")
            .arg(&self.audio_format)
            .arg("-o")
            .arg(dest.join("%(title)s-%(id)s.%(ext)s"))
            .arg(url);

        info!("🎵 Extracting audio track: {}", url);
        debug!("Running audio extraction: {:?}", cmd);

        let status = cmd.status().await.map_err(|e| {
            PipelineError::AudioExtraction(format!("failed to spawn {}: {}", self.program, e))
        })?;

        if !status.success() {
            return Err(PipelineError::AudioExtraction(format!(
                "{} exited with {}",
                self.program, status
            )));
        }

        // Newest matching file wins; earlier runs may leave older tracks around
        let candidates = Self::collect_by_extension(dest, &self.audio_format).await?;
        let mut newest: Option<(SystemTime, PathBuf)> = None;
        for path in candidates {
            let modified = tokio::fs::metadata(&path).await?.modified()?;
            if newest.as_ref().map_or(true, |(when, _)| modified > *when) {
                newest = Some((modified, path));
            }
        }

        newest.map(|(_, path)| path).ok_or_else(|| {
            PipelineError::AudioExtraction("no audio file produced".to_string())
        })
    }
}

/// Pull a stable video identifier out of a watch URL. Two URL shapes are
/// recognized; anything else yields `None`.
pub fn extract_video_id(url: &str) -> Option<String> {
    let patterns = [r"v=([\w-]{6,})", r"youtu\.be/([\w-]{6,})"];

    for pattern in patterns {
        if let Ok(re) = Regex::new(pattern) {
            if let Some(caps) = re.captures(url) {
                if let Some(id) = caps.get(1) {
                    return Some(id.as_str().to_string());
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extract_video_id_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_extract_video_id_short_url() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ?t=10"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_extract_video_id_no_match() {
        assert_eq!(extract_video_id("https://example.com/video"), None);
        // Too short to be an identifier
        assert_eq!(extract_video_id("https://youtu.be/abc"), None);
    }

    #[test]
    fn test_ytdlp_defaults() {
        let provider = YtDlpCli::new();
        assert_eq!(provider.program, "yt-dlp");
        assert_eq!(provider.sub_format, "vtt");
        assert_eq!(provider.audio_format, "m4a");

        let custom = YtDlpCli::new().with_program("/opt/bin/yt-dlp");
        assert_eq!(custom.program, "/opt/bin/yt-dlp");
    }

    #[tokio::test]
    async fn test_collect_by_extension() {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(dir.path().join("a.vtt"), "x").await.unwrap();
        tokio::fs::write(dir.path().join("b.m4a"), "x").await.unwrap();

        let vtts = YtDlpCli::collect_by_extension(dir.path(), "vtt").await.unwrap();
        assert_eq!(vtts.len(), 1);
        assert!(vtts[0].ends_with("a.vtt"));
    }
}
