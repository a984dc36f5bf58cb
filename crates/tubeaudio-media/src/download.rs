//! Video download using yt-dlp.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use tubeaudio_models::{DownloadResult, VideoId};

use crate::command::ToolRunner;
use crate::config::MediaConfig;
use crate::error::{DownloadError, MediaError, MediaResult};
use crate::stage::Downloader;

/// File stem yt-dlp writes the media under inside the scratch directory.
const OUTPUT_STEM: &str = "source";

/// Downloader that shells out to yt-dlp.
#[derive(Debug, Clone)]
pub struct YtDlpDownloader {
    config: MediaConfig,
    runner: ToolRunner,
}

impl YtDlpDownloader {
    pub fn new(config: MediaConfig) -> Self {
        let runner = ToolRunner::new(config.ytdlp_path.clone(), config.tool_timeout);
        Self { config, runner }
    }

    /// URL handed to yt-dlp for an identifier.
    pub fn source_url(&self, video_id: &VideoId) -> String {
        format!("{}{}", self.config.source_url_prefix, video_id)
    }

    fn build_args(&self, url: &str, output_dir: &Path) -> Vec<String> {
        let template = output_dir.join(format!("{}.%(ext)s", OUTPUT_STEM));
        vec![
            "--no-playlist".to_string(),
            "--no-progress".to_string(),
            "-f".to_string(),
            self.config.download_quality.clone(),
            // --print implies --simulate unless told otherwise
            "--no-simulate".to_string(),
            "--print".to_string(),
            "title".to_string(),
            "-o".to_string(),
            template.to_string_lossy().to_string(),
            url.to_string(),
        ]
    }

    async fn fetch(&self, video_id: &VideoId) -> MediaResult<DownloadResult> {
        let scratch = self.config.scratch_dir("tubeaudio-dl-")?;
        let url = self.source_url(video_id);

        info!("Downloading {} with quality '{}'", url, self.config.download_quality);

        let output = self.runner.run(self.build_args(&url, scratch.path())).await?;
        let title = parse_title(&output.stdout).unwrap_or_else(|| video_id.to_string());

        let path = find_output_file(scratch.path()).await?;
        let content = tokio::fs::read(&path).await?;
        if content.is_empty() {
            return Err(MediaError::missing_output(format!(
                "{} produced an empty file for {}",
                self.runner.program(),
                video_id
            )));
        }

        debug!("Downloaded {} bytes for {} ({})", content.len(), video_id, title);
        Ok(DownloadResult { content, title })
    }
}

#[async_trait]
impl Downloader for YtDlpDownloader {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn download(&self, video_id: &VideoId) -> Result<DownloadResult, DownloadError> {
        self.fetch(video_id).await.map_err(DownloadError::from)
    }
}

/// First non-empty line of yt-dlp's `--print title` output.
fn parse_title(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

/// Locate the finished media file, ignoring partial downloads.
async fn find_output_file(dir: &Path) -> MediaResult<PathBuf> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(OUTPUT_STEM) && !name.ends_with(".part") && !name.ends_with(".ytdl") {
            return Ok(entry.path());
        }
    }
    Err(MediaError::missing_output(format!(
        "no media file in {}",
        dir.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_title() {
        assert_eq!(parse_title("\n  My Video  \n").as_deref(), Some("My Video"));
        assert_eq!(parse_title("   \n"), None);
    }

    #[test]
    fn test_source_url_and_args() {
        let downloader = YtDlpDownloader::new(MediaConfig {
            download_quality: "bestaudio".to_string(),
            ..Default::default()
        });
        let id = VideoId::parse("abc123").unwrap();
        let url = downloader.source_url(&id);
        assert_eq!(url, "https://www.youtube.com/watch?v=abc123");

        let args = downloader.build_args(&url, Path::new("/tmp/x"));
        let f = args.iter().position(|a| a == "-f").unwrap();
        assert_eq!(args[f + 1], "bestaudio");
        assert!(args.contains(&"--no-simulate".to_string()));
        assert_eq!(args.last().unwrap(), &url);
    }

    #[tokio::test]
    async fn test_find_output_file_skips_partials() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("source.webm.part"), b"x").await.unwrap();
        assert!(find_output_file(dir.path()).await.is_err());

        tokio::fs::write(dir.path().join("source.webm"), b"x").await.unwrap();
        let found = find_output_file(dir.path()).await.unwrap();
        assert_eq!(found.file_name().unwrap(), "source.webm");
    }

    #[tokio::test]
    async fn test_missing_binary_is_download_error() {
        let downloader = YtDlpDownloader::new(MediaConfig {
            ytdlp_path: "tubeaudio-no-such-ytdlp".to_string(),
            ..Default::default()
        });
        let err = downloader
            .download(&VideoId::parse("abc").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err.0, MediaError::ToolNotFound(_)));
    }
}
