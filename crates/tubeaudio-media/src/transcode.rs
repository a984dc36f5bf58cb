//! Audio transcoding with FFmpeg.

use async_trait::async_trait;
use tracing::debug;

use tubeaudio_models::TranscodedMedia;

use crate::command::{FfmpegCommand, ToolRunner};
use crate::config::MediaConfig;
use crate::error::{MediaError, MediaResult, TranscodeError};
use crate::stage::Transcoder;

/// Transcoder producing MP3 audio via the FFmpeg CLI.
///
/// Works entirely on local scratch files.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    config: MediaConfig,
    runner: ToolRunner,
}

impl FfmpegTranscoder {
    pub fn new(config: MediaConfig) -> Self {
        let runner = ToolRunner::new(config.ffmpeg_path.clone(), config.tool_timeout);
        Self { config, runner }
    }

    fn build_command(&self, input: &std::path::Path, output: &std::path::Path) -> FfmpegCommand {
        FfmpegCommand::new(input, output)
            .no_video()
            .audio_codec("libmp3lame")
            .audio_bitrate(self.config.audio_bitrate.clone())
            .format("mp3")
    }

    async fn convert(&self, input: Vec<u8>) -> MediaResult<TranscodedMedia> {
        if input.is_empty() {
            return Err(MediaError::invalid_input("empty media payload"));
        }

        let scratch = self.config.scratch_dir("tubeaudio-tc-")?;
        let input_path = scratch.path().join("input.bin");
        let output_path = scratch.path().join("output.mp3");

        tokio::fs::write(&input_path, &input).await?;
        drop(input);

        let cmd = self.build_command(&input_path, &output_path);
        self.runner.run(cmd.build_args()).await?;

        let audio = tokio::fs::read(&output_path)
            .await
            .map_err(|e| MediaError::missing_output(format!("{}: {}", output_path.display(), e)))?;
        if audio.is_empty() {
            return Err(MediaError::missing_output("FFmpeg produced no audio"));
        }

        debug!("Transcoded to {} bytes of MP3", audio.len());
        Ok(TranscodedMedia(audio))
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &'static str {
        "ffmpeg-mp3"
    }

    async fn transcode(&self, input: Vec<u8>) -> Result<TranscodedMedia, TranscodeError> {
        self.convert(input).await.map_err(TranscodeError::from)
    }
}
