//! Format planning and the download pipeline.
//!
//! A single download runs plan -> fetch -> normalize: the format selector
//! is derived from mode/quality, yt-dlp retrieves the media, and ffmpeg
//! normalizes the result (MP3 transcode for audio, MP4 remux for video).
//! Video normalization is best-effort: if it fails the original download is
//! kept as the final artifact and the run still counts as a success.

use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::{format_quality_label, Mode};
use crate::config::Config;
use crate::convert::Converter;
use crate::logging::LogSink;
use crate::tools::{Ffmpeg, YtDlp};
use crate::{exit, RippedError};

/// Build the yt-dlp format selector for the requested mode and quality.
/// Quality only constrains video; audio always takes the best audio stream.
pub fn build_format_string(mode: Mode, quality: Option<u32>) -> Result<String, RippedError> {
    match mode {
        Mode::Audio => Ok("bestaudio/best".to_string()),
        Mode::Video => Ok(match quality {
            None => "bestvideo+bestaudio/best".to_string(),
            Some(height) => format!("bestvideo[height<={height}]+bestaudio/best"),
        }),
        Mode::Convert => Err(RippedError::InvalidMode {
            allowed: "\"audio\", \"video\"",
        }),
    }
}

/// Download pipeline: yt-dlp fetch followed by format normalization.
pub struct Downloader {
    ytdlp: YtDlp,
    ffmpeg: Ffmpeg,
    converter: Converter,
    output_dir: PathBuf,
    output_template: String,
    audio_bitrate: String,
}

impl Downloader {
    pub fn new(config: &Config) -> Self {
        Self {
            ytdlp: YtDlp::new(config.yt_dlp_path.clone()),
            ffmpeg: Ffmpeg::new(config.ffmpeg_path.clone()),
            converter: Converter::new(config),
            output_dir: config.output_dir.clone(),
            output_template: config.output_template.clone(),
            audio_bitrate: config.audio_bitrate.clone(),
        }
    }

    /// Execute a single download based on mode/quality/url, reporting
    /// progress through the sink and returning a process exit code.
    pub async fn perform_download(
        &self,
        mode: Mode,
        quality: Option<u32>,
        url: &str,
        sink: &dyn LogSink,
    ) -> u8 {
        let format_str = match build_format_string(mode, quality) {
            Ok(format_str) => format_str,
            Err(err) => {
                sink.error(&err.to_string());
                return exit::USER_ERROR;
            }
        };

        sink.info(&format!("Mode: {mode}"));
        sink.info(&format!("Quality: {}", format_quality_label(quality)));
        sink.info(&format!("URL: {url}"));
        sink.info(&format!("Format string: {format_str}"));

        if let Err(err) = fs_err::create_dir_all(&self.output_dir) {
            sink.error(&format!("Could not create output directory: {err}"));
            return exit::DOWNLOAD_ERROR;
        }
        let output_template = self
            .output_dir
            .join(&self.output_template)
            .to_string_lossy()
            .into_owned();

        let spinner = fetch_spinner(url);
        let fetched = self.ytdlp.fetch(url, &format_str, &output_template).await;
        spinner.finish_and_clear();

        let download = match fetched {
            Ok(download) => download,
            Err(err) => {
                sink.error(&format!("{err:#}"));
                return exit::DOWNLOAD_ERROR;
            }
        };
        tracing::debug!(
            "fetched \"{}\" to {}",
            download.title,
            download.filepath.display()
        );

        match mode {
            Mode::Audio => self.normalize_audio(&download.filepath, sink).await,
            Mode::Video => self.normalize_video(&download.filepath, sink).await,
            Mode::Convert => unreachable!("convert never reaches the download pipeline"),
        }
    }

    /// Transcode the downloaded file to MP3 at a sibling path. Both a
    /// missing ffmpeg and a transcode failure are fatal for audio mode.
    async fn normalize_audio(&self, input: &Path, sink: &dyn LogSink) -> u8 {
        if !self.ffmpeg.available().await {
            sink.error(&RippedError::ToolUnavailable { tool: "ffmpeg" }.to_string());
            return exit::FFMPEG_ERROR;
        }

        let mp3_path = input.with_extension("mp3");
        if let Err(err) = self
            .ffmpeg
            .transcode_to_mp3(input, &mp3_path, &self.audio_bitrate)
            .await
        {
            sink.error(&format!("ffmpeg error: {err:#}"));
            return exit::FFMPEG_ERROR;
        }

        sink.info(&format!("Saved audio to: {}", mp3_path.display()));
        exit::OK
    }

    /// Attempt MP4 normalization. A conversion failure keeps the original
    /// download as the final artifact and still reports overall success;
    /// only a missing ffmpeg is fatal.
    async fn normalize_video(&self, input: &Path, sink: &dyn LogSink) -> u8 {
        match self.converter.convert_to_mp4(input, sink).await {
            Err(err) => {
                sink.error(&err.to_string());
                exit::FFMPEG_ERROR
            }
            Ok(outcome) => match outcome.output() {
                Some(path) => {
                    sink.info(&format!("Downloaded and converted to: {}", path.display()));
                    exit::OK
                }
                None => {
                    sink.error(
                        "Conversion to mp4 failed; keeping original file (may be incompatible with editing tools).",
                    );
                    sink.info(&format!("Saved video to: {}", input.display()));
                    exit::OK
                }
            },
        }
    }
}

fn fetch_spinner(url: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    spinner.set_message(format!("Fetching {url}"));
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::BufferSink;

    #[test]
    fn test_build_format_string_audio() {
        assert_eq!(
            build_format_string(Mode::Audio, None).unwrap(),
            "bestaudio/best"
        );
        // Quality is meaningless for audio and must be ignored.
        assert_eq!(
            build_format_string(Mode::Audio, Some(720)).unwrap(),
            "bestaudio/best"
        );
    }

    #[test]
    fn test_build_format_string_video_max() {
        assert_eq!(
            build_format_string(Mode::Video, None).unwrap(),
            "bestvideo+bestaudio/best"
        );
    }

    #[test]
    fn test_build_format_string_video_with_height() {
        assert_eq!(
            build_format_string(Mode::Video, Some(720)).unwrap(),
            "bestvideo[height<=720]+bestaudio/best"
        );
    }

    #[test]
    fn test_build_format_string_rejects_convert() {
        assert!(build_format_string(Mode::Convert, None).is_err());
    }

    #[tokio::test]
    async fn test_perform_download_reports_download_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            yt_dlp_path: "definitely-not-a-real-binary".to_string(),
            output_dir: dir.path().join("downloads"),
            ..Config::default()
        };
        let downloader = Downloader::new(&config);
        let sink = BufferSink::new(8);

        let code = downloader
            .perform_download(Mode::Video, None, "http://example.com", &sink)
            .await;
        assert_eq!(code, exit::DOWNLOAD_ERROR);
        // Output directory is created before the fetch is attempted.
        assert!(dir.path().join("downloads").is_dir());
    }
}
