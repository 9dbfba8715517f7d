use anyhow::Result;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Transcoding capability backed by the ffmpeg binary. Codec choices are
/// fixed: MP3 via libmp3lame for audio, stream-copied video with AAC audio
/// for MP4 remuxes.
pub struct Ffmpeg {
    path: String,
}

impl Ffmpeg {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Check if ffmpeg is available
    pub async fn available(&self) -> bool {
        Command::new(&self.path)
            .arg("-version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Re-encode any media file to MP3, dropping video streams.
    pub async fn transcode_to_mp3(
        &self,
        input: &Path,
        output: &Path,
        bitrate: &str,
    ) -> Result<()> {
        tracing::debug!("ffmpeg mp3 transcode: {} -> {}", input.display(), output.display());

        self.run(&[
            "-y",
            "-i",
            &input.to_string_lossy(),
            "-vn",
            "-codec:a",
            "libmp3lame",
            "-b:a",
            bitrate,
            &output.to_string_lossy(),
        ])
        .await
    }

    /// Remux into an MP4 container: video stream copied unchanged, audio
    /// re-encoded to AAC for compatibility with common editing tools.
    pub async fn remux_to_mp4(&self, input: &Path, output: &Path, bitrate: &str) -> Result<()> {
        tracing::debug!("ffmpeg mp4 remux: {} -> {}", input.display(), output.display());

        self.run(&[
            "-y",
            "-i",
            &input.to_string_lossy(),
            "-c:v",
            "copy",
            "-c:a",
            "aac",
            "-b:a",
            bitrate,
            &output.to_string_lossy(),
        ])
        .await
    }

    async fn run(&self, args: &[&str]) -> Result<()> {
        let output = Command::new(&self.path)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "ffmpeg failed: {}",
                stderr.lines().last().unwrap_or("unknown error").trim()
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let ffmpeg = Ffmpeg::new("definitely-not-a-real-binary");
        assert!(!ffmpeg.available().await);
    }
}
