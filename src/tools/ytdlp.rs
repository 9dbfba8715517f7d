use anyhow::Result;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

use crate::RippedError;

/// Raw media retrieved by yt-dlp: where it landed and what it is called.
#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub filepath: PathBuf,
    pub title: String,
}

/// Extraction capability backed by the yt-dlp binary.
pub struct YtDlp {
    path: String,
}

impl YtDlp {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Check if yt-dlp is available
    pub async fn available(&self) -> bool {
        Command::new(&self.path)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Download media for `url` using the given format selector, writing via
    /// the yt-dlp output template. Returns the final file path as reported
    /// by yt-dlp after any post-download moves.
    pub async fn fetch(
        &self,
        url: &str,
        format_str: &str,
        output_template: &str,
    ) -> Result<DownloadResult> {
        tracing::debug!("yt-dlp fetch: format={format_str} url={url}");

        let output = Command::new(&self.path)
            .args([
                "--no-playlist",
                "--format",
                format_str,
                "--output",
                output_template,
                "--no-simulate",
                "--print",
                "after_move:filepath",
                url,
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|_| RippedError::ToolUnavailable { tool: "yt-dlp" })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RippedError::TransferError(last_line(&stderr)).into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let filepath = stdout
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .map(|line| PathBuf::from(line.trim()))
            .ok_or_else(|| {
                RippedError::TransferError("yt-dlp did not report a file path".to_string())
            })?;

        let title = filepath
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string());

        Ok(DownloadResult { filepath, title })
    }
}

/// Trailing non-empty stderr line, usually yt-dlp's actual error.
fn last_line(stderr: &str) -> String {
    stderr
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("unknown error")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_line_picks_trailing_error() {
        let stderr = "WARNING: something\nERROR: video unavailable\n\n";
        assert_eq!(last_line(stderr), "ERROR: video unavailable");
    }

    #[test]
    fn test_last_line_empty_stderr() {
        assert_eq!(last_line(""), "unknown error");
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let ytdlp = YtDlp::new("definitely-not-a-real-binary");
        assert!(!ytdlp.available().await);
    }
}
