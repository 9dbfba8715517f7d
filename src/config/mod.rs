use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Quality ladder offered by the interactive menu; `None` means max.
pub const QUALITY_CHOICES: [Option<u32>; 7] = [
    None,
    Some(360),
    Some(480),
    Some(720),
    Some(1080),
    Some(1440),
    Some(2160),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory downloads are written into (created on demand)
    pub output_dir: PathBuf,

    /// Audio bitrate passed to ffmpeg for MP3 transcodes and MP4 remuxes
    pub audio_bitrate: String,

    /// yt-dlp output template, relative to `output_dir`
    pub output_template: String,

    /// yt-dlp binary name or path
    pub yt_dlp_path: String,

    /// ffmpeg binary name or path
    pub ffmpeg_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("downloads"),
            audio_bitrate: "192k".to_string(),
            output_template: "%(title)s.%(ext)s".to_string(),
            yt_dlp_path: "yt-dlp".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file if one exists, else compiled defaults.
    ///
    /// A malformed config file is reported and ignored rather than aborting,
    /// so a stale file cannot brick the tool.
    pub fn load() -> Self {
        match Self::try_load() {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("falling back to default config: {err:#}");
                Self::default()
            }
        }
    }

    fn try_load() -> Result<Self> {
        let Some(path) = Self::config_path() else {
            return Ok(Self::default());
        };

        let content = fs_err::read_to_string(&path).context("Failed to read config file")?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// First existing config file: `ripped.yaml` in the current directory
    /// for easy testing, else the user config directory.
    fn config_path() -> Option<PathBuf> {
        let local = PathBuf::from("ripped.yaml");
        if local.exists() {
            return Some(local);
        }

        let candidate = dirs::config_dir()?.join("ripped").join("config.yaml");
        candidate.exists().then_some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.output_dir, PathBuf::from("downloads"));
        assert_eq!(config.audio_bitrate, "192k");
        assert_eq!(config.output_template, "%(title)s.%(ext)s");
    }

    #[test]
    fn test_partial_config_file_fills_defaults() {
        let config: Config = serde_yaml::from_str("audio_bitrate: 128k\n").unwrap();
        assert_eq!(config.audio_bitrate, "128k");
        assert_eq!(config.yt_dlp_path, "yt-dlp");
    }

    #[test]
    fn test_quality_choices_ladder() {
        assert_eq!(QUALITY_CHOICES[0], None);
        assert_eq!(QUALITY_CHOICES[3], Some(720));
        assert_eq!(QUALITY_CHOICES.len(), 7);
    }
}
