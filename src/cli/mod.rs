use clap::Parser;
use std::fmt;
use std::path::PathBuf;

use crate::RippedError;

#[derive(Parser)]
#[command(
    name = "ripped",
    about = "Download media with yt-dlp and normalize it to MP3/MP4 with ffmpeg",
    version,
    long_about = "A front end for yt-dlp and ffmpeg. Downloads audio or video from a URL \
and normalizes the result (MP3 for audio, MP4 for video), or bulk-converts existing \
webm/mkv files. Run without arguments for the interactive menu."
)]
pub struct Cli {
    /// `<audio|video> <quality|max> <url>`, `convert <path>`, or `menu`
    #[arg(value_name = "ARGS")]
    pub args: Vec<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Operation selector: download audio, download video, or convert files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Audio,
    Video,
    Convert,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Audio => "audio",
            Mode::Video => "video",
            Mode::Convert => "convert",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully validated invocation. Only constructible through [`parse_args`],
/// so a `Command` in hand is always internally consistent: downloads carry a
/// URL, conversions carry an existing path.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Download {
        mode: Mode,
        /// Vertical resolution cap; `None` means best available.
        quality: Option<u32>,
        url: String,
    },
    Convert {
        path: PathBuf,
    },
}

const USAGE: &str = "Usage: ripped <mode> <quality> <url> OR ripped convert <path>";

/// Case-insensitive mode match. Download contexts allow only audio/video;
/// the top-level parser additionally accepts convert.
pub fn validate_mode(raw: &str, allow_convert: bool) -> Result<Mode, RippedError> {
    match raw.to_lowercase().as_str() {
        "audio" => Ok(Mode::Audio),
        "video" => Ok(Mode::Video),
        "convert" if allow_convert => Ok(Mode::Convert),
        _ => Err(RippedError::InvalidMode {
            allowed: if allow_convert {
                "\"audio\", \"video\", \"convert\""
            } else {
                "\"audio\", \"video\""
            },
        }),
    }
}

/// "max" (any case) means unbounded; anything else must be a base-10
/// integer strictly greater than zero.
pub fn validate_quality(raw: &str) -> Result<Option<u32>, RippedError> {
    if raw.eq_ignore_ascii_case("max") {
        return Ok(None);
    }
    match raw.parse::<u32>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(RippedError::InvalidQuality),
    }
}

/// Deliberately permissive: accepts any string with an "http" prefix,
/// returned unchanged. yt-dlp's own error path handles junk URLs.
pub fn validate_url(raw: &str) -> Result<String, RippedError> {
    if raw.starts_with("http") {
        Ok(raw.to_string())
    } else {
        Err(RippedError::InvalidUrl)
    }
}

/// Expand `~`, canonicalize, and require existence.
pub fn validate_path(raw: &str) -> Result<PathBuf, RippedError> {
    let expanded = expand_home(raw);
    expanded
        .canonicalize()
        .map_err(|_| RippedError::PathNotFound(raw.to_string()))
}

fn expand_home(raw: &str) -> PathBuf {
    if raw == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}

/// Parse the positional grammar.
///
/// Supported layouts:
///   - `ripped <mode> <quality> <url>`
///   - `ripped convert <path>`
pub fn parse_args(args: &[String]) -> Result<Command, RippedError> {
    if args.is_empty() {
        return Err(RippedError::Usage(USAGE.to_string()));
    }

    let mode = validate_mode(&args[0], true)?;

    if mode == Mode::Convert {
        if args.len() != 2 {
            return Err(RippedError::Usage("Usage: ripped convert <path>".to_string()));
        }
        let path = validate_path(&args[1])?;
        return Ok(Command::Convert { path });
    }

    if args.len() != 3 {
        return Err(RippedError::Usage("Usage: ripped <mode> <quality> <url>".to_string()));
    }

    let quality = validate_quality(&args[1])?;
    let url = validate_url(&args[2])?;

    Ok(Command::Download { mode, quality, url })
}

/// Human-readable quality, "max" when unbounded.
pub fn format_quality_label(quality: Option<u32>) -> String {
    match quality {
        None => "max".to_string(),
        Some(n) => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_valid_max_quality() {
        let parsed = parse_args(&tokens(&["video", "max", "https://example.com"])).unwrap();
        assert_eq!(
            parsed,
            Command::Download {
                mode: Mode::Video,
                quality: None,
                url: "https://example.com".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_args_numeric_quality() {
        let parsed = parse_args(&tokens(&["audio", "128", "http://example.com"])).unwrap();
        match parsed {
            Command::Download { mode, quality, .. } => {
                assert_eq!(mode, Mode::Audio);
                assert_eq!(quality, Some(128));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_args_invalid_shapes() {
        let cases: &[&[&str]] = &[
            &[],
            &["video"],
            &["video", "max"],
            &["invalid", "max", "http://example.com"],
            &["video", "bad", "http://example.com"],
            &["video", "720", "not-a-url"],
            &["convert"],
            &["convert", "this-path-does-not-exist"],
        ];
        for case in cases {
            assert!(parse_args(&tokens(case)).is_err(), "should fail: {:?}", case);
        }
    }

    #[test]
    fn test_parse_args_convert_existing_path() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().to_string_lossy().to_string();
        let parsed = parse_args(&tokens(&["convert", &raw])).unwrap();
        match parsed {
            Command::Convert { path } => assert_eq!(path, dir.path().canonicalize().unwrap()),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_validate_mode_case_insensitive() {
        assert_eq!(validate_mode("AUDIO", false).unwrap(), Mode::Audio);
        assert_eq!(validate_mode("Video", false).unwrap(), Mode::Video);
        assert!(validate_mode("convert", false).is_err());
        assert_eq!(validate_mode("convert", true).unwrap(), Mode::Convert);
    }

    #[test]
    fn test_validate_quality() {
        assert_eq!(validate_quality("max").unwrap(), None);
        assert_eq!(validate_quality("MAX").unwrap(), None);
        assert_eq!(validate_quality("720").unwrap(), Some(720));
        assert!(validate_quality("0").is_err());
        assert!(validate_quality("-5").is_err());
        assert!(validate_quality("abc").is_err());
        assert!(validate_quality("").is_err());
    }

    #[test]
    fn test_validate_url_is_identity_on_success() {
        assert_eq!(
            validate_url("https://example.com/watch?v=1").unwrap(),
            "https://example.com/watch?v=1"
        );
        assert_eq!(validate_url("httpgarbage").unwrap(), "httpgarbage");
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("example.com").is_err());
    }

    #[test]
    fn test_format_quality_label() {
        assert_eq!(format_quality_label(None), "max");
        assert_eq!(format_quality_label(Some(720)), "720");
    }
}
