//! Ripped - a CLI front end for yt-dlp and ffmpeg
//!
//! This library orchestrates two external tools to download audio/video from
//! URLs and normalize the results into consistent formats (MP3 for audio,
//! MP4 for video), with a bulk-conversion sweep for pre-existing files and
//! an interactive menu front end.

pub mod cli;
pub mod config;
pub mod convert;
pub mod download;
pub mod logging;
pub mod menu;
pub mod tools;

pub use cli::{Cli, Command, Mode};
pub use config::Config;
pub use convert::{ConversionOutcome, Converter};
pub use download::Downloader;

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Process exit codes shared by the one-shot commands and the menu.
pub mod exit {
    pub const OK: u8 = 0;
    pub const USER_ERROR: u8 = 1;
    pub const DOWNLOAD_ERROR: u8 = 2;
    pub const FFMPEG_ERROR: u8 = 3;
}

/// Error types specific to ripped
#[derive(thiserror::Error, Debug)]
pub enum RippedError {
    #[error("{0}")]
    Usage(String),

    #[error("mode must be one of: {allowed}")]
    InvalidMode { allowed: &'static str },

    #[error("quality must be \"max\" or a positive integer")]
    InvalidQuality,

    #[error("URL must start with http or https")]
    InvalidUrl,

    #[error("provided path does not exist: {0}")]
    PathNotFound(String),

    #[error("{tool} not found. Please install it and ensure it is in your PATH.")]
    ToolUnavailable { tool: &'static str },

    #[error("unsupported file type for conversion: {0}")]
    UnsupportedType(String),

    #[error("download failed: {0}")]
    TransferError(String),

    #[error("conversion failed: {0}")]
    ConversionError(String),
}
