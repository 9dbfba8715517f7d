//! Capability wrappers around the external collaborators: yt-dlp, ffmpeg,
//! and the system clipboard. Each exposes an explicit availability probe so
//! callers handle the not-available case per call site instead of relying
//! on failures mid-operation.

pub mod clipboard;
pub mod ffmpeg;
pub mod ytdlp;

pub use clipboard::Clipboard;
pub use ffmpeg::Ffmpeg;
pub use ytdlp::{DownloadResult, YtDlp};
