//! Media Converter and the bulk conversion sweep.
//!
//! Normalizes downloaded or pre-existing `.webm`/`.mkv` files into MP4 with
//! the video stream copied unchanged and audio re-encoded to AAC. The sweep
//! applies the converter sequentially over a file or directory tree,
//! best-effort: partial failure never rolls back completed conversions.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::Config;
use crate::logging::LogSink;
use crate::tools::Ffmpeg;
use crate::{exit, RippedError};

/// Container formats the sweep targets for conversion.
pub const CONVERTIBLE_EXTENSIONS: [&str; 2] = ["webm", "mkv"];

/// Per-file result of a conversion attempt.
#[derive(Debug)]
pub enum ConversionOutcome {
    /// A new MP4 was produced at this path.
    Converted(PathBuf),
    /// Input was already MP4; nothing to do.
    AlreadyCanonical(PathBuf),
    /// Conversion failed; the input is left untouched.
    Failed { input: PathBuf, reason: String },
}

impl ConversionOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, ConversionOutcome::Failed { .. })
    }

    /// Final artifact path for successful outcomes.
    pub fn output(&self) -> Option<&Path> {
        match self {
            ConversionOutcome::Converted(path) => Some(path),
            ConversionOutcome::AlreadyCanonical(path) => Some(path),
            ConversionOutcome::Failed { .. } => None,
        }
    }
}

pub struct Converter {
    ffmpeg: Ffmpeg,
    bitrate: String,
}

impl Converter {
    pub fn new(config: &Config) -> Self {
        Self {
            ffmpeg: Ffmpeg::new(config.ffmpeg_path.clone()),
            bitrate: config.audio_bitrate.clone(),
        }
    }

    /// Convert a single media file to MP4, replacing the original.
    ///
    /// Idempotent on files already in MP4. Never overwrites: colliding
    /// output names are deduplicated with a `_converted` suffix. On failure
    /// any partial output is removed and the input is preserved. On success
    /// the original is deleted; if that deletion fails the conversion still
    /// counts as a success and the incomplete cleanup is reported.
    pub async fn convert_to_mp4(
        &self,
        input: &Path,
        sink: &dyn LogSink,
    ) -> Result<ConversionOutcome, RippedError> {
        if !self.ffmpeg.available().await {
            return Err(RippedError::ToolUnavailable { tool: "ffmpeg" });
        }

        if !input.exists() {
            return Ok(self.fail(input, "input file does not exist".to_string(), sink));
        }

        let extension = input
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .unwrap_or_default();

        if extension == "mp4" {
            sink.info(&format!("Already mp4, skipping conversion: {}", input.display()));
            return Ok(ConversionOutcome::AlreadyCanonical(input.to_path_buf()));
        }

        if !CONVERTIBLE_EXTENSIONS.contains(&extension.as_str()) {
            let reason = RippedError::UnsupportedType(input.display().to_string()).to_string();
            return Ok(self.fail(input, reason, sink));
        }

        let output_path = dedupe_output_path(&input.with_extension("mp4"));

        sink.info(&format!("Converting {} to MP4", input.display()));
        if let Err(err) = self
            .ffmpeg
            .remux_to_mp4(input, &output_path, &self.bitrate)
            .await
        {
            remove_partial(&output_path);
            return Ok(self.fail(input, format!("{err:#}"), sink));
        }

        // ffmpeg can exit zero and still leave nothing usable behind.
        let output_size = fs_err::metadata(&output_path).map(|m| m.len()).unwrap_or(0);
        if output_size == 0 {
            remove_partial(&output_path);
            return Ok(self.fail(input, "output not created".to_string(), sink));
        }

        if let Err(err) = fs_err::remove_file(input) {
            sink.warn(&format!(
                "Converted to {} but could not delete original: {err}",
                output_path.display()
            ));
            return Ok(ConversionOutcome::Converted(output_path));
        }

        sink.info(&format!(
            "Successfully converted to {}, deleted original",
            output_path.display()
        ));
        Ok(ConversionOutcome::Converted(output_path))
    }

    fn fail(&self, input: &Path, reason: String, sink: &dyn LogSink) -> ConversionOutcome {
        sink.error(&format!("Conversion failed for {}: {reason}", input.display()));
        ConversionOutcome::Failed {
            input: input.to_path_buf(),
            reason,
        }
    }

    /// Convert every webm/mkv file under `target` to MP4, sequentially.
    ///
    /// Returns the success exit code iff at least one file converted.
    /// Ctrl+C stops between files, keeps completed work, and reports the
    /// partial tally.
    pub async fn run_bulk_conversion(&self, target: &Path, sink: &dyn LogSink) -> u8 {
        let files = find_media_files(target);

        if files.is_empty() {
            sink.info("No webm/mkv files found in path");
            return exit::DOWNLOAD_ERROR;
        }

        if !self.ffmpeg.available().await {
            sink.error(&RippedError::ToolUnavailable { tool: "ffmpeg" }.to_string());
            return exit::DOWNLOAD_ERROR;
        }

        let mut success_count = 0usize;
        let mut failure_count = 0usize;

        // Interruption is checked between files only: the in-flight
        // conversion always finishes (or cleans up its own partial output),
        // so a mid-file Ctrl+C never strands a half-written MP4.
        let interrupt = SweepInterrupt::arm();
        for file in &files {
            if interrupt.interrupted() {
                sink.info("Conversion interrupted by user; leaving existing files untouched.");
                break;
            }
            sink.info(&format!("Converting: {}", file.display()));
            match self.convert_to_mp4(file, sink).await {
                Ok(outcome) if outcome.is_success() => success_count += 1,
                Ok(_) => failure_count += 1,
                Err(err) => {
                    sink.error(&err.to_string());
                    failure_count += 1;
                }
            }
        }
        drop(interrupt);

        let processed = success_count + failure_count;
        sink.info(&format!(
            "Processed {processed} files: {success_count} converted, {failure_count} failed"
        ));

        if success_count > 0 {
            exit::OK
        } else {
            exit::DOWNLOAD_ERROR
        }
    }
}

static SWEEP_ACTIVE: AtomicBool = AtomicBool::new(false);
static SWEEP_INTERRUPTED: AtomicBool = AtomicBool::new(false);
static LISTENER_SPAWNED: AtomicBool = AtomicBool::new(false);

/// Sweep-scoped Ctrl+C boundary.
///
/// Tokio's SIGINT handler stays installed for the life of the process once
/// `ctrl_c()` has been awaited, so a single listener task is spawned on
/// first use and owns the signal from then on: during a sweep it records
/// the interruption for the loop to check between files; outside a sweep it
/// keeps SIGINT's usual meaning by terminating the process.
struct SweepInterrupt;

impl SweepInterrupt {
    fn arm() -> Self {
        SWEEP_INTERRUPTED.store(false, Ordering::SeqCst);
        SWEEP_ACTIVE.store(true, Ordering::SeqCst);
        if !LISTENER_SPAWNED.swap(true, Ordering::SeqCst) {
            tokio::spawn(async {
                loop {
                    if tokio::signal::ctrl_c().await.is_err() {
                        return;
                    }
                    if SWEEP_ACTIVE.load(Ordering::SeqCst) {
                        SWEEP_INTERRUPTED.store(true, Ordering::SeqCst);
                    } else {
                        std::process::exit(130);
                    }
                }
            });
        }
        SweepInterrupt
    }

    fn interrupted(&self) -> bool {
        SWEEP_INTERRUPTED.load(Ordering::SeqCst)
    }
}

impl Drop for SweepInterrupt {
    fn drop(&mut self) {
        SWEEP_ACTIVE.store(false, Ordering::SeqCst);
    }
}

fn remove_partial(path: &Path) {
    if path.exists() {
        if let Err(err) = fs_err::remove_file(path) {
            tracing::warn!("could not remove partial output {}: {err}", path.display());
        }
    }
}

/// All webm/mkv files under the given path (recursive, deterministic order).
/// A matching single file yields itself; anything else yields nothing.
pub fn find_media_files(target: &Path) -> Vec<PathBuf> {
    if target.is_file() {
        return if is_convertible(target) {
            vec![target.to_path_buf()]
        } else {
            Vec::new()
        };
    }

    if !target.is_dir() {
        return Vec::new();
    }

    let mut matches = Vec::new();
    collect_media_files(target, &mut matches);
    matches
}

fn collect_media_files(dir: &Path, matches: &mut Vec<PathBuf>) {
    let Ok(entries) = fs_err::read_dir(dir) else {
        return;
    };
    let mut entries: Vec<_> = entries.flatten().map(|entry| entry.path()).collect();
    entries.sort();
    for path in entries {
        if path.is_dir() {
            collect_media_files(&path, matches);
        } else if is_convertible(&path) {
            matches.push(path);
        }
    }
}

fn is_convertible(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| CONVERTIBLE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// First free output name: the base itself, then `stem_converted`, then
/// `stem_converted_2`, `stem_converted_3`, and so on. Never returns a path
/// that already exists.
pub fn dedupe_output_path(base: &Path) -> PathBuf {
    if !base.exists() {
        return base.to_path_buf();
    }

    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = base
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut counter = 1usize;
    loop {
        let name = if counter == 1 {
            format!("{stem}_converted.{extension}")
        } else {
            format!("{stem}_converted_{counter}.{extension}")
        };
        let candidate = base.with_file_name(name);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}
