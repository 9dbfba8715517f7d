//! Interactive control loop: a single-threaded, blocking menu redrawn each
//! iteration. Holds the current mode/quality defaults, routes orchestration
//! logging into a bounded buffer so the redrawn screen can show recent
//! activity, and dispatches to the same orchestration primitives as the
//! one-shot commands. The loop never terminates itself on an operation
//! failure, only via explicit exit (or stdin EOF).

pub mod collect;
pub mod frame;

use console::Term;
use std::io::Write;

use crate::cli::{self, format_quality_label, Mode};
use crate::config::{Config, QUALITY_CHOICES};
use crate::convert::Converter;
use crate::download::Downloader;
use crate::exit;
use crate::logging::BufferSink;
use crate::tools::Clipboard;

/// Number of log entries kept on the menu screen.
const LOG_CAPACITY: usize = 8;

/// Result of the quality prompt. A dedicated no-selection marker keeps
/// "invalid input" distinguishable from a legitimate "max" choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualitySelection {
    NoSelection,
    Unbounded,
    Bounded(u32),
}

struct MenuState {
    mode: Mode,
    quality: Option<u32>,
    status_message: String,
    status_progress: Option<f64>,
    last_feedback: String,
}

impl MenuState {
    fn new() -> Self {
        Self {
            mode: Mode::Video,
            quality: None,
            status_message: "Ready".to_string(),
            status_progress: None,
            last_feedback: "Awaiting command.".to_string(),
        }
    }

    fn idle(&mut self) {
        self.status_message = "Ready".to_string();
        self.status_progress = None;
    }

    fn busy(&mut self, message: &str, progress: f64) {
        self.status_message = message.to_string();
        self.status_progress = Some(progress);
    }
}

/// Run the interactive menu until the user exits.
pub async fn run_menu(config: &Config) -> u8 {
    let downloader = Downloader::new(config);
    let converter = Converter::new(config);
    let clipboard = Clipboard::new();
    // The loop's scoped log sink; orchestration output lands here instead
    // of the console while the menu is active.
    let sink = BufferSink::new(LOG_CAPACITY);
    let mut state = MenuState::new();

    loop {
        render(&state, &sink);

        let Some(choice) = read_line("> ") else {
            println!("Goodbye.");
            return exit::OK;
        };

        match choice.trim() {
            "1" => {
                let Some(url) = prompt_for_url(&clipboard) else {
                    println!("No URL provided.");
                    continue;
                };
                state.busy("Downloading...", 0.0);
                let code = downloader
                    .perform_download(state.mode, state.quality, &url, &sink)
                    .await;
                if code != exit::OK {
                    println!("Download finished with exit code {code}");
                    state.last_feedback = format!("Download finished with exit code {code}");
                } else {
                    state.last_feedback = format!("Download complete\nURL: {url}");
                }
                state.idle();
            }
            "2" => {
                let mut collector = collect::select_collector(&clipboard);
                let urls = match collector.collect(&clipboard).await {
                    Ok(urls) => urls,
                    Err(err) => {
                        println!("URL collection failed: {err:#}");
                        continue;
                    }
                };
                if urls.is_empty() {
                    println!("No URLs provided.");
                    continue;
                }
                println!("\nQueued {} URLs. Starting downloads...", urls.len());
                for (idx, url) in urls.iter().enumerate() {
                    println!("[{}/{}] {url}", idx + 1, urls.len());
                    state.busy(
                        &format!("Downloading {}/{}...", idx + 1, urls.len()),
                        (idx + 1) as f64 / urls.len() as f64,
                    );
                    let code = downloader
                        .perform_download(state.mode, state.quality, url, &sink)
                        .await;
                    if code != exit::OK {
                        println!("  -> Failed with exit code {code}");
                    }
                }
                println!("Bulk download complete.");
                state.last_feedback = format!("Bulk download complete ({} items).", urls.len());
                state.idle();
            }
            "3" => {
                let Some(raw) = read_line("Enter file or directory to convert: ") else {
                    continue;
                };
                let raw = raw.trim();
                if raw.is_empty() {
                    println!("No path provided.");
                    continue;
                }
                let Ok(path) = cli::validate_path(raw) else {
                    println!("Path does not exist.");
                    continue;
                };
                state.busy("Converting...", 0.0);
                let code = converter.run_bulk_conversion(&path, &sink).await;
                if code != exit::OK {
                    println!("Conversion finished with exit code {code}");
                    state.last_feedback = format!("Conversion finished with exit code {code}");
                } else {
                    state.last_feedback = format!("Conversion complete\nPath: {raw}");
                }
                state.idle();
            }
            "4" => {
                if let Some(mode) = prompt_mode() {
                    state.mode = mode;
                    state.last_feedback = format!("Mode set to {mode}");
                }
            }
            "5" => match prompt_quality() {
                QualitySelection::NoSelection => {}
                QualitySelection::Unbounded => {
                    state.quality = None;
                    state.last_feedback = "Quality set to max".to_string();
                }
                QualitySelection::Bounded(height) => {
                    state.quality = Some(height);
                    state.last_feedback = format!("Quality set to {height}");
                }
            },
            "6" => {
                println!("Goodbye.");
                return exit::OK;
            }
            _ => {
                println!("Invalid choice. Please select 1-6.");
                state.last_feedback = "Invalid choice.".to_string();
            }
        }
    }
}

fn render(state: &MenuState, sink: &BufferSink) {
    let _ = Term::stdout().clear_screen();
    println!("{}", frame::BANNER.trim_start_matches('\n'));
    println!("{}", frame::border());
    println!("{}", frame::row_center("RIPPED CONTROL DECK"));
    println!(
        "{}",
        frame::row(&format!(
            "Mode: {:<8} | Quality: {}",
            state.mode.as_str(),
            format_quality_label(state.quality)
        ))
    );
    println!("{}", frame::row(&format!("Status: {}", state.status_message)));
    if let Some(progress) = state.status_progress {
        println!("{}", frame::progress_row("Activity", progress));
    }
    println!("{}", frame::border());
    println!("{}", frame::row_center("MAIN MENU"));
    println!("{}", frame::row("1) Download single URL"));
    println!("{}", frame::row("2) Bulk download (enter URLs, 'q' to finish)"));
    println!("{}", frame::row("3) Convert existing videos to MP4"));
    println!("{}", frame::row("4) Change mode"));
    println!("{}", frame::row("5) Change quality"));
    println!("{}", frame::row("6) Exit"));
    println!("{}", frame::border());
    println!("{}", frame::row_center("LAST ACTION"));
    for line in state.last_feedback.lines() {
        println!("{}", frame::row(line));
    }
    println!("{}", frame::border());
    println!("{}", frame::row_center("SESSION LOG"));
    let entries = sink.entries();
    if entries.is_empty() {
        println!("{}", frame::row("No log messages yet."));
    } else {
        for (level, message) in entries {
            println!("{}", frame::row(&format!("[{}] {message}", level.as_str())));
        }
    }
    println!("{}", frame::border());
    println!("{}", frame::row_center("SELECT OPTION"));
    println!("{}", frame::border());
}

/// Blocking line read; `None` means stdin is closed.
pub(crate) fn read_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    let _ = std::io::stdout().flush();

    let mut line = String::new();
    match std::io::stdin().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
    }
}

/// Prompt for a single URL, pre-filling from the clipboard when the user
/// submits an empty line.
fn prompt_for_url(clipboard: &Clipboard) -> Option<String> {
    let clip = clipboard.read();
    if let Some(text) = &clip {
        println!("(Clipboard detected: {text})");
    }

    let mut url = read_line("Enter URL (press Enter to use clipboard, or type/paste): ")?
        .trim()
        .to_string();
    if url.is_empty() {
        if let Some(text) = clip {
            url = text;
        }
    }
    if url.is_empty() {
        return None;
    }

    match cli::validate_url(&url) {
        Ok(url) => Some(url),
        Err(err) => {
            println!("{err}");
            None
        }
    }
}

fn prompt_mode() -> Option<Mode> {
    println!("\nSelect mode:");
    println!(" 1) audio");
    println!(" 2) video");
    let choice = read_line("Choice: ")?;
    match choice.trim() {
        "1" => Some(Mode::Audio),
        "2" => Some(Mode::Video),
        _ => {
            println!("Invalid choice.");
            None
        }
    }
}

fn prompt_quality() -> QualitySelection {
    println!("\nSelect quality:");
    for (idx, quality) in QUALITY_CHOICES.iter().enumerate() {
        println!(" {}) {}", idx + 1, format_quality_label(*quality));
    }
    let Some(choice) = read_line("Choice: ") else {
        return QualitySelection::NoSelection;
    };
    let selection = quality_from_choice(&choice);
    if selection == QualitySelection::NoSelection {
        println!("Invalid choice.");
    }
    selection
}

/// Map a 1-based menu choice onto the quality ladder.
fn quality_from_choice(choice: &str) -> QualitySelection {
    let Ok(index) = choice.trim().parse::<usize>() else {
        return QualitySelection::NoSelection;
    };
    if !(1..=QUALITY_CHOICES.len()).contains(&index) {
        return QualitySelection::NoSelection;
    }
    match QUALITY_CHOICES[index - 1] {
        None => QualitySelection::Unbounded,
        Some(height) => QualitySelection::Bounded(height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_from_choice_maps_ladder() {
        assert_eq!(quality_from_choice("1"), QualitySelection::Unbounded);
        assert_eq!(quality_from_choice("2"), QualitySelection::Bounded(360));
        assert_eq!(quality_from_choice("4"), QualitySelection::Bounded(720));
        assert_eq!(quality_from_choice("7"), QualitySelection::Bounded(2160));
    }

    #[test]
    fn test_quality_from_choice_rejects_out_of_range() {
        assert_eq!(quality_from_choice("0"), QualitySelection::NoSelection);
        assert_eq!(quality_from_choice("8"), QualitySelection::NoSelection);
        assert_eq!(quality_from_choice("abc"), QualitySelection::NoSelection);
        assert_eq!(quality_from_choice(""), QualitySelection::NoSelection);
    }

    #[test]
    fn test_menu_state_defaults() {
        let state = MenuState::new();
        assert_eq!(state.mode, Mode::Video);
        assert_eq!(state.quality, None);
        assert_eq!(state.status_message, "Ready");
        assert!(state.status_progress.is_none());
    }
}
