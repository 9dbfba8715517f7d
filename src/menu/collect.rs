//! Interactive URL collection for bulk downloads.
//!
//! Two interchangeable implementations of one capability: a live collector
//! that polls the clipboard while taking non-blocking keyboard input in raw
//! mode, and a plain line-by-line prompt used wherever raw terminal input
//! or clipboard access is not available.

use async_trait::async_trait;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use crossterm::tty::IsTty;
use std::io::Write;
use std::time::Duration;

use crate::cli::validate_url;
use crate::tools::Clipboard;
use crate::Result;

/// Poll cadence for the live collector. A tuning constant, not a hard
/// requirement: short enough that a copied URL appears queued immediately,
/// long enough to keep the loop idle-cheap.
pub const CLIPBOARD_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[async_trait(?Send)]
pub trait UrlCollector {
    /// Collect URLs until the user finishes with `q`. Every returned entry
    /// has passed URL validation.
    async fn collect(&mut self, clipboard: &Clipboard) -> Result<Vec<String>>;
}

/// Pick the collector the environment can support.
pub fn select_collector(clipboard: &Clipboard) -> Box<dyn UrlCollector> {
    if live_capable(clipboard.available(), std::io::stdin().is_tty()) {
        Box::new(LiveCollector)
    } else {
        println!("Clipboard capture unavailable. Falling back to manual entry.");
        Box::new(PromptCollector)
    }
}

fn live_capable(clipboard_available: bool, stdin_is_tty: bool) -> bool {
    clipboard_available && stdin_is_tty
}

/// Raw-mode collector: clipboard changes are queued automatically, typed
/// lines are queued on Enter, `q` finishes.
pub struct LiveCollector;

#[async_trait(?Send)]
impl UrlCollector for LiveCollector {
    async fn collect(&mut self, clipboard: &Clipboard) -> Result<Vec<String>> {
        println!("Copy URLs to queue them automatically. Press 'q' to start downloads.");
        println!("You can still type a URL and press Enter to add it manually.");
        println!("Listening for clipboard changes...");

        terminal::enable_raw_mode()?;
        let result = live_loop(clipboard).await;
        terminal::disable_raw_mode()?;
        result
    }
}

async fn live_loop(clipboard: &Clipboard) -> Result<Vec<String>> {
    let mut urls: Vec<String> = Vec::new();
    // React only to clipboard values copied after entering bulk mode.
    let mut last_clip = clipboard.read();
    let mut buffer = String::new();

    loop {
        if let Some(text) = clipboard.read() {
            if last_clip.as_deref() != Some(text.as_str()) {
                // Non-URL clipboard content is ignored silently.
                if let Ok(url) = validate_url(&text) {
                    urls.push(url);
                    echo(&format!(
                        "\r\n[+] Added from clipboard: {} (total {})\r\n",
                        urls.last().map(String::as_str).unwrap_or_default(),
                        urls.len()
                    ));
                }
                last_clip = Some(text);
            }
        }

        while event::poll(Duration::ZERO)? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Char('Q') => {
                    echo("\r\nStarting downloads...\r\n");
                    return Ok(urls);
                }
                KeyCode::Enter => {
                    let entry = buffer.trim().to_string();
                    buffer.clear();
                    if entry.is_empty() {
                        continue;
                    }
                    match validate_url(&entry) {
                        Ok(url) => {
                            echo(&format!("\r\n[+] Added: {url} (total {})\r\n", urls.len() + 1));
                            urls.push(url);
                        }
                        Err(err) => echo(&format!("\r\n{err}\r\n")),
                    }
                }
                KeyCode::Backspace => {
                    if buffer.pop().is_some() {
                        echo("\u{8} \u{8}");
                    }
                }
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    buffer.push(c);
                    echo(&c.to_string());
                }
                _ => {}
            }
        }

        tokio::time::sleep(CLIPBOARD_POLL_INTERVAL).await;
    }
}

fn echo(text: &str) {
    let mut out = std::io::stdout();
    let _ = out.write_all(text.as_bytes());
    let _ = out.flush();
}

/// Blocking fallback: one URL per line, `q` alone finishes, an empty line
/// consumes the clipboard when something is on it.
pub struct PromptCollector;

#[async_trait(?Send)]
impl UrlCollector for PromptCollector {
    async fn collect(&mut self, clipboard: &Clipboard) -> Result<Vec<String>> {
        println!("Enter URLs one per line. Type 'q' alone to start queueing downloads.");
        println!("Press Enter on an empty line to use the clipboard if detected.");

        let mut urls = Vec::new();
        loop {
            let clip = clipboard.read();
            if let Some(text) = &clip {
                println!("(Clipboard: {text})");
            }
            let Some(line) = super::read_line("> ") else {
                break;
            };
            let mut entry = line.trim().to_string();
            if entry.eq_ignore_ascii_case("q") {
                break;
            }
            if entry.is_empty() {
                if let Some(text) = clip {
                    entry = text;
                }
            }
            if entry.is_empty() {
                println!("No URL entered.");
                continue;
            }
            match validate_url(&entry) {
                Ok(url) => urls.push(url),
                Err(err) => println!("{err}"),
            }
        }
        Ok(urls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_capable_requires_both_probes() {
        assert!(live_capable(true, true));
        assert!(!live_capable(false, true));
        assert!(!live_capable(true, false));
        assert!(!live_capable(false, false));
    }
}
