//! Explicit log sink passed into the orchestration layer.
//!
//! Orchestration code reports user-facing progress through a [`LogSink`]
//! handed in by the caller: the one-shot commands use [`ConsoleSink`], the
//! interactive menu substitutes a [`BufferSink`] for its lifetime so the
//! redrawn screen can show recent activity. Ambient `tracing` diagnostics
//! are separate and unaffected.

use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

pub trait LogSink: Send + Sync {
    fn log(&self, level: Level, message: &str);

    fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }
}

/// Default sink: timestamped lines, errors on stderr.
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn log(&self, level: Level, message: &str) {
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        match level {
            Level::Error => eprintln!("[{timestamp}] {}: {message}", level.as_str()),
            _ => println!("[{timestamp}] {}: {message}", level.as_str()),
        }
    }
}

/// Bounded FIFO of the most recent log entries; overflow evicts oldest.
pub struct BufferSink {
    entries: Mutex<VecDeque<(Level, String)>>,
    capacity: usize,
}

impl BufferSink {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Snapshot of the buffered entries, oldest first.
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }
}

impl LogSink for BufferSink {
    fn log(&self, level: Level, message: &str) {
        // A panic in another thread must not take logging down with it.
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push_back((level, message.to_string()));
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_sink_survives_poisoned_lock() {
        use std::sync::Arc;

        let sink = Arc::new(BufferSink::new(4));
        let poisoner = Arc::clone(&sink);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.entries.lock().unwrap();
            panic!("poison the buffer lock");
        })
        .join();

        sink.info("still works");
        let entries = sink.entries();
        assert_eq!(entries.last().unwrap().1, "still works");
    }

    #[test]
    fn test_buffer_sink_evicts_oldest() {
        let sink = BufferSink::new(3);
        for i in 0..5 {
            sink.info(&format!("message {i}"));
        }
        let entries = sink.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].1, "message 2");
        assert_eq!(entries[2].1, "message 4");
    }

    #[test]
    fn test_buffer_sink_keeps_levels() {
        let sink = BufferSink::new(8);
        sink.info("ok");
        sink.error("boom");
        let entries = sink.entries();
        assert_eq!(entries[0].0, Level::Info);
        assert_eq!(entries[1].0, Level::Error);
    }
}
