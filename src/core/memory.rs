//! Persistent memory backed by an append-only text file
//!
//! Each entry is one line of the form `[<YYYY-MM-DD HH:MM:SS>] <content>`.
//! Entries are never edited or deleted; reads always return the whole log.
//! I/O failures are converted to human-readable strings at this boundary
//! so a broken disk degrades a tool result instead of killing the turn.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::Local;

/// Sentinel returned when the memory file does not exist yet.
pub const MEMORY_EMPTY_NO_ENTRIES: &str = "Memory is empty. No previous entries found.";

/// Sentinel returned when the memory file exists but holds no entries.
pub const MEMORY_EMPTY: &str = "Memory is empty.";

/// File-backed memory store
pub struct MemoryStore {
    path: PathBuf,
}

impl MemoryStore {
    /// Create a store over the given file path. The file itself is only
    /// created on the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append one timestamped entry to the log.
    ///
    /// Returns a confirmation string on success and a descriptive error
    /// string on failure; errors never propagate past the store.
    pub fn append(&self, content: &str) -> String {
        match self.try_append(content) {
            Ok(()) => format!("Successfully wrote to memory: {content}"),
            Err(e) => format!("Error writing to memory: {e}"),
        }
    }

    fn try_append(&self, content: &str) -> io::Result<()> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "[{timestamp}] {content}")
    }

    /// Read the full log.
    ///
    /// An absent or blank file yields a sentinel message; I/O failures
    /// are returned as descriptive strings, same as [`append`](Self::append).
    pub fn read_all(&self) -> String {
        if !self.path.exists() {
            return MEMORY_EMPTY_NO_ENTRIES.to_string();
        }

        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let content = content.trim();
                if content.is_empty() {
                    MEMORY_EMPTY.to_string()
                } else {
                    format!("Memory contents:\n{content}")
                }
            }
            Err(e) => format!("Error reading from memory: {e}"),
        }
    }
}
