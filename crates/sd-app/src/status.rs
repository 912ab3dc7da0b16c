//! User-facing status log.

use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub at: DateTime<Local>,
    pub text: String,
}

impl StatusLine {
    pub fn render(&self) -> String {
        format!("[{}] {}", self.at.format("%H:%M:%S"), self.text)
    }
}

/// Lines kept in memory when no capacity is given.
pub const DEFAULT_STATUS_CAPACITY: usize = 500;

/// Timestamped lines shown in the status panel, mirrored to a file while a
/// log path is set. Only the newest `capacity` lines stay in memory; the
/// mirror file keeps everything written while it was active.
#[derive(Debug, Clone)]
pub struct StatusLog {
    lines: VecDeque<StatusLine>,
    capacity: usize,
    path: Option<PathBuf>,
}

impl Default for StatusLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_STATUS_CAPACITY)
    }
}

impl StatusLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity.min(DEFAULT_STATUS_CAPACITY)),
            capacity,
            path: None,
        }
    }

    pub fn push(&mut self, text: impl Into<String>) {
        let line = StatusLine {
            at: Local::now(),
            text: text.into(),
        };
        tracing::info!(status = %line.text);
        if let Some(path) = &self.path {
            if let Err(err) = append(path, &line) {
                tracing::warn!(path = %path.display(), error = %err, "status log write failed");
            }
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn lines(&self) -> &VecDeque<StatusLine> {
        &self.lines
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Text of every line, oldest first.
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.back().map(|l| l.text.as_str())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// `None` stops mirroring.
    pub fn set_path(&mut self, path: Option<PathBuf>) {
        self.path = path;
    }
}

fn append(path: &Path, line: &StatusLine) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", line.render())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_kept_in_order() {
        let mut log = StatusLog::new();
        log.push("first");
        log.push(String::from("second"));
        assert_eq!(log.texts(), vec!["first", "second"]);
        assert_eq!(log.last(), Some("second"));
        assert!(log.lines()[0].render().ends_with("] first"));
    }

    #[test]
    fn oldest_lines_drop_past_capacity() {
        let mut log = StatusLog::with_capacity(3);
        for i in 0..5 {
            log.push(format!("line {i}"));
        }
        assert_eq!(log.texts(), vec!["line 2", "line 3", "line 4"]);
        assert_eq!(log.last(), Some("line 4"));
        assert_eq!(StatusLog::with_capacity(0).capacity(), 1);
    }

    #[test]
    fn mirrors_to_file_while_path_is_set() {
        let path = std::env::temp_dir().join(format!("sd-status-{}.log", std::process::id()));
        std::fs::remove_file(&path).ok();

        let mut log = StatusLog::new();
        log.push("before");
        log.set_path(Some(path.clone()));
        log.push("during");
        log.set_path(None);
        log.push("after");

        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("during"));
    }
}
