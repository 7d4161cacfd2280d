//! Terminal status reporting
//!
//! The operator surface has three parts: a one-line connection status that is
//! overwritten in place, an append-only timestamped session log, and the
//! video feed banner. The session log can be switched off in config; the
//! status line and video banner are always rendered.

use chrono::Local;
use colored::Colorize;

/// Severity of a status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Danger,
}

/// One session log line
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: String,
    pub message: String,
}

/// Renders operator-facing state to the terminal
pub struct StatusReporter {
    status: Option<(String, Severity)>,
    video: Option<(String, Severity)>,
    log: Vec<LogEntry>,
    log_enabled: bool,
}

impl StatusReporter {
    pub fn new(log_enabled: bool) -> Self {
        Self {
            status: None,
            video: None,
            log: Vec::new(),
            log_enabled,
        }
    }

    /// Replace the connection status line; overwrites, never appends
    pub fn update_status(&mut self, message: impl Into<String>, severity: Severity) {
        let message = message.into();
        render_line("status", &message, severity);
        self.status = Some((message, severity));
    }

    /// Replace the video feed banner; last writer wins
    pub fn update_video(&mut self, message: impl Into<String>, severity: Severity) {
        let message = message.into();
        render_line("video", &message, severity);
        self.video = Some((message, severity));
    }

    /// Append one timestamped entry to the session log
    ///
    /// Unbounded and append-only. A no-op when the log channel is disabled.
    pub fn add_log_entry(&mut self, message: impl Into<String>) {
        if !self.log_enabled {
            return;
        }

        let entry = LogEntry {
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            message: message.into(),
        };
        println!(
            "{}",
            format!("[{}] {}", entry.timestamp, entry.message).dimmed()
        );
        self.log.push(entry);
    }

    pub fn status(&self) -> Option<&(String, Severity)> {
        self.status.as_ref()
    }

    pub fn video_banner(&self) -> Option<&(String, Severity)> {
        self.video.as_ref()
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }
}

fn render_line(label: &str, message: &str, severity: Severity) {
    let painted = match severity {
        Severity::Success => message.green(),
        Severity::Danger => message.red().bold(),
    };
    println!("{} {}", format!("[{}]", label).bold(), painted);
}
