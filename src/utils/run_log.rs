use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::utils::constants::LOG_DATE_FORMAT;
use crate::utils::filename::log_file_name;

/// Ordered, timestamped record of one pipeline run.
///
/// Every line is also forwarded to `tracing` so it shows up on the console;
/// the buffer itself is what gets persisted with [`RunLog::save`].
#[derive(Debug, Default)]
pub struct RunLog {
    lines: Vec<String>,
}

impl RunLog {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    pub fn log(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        let timestamp = Local::now().format(LOG_DATE_FORMAT);
        self.lines.push(format!("[{}] {}", timestamp, message));
        if !message.trim().is_empty() {
            info!("{}", message);
        }
    }

    pub fn section(&mut self, title: &str) {
        let rule = "=".repeat(80);
        self.log(&rule);
        self.log(title);
        self.log(&rule);
    }

    pub fn blank(&mut self) {
        self.log("");
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Write the buffer to `{dir}/{prefix}_{YYYYmmdd_HHMMSS}.log`
    pub fn save(&self, dir: &Path, prefix: &str) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(log_file_name(prefix, Local::now()));
        fs::write(&path, self.lines.join("\n"))?;
        Ok(path)
    }
}

/// Thousands-separated count, e.g. `12,345`
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `part / whole` as a percentage, 0 for an empty whole
pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
