//! Stored dataset model

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A file kept in the storage directory, addressed by its sanitized name
#[derive(Debug, Clone, Serialize)]
pub struct StoredFile {
    pub name: String,
    #[serde(skip_serializing)]
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified_at: Option<DateTime<Utc>>,
}

impl StoredFile {
    /// Human readable size for the file list
    pub fn display_size(&self) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        match self.size_bytes {
            s if s >= MB => format!("{:.1} MB", s as f64 / MB as f64),
            s if s >= KB => format!("{:.1} KB", s as f64 / KB as f64),
            s => format!("{} B", s),
        }
    }

    /// Last-modified time for the file list, in UTC
    pub fn display_modified(&self) -> Option<String> {
        self.modified_at
            .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
    }
}
