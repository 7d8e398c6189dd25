//! Upload validation
//!
//! Extension allow-list and filename sanitizing for dataset uploads.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Extensions accepted for upload (compared lower-cased)
pub const ALLOWED_EXTENSIONS: [&str; 2] = ["csv", "xlsx"];

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^A-Za-z0-9_.-]").expect("static regex")
});

const WINDOWS_DEVICE_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// True when the name has a dot and an allowed suffix after the last one
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Reduce a client-supplied filename to a flat, portable name.
///
/// Accented letters fold to their ASCII base (`données.csv` becomes
/// `donnees.csv`) and other non-ASCII text is dropped. Path separators
/// become word breaks, so `../../etc/x.csv` turns into `etc_x.csv`. The
/// result may be empty.
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename.nfkd().filter(char::is_ascii).collect();
    let flat = ascii.replace(['/', '\\'], " ");
    let joined = flat.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE_CHARS.replace_all(&joined, "");
    let trimmed = cleaned.trim_matches(|c: char| c == '.' || c == '_');

    let stem = trimmed.split('.').next().unwrap_or_default();
    if WINDOWS_DEVICE_NAMES
        .iter()
        .any(|name| name.eq_ignore_ascii_case(stem))
    {
        return format!("_{}", trimmed);
    }

    trimmed.to_string()
}

/// Validate an upload name; returns the name to store under
pub fn accept_upload(filename: &str) -> Option<String> {
    if !allowed_file(filename) {
        return None;
    }
    let safe = secure_filename(filename);
    if safe.is_empty() || !allowed_file(&safe) {
        return None;
    }
    Some(safe)
}

/// True when `name` is already in sanitized form (safe to join onto the
/// storage directory)
pub fn is_secure(name: &str) -> bool {
    !name.is_empty() && secure_filename(name) == name
}
