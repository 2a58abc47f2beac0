//! Filename sanitizing.

use std::ffi::OsStr;
use thiserror::Error;

/// Characters stripped from filenames.
const SCRUB_CHARS: &[char] = &['<', '>', '\\', '/', ':', '*', '?', '"', '|', '%'];

/// Highest code point treated as a control character.
const MAX_CONTROL: u32 = 30;

/// Errors raised while sanitizing filenames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilenameError {
    /// The filename is not valid Unicode.
    #[error("filename must be a str, got {0:?}")]
    NotUnicode(String),
}

/// Strip characters that are unsafe in filenames and normalize whitespace.
///
/// Removes `<>\/:*?"|%` and control characters, collapses every run of
/// whitespace into one space and trims both ends.
///
/// ```rust
/// use tubesync_common::filename::clean_filename;
///
/// assert_eq!(clean_filename("  My: Video?  |  Part 1 "), "My Video Part 1");
/// ```
pub fn clean_filename(name: impl AsRef<str>) -> String {
    let scrubbed: String = name
        .as_ref()
        .chars()
        .filter(|c| !SCRUB_CHARS.contains(c) && u32::from(*c) > MAX_CONTROL)
        .collect();

    // U+001F survives the control filter but still separates words.
    scrubbed
        .split(|c: char| c.is_whitespace() || c == '\u{1f}')
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sanitize a filename taken from the operating system.
pub fn clean_os_filename(name: &OsStr) -> Result<String, FilenameError> {
    name.to_str()
        .map(clean_filename)
        .ok_or_else(|| FilenameError::NotUnicode(name.to_string_lossy().into_owned()))
}
