//! Manifest line format: `<link> <file name>`, split on a single space.

use super::error::{ManifestError, Result};

const DELIMITER: char = ' ';

/// One requested download: fetch `link` and store it as `destination`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub link: String,
    pub destination: String,
}

/// Parse one manifest line (`line_no` is 1-based, used in errors).
/// Returns `Ok(None)` for blank lines.
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<ManifestEntry>> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    let mut parts = line.split(DELIMITER);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(link), Some(destination), None) if !link.is_empty() && !destination.is_empty() => {
            Ok(Some(ManifestEntry {
                link: link.to_string(),
                destination: destination.to_string(),
            }))
        }
        _ => Err(ManifestError::Format {
            line: line_no,
            content: line.to_string(),
        }),
    }
}
