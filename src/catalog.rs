//! Markdown table catalog
//!
//! Reads music entries out of a pipe-delimited markdown table with the fixed
//! eight-column schema `index | title | performer | release time | genre |
//! album type | medium | rating`. Headings, blank lines, separator rows and
//! header rows are not entries; malformed rows are skipped, never fatal.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Number of data columns in a catalog row.
pub const COLUMN_COUNT: usize = 8;

/// Segments produced by splitting a well-formed row on `|`: the empty text
/// before the leading pipe, eight fields, and whatever follows the last pipe.
const MIN_SEGMENTS: usize = COLUMN_COUNT + 1;

/// Header labels recognised in the first two columns.
const HEADER_LABELS: &[(&str, &str)] = &[
    ("序号", "歌曲名"),
    ("#", "title"),
    ("no", "title"),
    ("no.", "title"),
    ("index", "title"),
];

/// One parsed row of music metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicEntry {
    pub index: String,
    pub title: String,
    pub performer: String,
    pub release_time: String,
    pub genre: String,
    pub album_type: String,
    pub medium: String,
    pub rating: String,
    /// 1-based line in the source document; 0 when parsed from a lone line.
    #[serde(default)]
    pub line: usize,
}

impl MusicEntry {
    /// Title before the first `/`, which separates alternate names.
    pub fn primary_title(&self) -> &str {
        self.title.split('/').next().unwrap_or_default().trim()
    }
}

/// Parse one line of a markdown table.
///
/// Returns `None` for blank lines, headings, separator rows, header rows and
/// rows with fewer than eight fields.
pub fn parse_row(line: &str) -> Option<MusicEntry> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || is_separator_row(trimmed) {
        return None;
    }

    let parts: Vec<&str> = trimmed.split('|').map(str::trim).collect();
    if parts.len() < MIN_SEGMENTS {
        if trimmed.contains('|') {
            warn!(line = %trimmed, segments = parts.len(), "Skipping malformed table row");
        }
        return None;
    }

    if is_header(parts[1], parts[2]) {
        debug!(line = %trimmed, "Skipping table header row");
        return None;
    }

    Some(MusicEntry {
        index: parts[1].to_string(),
        title: parts[2].to_string(),
        performer: parts[3].to_string(),
        release_time: parts[4].to_string(),
        genre: parts[5].to_string(),
        album_type: parts[6].to_string(),
        medium: parts[7].to_string(),
        rating: parts[8].to_string(),
        line: 0,
    })
}

/// Parse every entry of a markdown document, in source order.
///
/// A row directly followed by a separator row is the column header and is
/// dropped even when its labels are not recognised.
pub fn parse_table(text: &str) -> Vec<MusicEntry> {
    let lines: Vec<&str> = text.lines().collect();
    let mut entries = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let followed_by_separator = lines
            .get(i + 1)
            .map(|next| is_separator_row(next.trim()))
            .unwrap_or(false);
        if followed_by_separator {
            debug!(line_number = i + 1, "Skipping row above separator");
            continue;
        }

        if let Some(mut entry) = parse_row(line) {
            entry.line = i + 1;
            entries.push(entry);
        }
    }

    debug!(count = entries.len(), "Parsed catalog");
    entries
}

/// A separator row holds only pipes, dashes, colons and whitespace, and at
/// least one dash.
fn is_separator_row(trimmed: &str) -> bool {
    trimmed.starts_with('|')
        && trimmed.contains('-')
        && trimmed
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':') || c.is_whitespace())
}

fn is_header(first: &str, second: &str) -> bool {
    let first = first.to_lowercase();
    let second = second.to_lowercase();
    HEADER_LABELS
        .iter()
        .any(|(index_label, title_label)| first == *index_label && second == *title_label)
}
