//! Review document rendering and persistence.
//!
//! One markdown file per entry, named after the sanitized primary title.

use crate::catalog::MusicEntry;
use crate::error::ReviewError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;

/// Stem used when a title sanitizes to nothing.
pub const FALLBACK_STEM: &str = "untitled";

/// Turn an arbitrary title into a safe file stem.
///
/// Characters other than alphanumerics, `_`, whitespace, `.` and `-` become
/// `_`; whitespace runs collapse into a single `_`; leading and trailing `.`
/// and `_` are removed.
pub fn sanitize_filename(name: &str) -> String {
    let mut stem = String::with_capacity(name.len());
    let mut in_whitespace = false;

    for c in name.nfc() {
        if c.is_whitespace() {
            if !in_whitespace {
                stem.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c.is_alphanumeric() || matches!(c, '_' | '.' | '-') {
            stem.push(c);
        } else {
            stem.push('_');
        }
    }

    let trimmed = stem.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        trimmed.to_string()
    }
}

/// File name of the review document for an entry.
pub fn document_file_name(entry: &MusicEntry) -> String {
    format!("{}.md", sanitize_filename(entry.primary_title()))
}

/// Markdown document: heading, metadata list, review body.
pub fn render_document(entry: &MusicEntry, review: &str) -> String {
    format!(
        "# {title} - 乐评

- 表演者: {performer}
- 发行时间: {release_time}
- 流派: {genre}
- 专辑类型: {album_type}
- 介质: {medium}
- 评分: {rating}

{review}
",
        title = entry.title,
        performer = entry.performer,
        release_time = entry.release_time,
        genre = entry.genre,
        album_type = entry.album_type,
        medium = entry.medium,
        rating = entry.rating,
        review = review.trim_end(),
    )
}

/// What happened to a document on write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Created(PathBuf),
    Overwritten(PathBuf),
}

impl WriteOutcome {
    pub fn path(&self) -> &Path {
        match self {
            WriteOutcome::Created(path) | WriteOutcome::Overwritten(path) => path,
        }
    }
}

/// Writes review documents into one output directory.
#[derive(Debug, Clone)]
pub struct ReviewWriter {
    output_dir: PathBuf,
    skip_existing: bool,
}

impl ReviewWriter {
    pub fn new(output_dir: impl Into<PathBuf>, skip_existing: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            skip_existing,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn skip_existing(&self) -> bool {
        self.skip_existing
    }

    pub fn path_for(&self, entry: &MusicEntry) -> PathBuf {
        self.output_dir.join(document_file_name(entry))
    }

    /// The existing document that makes generation unnecessary, if the skip
    /// policy is on and one is present.
    pub async fn existing_document(&self, entry: &MusicEntry) -> Option<PathBuf> {
        if !self.skip_existing {
            return None;
        }
        let path = self.path_for(entry);
        match fs::try_exists(&path).await {
            Ok(true) => Some(path),
            _ => None,
        }
    }

    /// Render and write the document, creating the output directory on demand.
    pub async fn write(&self, entry: &MusicEntry, review: &str) -> Result<WriteOutcome, ReviewError> {
        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| ReviewError::io(&self.output_dir, e))?;

        let path = self.path_for(entry);
        let existed = fs::try_exists(&path).await.unwrap_or(false);
        let content = render_document(entry, review);

        // Write beside the target then rename so a crash never leaves half a review.
        let staging = path.with_extension("md.partial");
        fs::write(&staging, content.as_bytes())
            .await
            .map_err(|e| ReviewError::io(&staging, e))?;
        if let Err(e) = fs::rename(&staging, &path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(ReviewError::io(&path, e));
        }

        info!(path = %path.display(), bytes = content.len(), "Saved review");
        if existed {
            debug!(path = %path.display(), "Replaced existing review");
            Ok(WriteOutcome::Overwritten(path))
        } else {
            Ok(WriteOutcome::Created(path))
        }
    }
}
