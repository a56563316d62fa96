//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ReviewError;

/// Map domain errors to a string for CLI output, with a hint where one helps.
pub fn map_error(e: &ReviewError) -> String {
    match e {
        ReviewError::MissingCredential { .. } => format!(
            "{}\nHint: run with --simulate to try the pipeline without a key.",
            e
        ),
        ReviewError::Io { path, source } if source.kind() == std::io::ErrorKind::NotFound => {
            format!(
                "{}\nHint: {} does not exist; pass --input <file>.",
                e,
                path.display()
            )
        }
        _ => e.to_string(),
    }
}
