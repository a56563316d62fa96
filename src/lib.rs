//! Crescendo: batch generation of short-form music review drafts.
//!
//! A markdown table of music entries goes in; one markdown review per entry
//! comes out, written by a chat-completion service that is paced and retried
//! with backoff. A simulation backend produces placeholder text offline.

pub mod batch;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod pacing;
pub mod review;
pub mod writer;

pub use batch::{run_batch, BatchEvent, BatchSummary, ProgressSink};
pub use catalog::{parse_row, parse_table, MusicEntry};
pub use error::ReviewError;
pub use review::{Backend, ReviewClient};
pub use writer::{sanitize_filename, ReviewWriter};
