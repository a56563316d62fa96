//! CLI domain: parse, route, interactive session, progress, output, and
//! presentation. Batch orchestration lives in [`crate::batch`].

mod interactive;
mod output;
mod parse;
mod presentation;
mod progress;
mod route;

pub use interactive::run_interactive;
pub use output::map_error;
pub use parse::Cli;
pub use presentation::{format_summary_line, format_summary_text};
pub use progress::{render_events, BatchProgress};
pub use route::{RunContext, RunOverrides};
