//! CLI presentation: batch summary rendering (comfy-table + styled headings).

use crate::batch::{BatchSummary, EntryStatus};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// One-line totals, e.g. `3 entries: 2 saved, 1 skipped, 0 failed (12.4s)`.
pub fn format_summary_line(summary: &BatchSummary) -> String {
    format!(
        "{} entries: {} saved, {} skipped, {} failed ({:.1}s)",
        summary.total,
        summary.saved,
        summary.skipped,
        summary.failed,
        summary.elapsed.as_secs_f64()
    )
}

/// Per-entry outcome table followed by the totals line.
pub fn format_summary_text(summary: &BatchSummary, color: bool) -> String {
    let mut out = String::new();
    let heading = if color {
        format_section_heading("Batch summary")
    } else {
        "Batch summary".to_string()
    };
    out.push_str(&format!("{}\n\n", heading));
    out.push_str(&format!("  Input: {}\n", summary.input.display()));
    out.push_str(&format!(
        "  Started: {}\n\n",
        summary.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if summary.outcomes.is_empty() {
        out.push_str("No entries found.\n");
        return out;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["#", "Title", "Status", "Detail"]);
    for outcome in &summary.outcomes {
        let (status, detail) = match &outcome.status {
            EntryStatus::Saved { path } => (
                paint("saved", color, |s| s.green().to_string()),
                path.display().to_string(),
            ),
            EntryStatus::Skipped { path } => (
                paint("skipped", color, |s| s.yellow().to_string()),
                path.display().to_string(),
            ),
            EntryStatus::Failed { error } => (
                paint("failed", color, |s| s.red().to_string()),
                error.clone(),
            ),
        };
        table.add_row(vec![outcome.index.clone(), outcome.title.clone(), status, detail]);
    }
    out.push_str(&format!("{}\n\n", table));
    out.push_str(&format_summary_line(summary));
    out.push('\n');
    out
}

fn paint(label: &str, color: bool, style: impl Fn(&str) -> String) -> String {
    if color {
        style(label)
    } else {
        label.to_string()
    }
}
