//! CLI progress: renders batch events as an indicatif bar.

use crate::batch::BatchEvent;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc::UnboundedReceiver;

fn terminal_columns() -> Option<usize> {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
}

fn bar_template() -> &'static str {
    match terminal_columns() {
        Some(cols) if cols >= 110 => "{bar:40.cyan/blue} {pos}/{len} {elapsed_precise} {msg}",
        Some(cols) if cols >= 80 => "{wide_bar:.cyan/blue} {pos}/{len} {msg}",
        _ => "{wide_bar:.cyan/blue} {percent}% {msg}",
    }
}

/// Progress bar driven by [`BatchEvent`]s; a hidden renderer draws nothing.
pub struct BatchProgress {
    bar: Option<ProgressBar>,
}

impl BatchProgress {
    pub fn new(visible: bool) -> Self {
        Self {
            bar: visible.then(|| ProgressBar::new(0)),
        }
    }

    pub fn hidden() -> Self {
        Self { bar: None }
    }

    pub fn handle(&mut self, event: &BatchEvent) {
        let Some(bar) = &self.bar else {
            return;
        };
        match event {
            BatchEvent::BatchStarted { total, .. } => {
                bar.set_length(*total as u64);
                bar.set_style(
                    ProgressStyle::with_template(bar_template())
                        .unwrap_or_else(|_| ProgressStyle::default_bar()),
                );
                bar.set_message("starting");
            }
            BatchEvent::EntryStarted { title, .. } => {
                bar.set_message(title.clone());
            }
            BatchEvent::EntrySkipped { title, .. } => {
                bar.inc(1);
                bar.set_message(format!("{} (skipped)", title));
            }
            BatchEvent::EntrySaved { title, .. } => {
                bar.inc(1);
                bar.set_message(format!("{} (saved)", title));
            }
            BatchEvent::EntryFailed { title, .. } => {
                bar.inc(1);
                bar.set_message(format!("{} (failed)", title));
            }
            BatchEvent::BatchFinished { failed, .. } => {
                if *failed > 0 {
                    bar.abandon_with_message(format!("done, {} failed", failed));
                } else {
                    bar.finish_with_message("done");
                }
            }
        }
    }

    fn finish_clear(&self) {
        if let Some(bar) = &self.bar {
            if !bar.is_finished() {
                bar.finish_and_clear();
            }
        }
    }
}

/// Drain the channel until the sending task drops its end.
pub async fn render_events(mut events: UnboundedReceiver<BatchEvent>, mut progress: BatchProgress) {
    while let Some(event) = events.recv().await {
        progress.handle(&event);
    }
    progress.finish_clear();
}
