//! Whole-pipeline runs in simulation mode.

use super::test_utils::{markdown_files, write_table, TWO_ROW_TABLE};
use crescendo::batch::{run_batch, BatchEvent, EntryStatus, NoopSink};
use crescendo::pacing::ManualClock;
use crescendo::review::{Backend, ClientSettings, ReviewClient};
use crescendo::writer::ReviewWriter;
use parking_lot::Mutex;
use std::sync::Arc;
use tempfile::TempDir;

fn simulated_client(clock: &ManualClock) -> ReviewClient {
    ReviewClient::new(
        Backend::Simulation,
        ClientSettings::default(),
        Arc::new(clock.clone()),
    )
}

#[tokio::test]
async fn malformed_row_is_ignored_and_valid_row_is_written() {
    let temp = TempDir::new().unwrap();
    let input = write_table(temp.path(), TWO_ROW_TABLE);
    let out = temp.path().join("musicComments");
    let clock = ManualClock::new();
    let mut client = simulated_client(&clock);
    let writer = ReviewWriter::new(&out, true);

    let summary = run_batch(&input, &mut client, &writer, &NoopSink)
        .await
        .unwrap();

    assert_eq!(summary.total, 1);
    assert_eq!(summary.saved, 1);
    assert_eq!(summary.failed, 0);

    let files = markdown_files(&out);
    assert_eq!(files, vec![out.join("Hey_Jude.md")]);

    let doc = std::fs::read_to_string(&files[0]).unwrap();
    assert!(doc.starts_with("# Hey Jude! / 嘿 朱迪 - 乐评\n\n"));
    assert!(doc.contains("- 表演者: The Beatles\n"));
    assert!(doc.contains("- 发行时间: 1968-08-26\n"));
    assert!(doc.contains("- 流派: Rock\n"));
    assert!(doc.contains("- 专辑类型: 单曲\n"));
    assert!(doc.contains("- 介质: 黑胶\n"));
    assert!(doc.contains("- 评分: 9.5\n"));
    assert!(doc.contains("【模拟乐评】"));
    assert!(doc.contains("#Rock"));
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn second_run_skips_what_the_first_wrote() {
    let temp = TempDir::new().unwrap();
    let input = write_table(temp.path(), TWO_ROW_TABLE);
    let out = temp.path().join("musicComments");
    let clock = ManualClock::new();
    let writer = ReviewWriter::new(&out, true);

    run_batch(&input, &mut simulated_client(&clock), &writer, &NoopSink)
        .await
        .unwrap();
    let first = std::fs::read_to_string(out.join("Hey_Jude.md")).unwrap();
    std::fs::write(out.join("Hey_Jude.md"), "hand edited").unwrap();

    let events = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&events);
    let sink = move |event: BatchEvent| recorded.lock().push(event);
    let summary = run_batch(&input, &mut simulated_client(&clock), &writer, &sink)
        .await
        .unwrap();

    assert_eq!((summary.saved, summary.skipped), (0, 1));
    assert!(matches!(summary.outcomes[0].status, EntryStatus::Skipped { .. }));
    assert_eq!(
        std::fs::read_to_string(out.join("Hey_Jude.md")).unwrap(),
        "hand edited"
    );
    assert_ne!(first, "hand edited");
    assert!(events
        .lock()
        .iter()
        .any(|e| matches!(e, BatchEvent::EntrySkipped { position: 1, .. })));
}

#[tokio::test]
async fn table_without_entries_produces_nothing() {
    let temp = TempDir::new().unwrap();
    let input = write_table(temp.path(), "# Empty\n\nNothing here.\n");
    let out = temp.path().join("out");
    let clock = ManualClock::new();
    let summary = run_batch(
        &input,
        &mut simulated_client(&clock),
        &ReviewWriter::new(&out, true),
        &NoopSink,
    )
    .await
    .unwrap();

    assert_eq!(summary.total, 0);
    assert!(summary.outcomes.is_empty());
    assert!(markdown_files(&out).is_empty());
}
