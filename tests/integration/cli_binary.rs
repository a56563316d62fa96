//! The `crescendo` binary end to end.

use super::test_utils::{markdown_files, write_table, TWO_ROW_TABLE};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Run the binary inside `dir` with a clean, isolated environment.
fn crescendo(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_crescendo"))
        .args(args)
        .current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env_remove("NVIDIA_API_KEY")
        .env_remove("CRESCENDO__API__API_KEY")
        .env_remove("CRESCENDO_LOG")
        .env_remove("CRESCENDO_LOG_OUTPUT")
        .env_remove("CRESCENDO_LOG_FORMAT")
        .output()
        .expect("run crescendo binary")
}

#[test]
fn simulate_run_writes_reviews_and_prints_summary() {
    let temp = TempDir::new().unwrap();
    write_table(temp.path(), TWO_ROW_TABLE);

    let output = crescendo(
        temp.path(),
        &["--simulate", "--input", "top.md", "--output-dir", "reviews"],
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let out = temp.path().join("reviews");
    assert_eq!(markdown_files(&out), vec![out.join("Hey_Jude.md")]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 entries: 1 saved, 0 skipped, 0 failed"));
    assert!(temp.path().join("crescendo.log").exists());
}

#[test]
fn quiet_run_prints_nothing_and_writes_no_log() {
    let temp = TempDir::new().unwrap();
    write_table(temp.path(), TWO_ROW_TABLE);

    let output = crescendo(
        temp.path(),
        &["--quiet", "--simulate", "--input", "top.md", "--output-dir", "reviews"],
    );
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert!(!temp.path().join("crescendo.log").exists());
    assert!(temp.path().join("reviews").join("Hey_Jude.md").exists());
}

#[test]
fn missing_credential_exits_with_code_one() {
    let temp = TempDir::new().unwrap();
    write_table(temp.path(), TWO_ROW_TABLE);

    let output = crescendo(temp.path(), &["--quiet", "--input", "top.md"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("NVIDIA_API_KEY"), "stderr: {}", stderr);
    assert!(markdown_files(&temp.path().join("musicComments")).is_empty());
}

#[test]
fn unreadable_input_exits_with_code_one() {
    let temp = TempDir::new().unwrap();
    let output = crescendo(
        temp.path(),
        &["--quiet", "--simulate", "--input", "absent.md"],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("absent.md"));
}

#[test]
fn invalid_local_config_exits_with_code_one() {
    let temp = TempDir::new().unwrap();
    write_table(temp.path(), TWO_ROW_TABLE);
    std::fs::write(
        temp.path().join("crescendo.toml"),
        "[pacing]\nmax_attempts = 0\n",
    )
    .unwrap();

    let output = crescendo(temp.path(), &["--quiet", "--simulate", "--input", "top.md"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("max_attempts"));
}
