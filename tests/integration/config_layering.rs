//! Configuration precedence seen from the run context.

use crescendo::cli::{Cli, RunContext, RunOverrides};
use crescendo::config::ConfigLoader;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

// Environment overrides are process-wide
static ENV_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn each_layer_overrides_the_one_below() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp = TempDir::new().unwrap();
    let global = temp.path().join("global.toml");
    std::fs::write(
        &global,
        "[api]\nmodel = \"global/model\"\ntemperature = 0.4\n\n[pacing]\nbase_wait_secs = 5\nmax_attempts = 2\n",
    )
    .unwrap();
    std::fs::write(
        temp.path().join("crescendo.toml"),
        "[api]\nmodel = \"local/model\"\n\n[pacing]\nbase_wait_secs = 7\n",
    )
    .unwrap();

    std::env::set_var("CRESCENDO__PACING__BASE_WAIT_SECS", "11");
    let loaded = ConfigLoader::load_layered(Some(&global), temp.path());
    std::env::remove_var("CRESCENDO__PACING__BASE_WAIT_SECS");
    let config = loaded.unwrap();

    assert_eq!(config.api.temperature, 0.4, "global file beats defaults");
    assert_eq!(config.pacing.max_attempts, 2, "global file beats defaults");
    assert_eq!(config.api.model, "local/model", "local file beats global file");
    assert_eq!(config.pacing.base_wait_secs, 11, "environment beats files");

    let cli = Cli::try_parse_from(["crescendo", "--model", "flag/model"]).unwrap();
    let context = RunContext::from_config(config);
    let resolved = context.resolve(&RunOverrides::from(&cli)).unwrap();
    assert_eq!(resolved.api.model, "flag/model", "flags beat everything");
    assert_eq!(resolved.pacing.base_wait_secs, 11);
}

#[test]
fn explicit_config_file_replaces_file_layers() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("crescendo.toml"),
        "[batch]\noutput_dir = \"from-local\"\n",
    )
    .unwrap();
    let explicit = temp.path().join("explicit.toml");
    std::fs::write(&explicit, "[batch]\ninput = \"list.md\"\n").unwrap();

    let context = RunContext::new(temp.path(), Some(explicit)).unwrap();
    assert_eq!(context.config().batch.input, PathBuf::from("list.md"));
    assert_eq!(
        context.config().batch.output_dir,
        PathBuf::from("musicComments"),
        "local file is not consulted when a config file is given"
    );
}

#[test]
fn invalid_layer_values_fail_validation() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("crescendo.toml"),
        "[api]\ntemperature = 3.5\nendpoint = \"ftp://example.com\"\n",
    )
    .unwrap();
    let config = ConfigLoader::load_layered(None, temp.path()).unwrap();
    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 1, "both api problems surface as one api error");
    assert!(config.ensure_valid().is_err());
}
