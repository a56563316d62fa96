//! CLI route: run context and flag overrides. Loads configuration, builds the
//! client and writer, and runs the batch on a background task while the
//! foreground renders progress.

use crate::batch::{run_batch, BatchSummary, ChannelSink};
use crate::cli::parse::Cli;
use crate::cli::progress::{render_events, BatchProgress};
use crate::config::{AppConfig, ConfigLoader};
use crate::error::ReviewError;
use crate::review::ReviewClient;
use crate::writer::ReviewWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Per-run settings that sit above every configuration layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOverrides {
    pub input: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub keep_thinking: Option<bool>,
    pub simulate: Option<bool>,
    pub skip_existing: Option<bool>,
    pub api_key: Option<String>,
    pub model: Option<String>,
}

impl RunOverrides {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(input) = &self.input {
            config.batch.input = input.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.batch.output_dir = output_dir.clone();
        }
        if let Some(keep_thinking) = self.keep_thinking {
            config.api.keep_thinking = keep_thinking;
        }
        if let Some(simulate) = self.simulate {
            config.batch.simulate = simulate;
        }
        if let Some(skip_existing) = self.skip_existing {
            config.batch.skip_existing = skip_existing;
        }
        if let Some(api_key) = &self.api_key {
            config.api.api_key = Some(api_key.clone());
        }
        if let Some(model) = &self.model {
            config.api.model = model.clone();
        }
    }
}

impl From<&Cli> for RunOverrides {
    fn from(cli: &Cli) -> Self {
        let skip_existing = if cli.overwrite {
            Some(false)
        } else if cli.skip_existing {
            Some(true)
        } else {
            None
        };
        Self {
            input: cli.input.clone(),
            output_dir: cli.output_dir.clone(),
            keep_thinking: cli.keep_thinking.then_some(true),
            simulate: cli.simulate.then_some(true),
            skip_existing,
            api_key: cli.api_key.clone(),
            model: cli.model.clone(),
        }
    }
}

/// Runtime context for CLI execution: the layered configuration every run
/// starts from.
pub struct RunContext {
    config: AppConfig,
    config_path: Option<PathBuf>,
}

impl RunContext {
    /// Load configuration for `working_dir`, or from `config_path` alone when given.
    pub fn new(working_dir: &Path, config_path: Option<PathBuf>) -> Result<Self, ReviewError> {
        let config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(working_dir)?,
        };
        Ok(Self {
            config,
            config_path,
        })
    }

    pub fn from_config(config: AppConfig) -> Self {
        Self {
            config,
            config_path: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Base configuration with `overrides` applied and validated.
    pub fn resolve(&self, overrides: &RunOverrides) -> Result<AppConfig, ReviewError> {
        let mut config = self.config.clone();
        overrides.apply(&mut config);
        config.ensure_valid()?;
        Ok(config)
    }

    /// Run one batch; progress is drawn only when `show_progress` is set.
    pub async fn execute(
        &self,
        overrides: &RunOverrides,
        show_progress: bool,
    ) -> Result<BatchSummary, ReviewError> {
        let config = self.resolve(overrides)?;
        let mut client = ReviewClient::from_config(&config)?;
        let writer = ReviewWriter::new(&config.batch.output_dir, config.batch.skip_existing);
        let input = config.batch.input.clone();

        info!(
            input = %input.display(),
            output_dir = %writer.output_dir().display(),
            model = %config.api.model,
            skip_existing = writer.skip_existing(),
            "Starting run"
        );

        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let batch = tokio::spawn(async move {
            let sink = ChannelSink::new(tx);
            run_batch(&input, &mut client, &writer, &sink).await
        });

        let progress = if show_progress {
            BatchProgress::new(true)
        } else {
            BatchProgress::hidden()
        };
        render_events(rx, progress).await;

        let summary = batch.await??;
        debug!(saved = summary.saved, failed = summary.failed, "Run complete");
        Ok(summary)
    }
}
