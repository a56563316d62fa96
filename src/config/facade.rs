//! Configuration loader: assembles defaults, files and environment.

use super::merge::merge_policy;
use super::sources::{global_file, local_file};
use super::AppConfig;
use config::{ConfigError, File, FileFormat};
use std::path::Path;
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a run started in `working_dir`.
    ///
    /// Precedence, lowest first: defaults, global file, `crescendo.toml` in
    /// `working_dir`, `CRESCENDO__*` environment variables.
    pub fn load(working_dir: &Path) -> Result<AppConfig, ConfigError> {
        Self::load_layered(global_file::global_config_path().as_deref(), working_dir)
    }

    /// Same as [`ConfigLoader::load`] with an explicit global file location.
    pub fn load_layered(
        global_path: Option<&Path>,
        working_dir: &Path,
    ) -> Result<AppConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder, global_path)?;
        let builder = local_file::add_to_builder(builder, working_dir)?;
        let config: AppConfig = builder
            .add_source(merge_policy::environment())
            .build()?
            .try_deserialize()?;
        debug!(
            model = %config.api.model,
            output_dir = %config.batch.output_dir.display(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Load from one explicit TOML file, whatever its extension; global and
    /// local files are not consulted.
    pub fn load_from_file(path: &Path) -> Result<AppConfig, ConfigError> {
        merge_policy::builder_with_defaults()?
            .add_source(File::from(path).format(FileFormat::Toml).required(true))
            .add_source(merge_policy::environment())
            .build()?
            .try_deserialize()
    }
}
