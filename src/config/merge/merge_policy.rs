//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Prefix of environment overrides, e.g. `CRESCENDO__API__MODEL`.
pub const ENV_PREFIX: &str = "CRESCENDO";
pub const ENV_SEPARATOR: &str = "__";

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("api.endpoint", crate::config::DEFAULT_ENDPOINT)?
        .set_default("api.model", crate::config::DEFAULT_MODEL)?
        .set_default("api.api_key_env", crate::config::DEFAULT_API_KEY_ENV)?
        .set_default("batch.input", "top25Music_douban.md")?
        .set_default("batch.output_dir", "musicComments")
}

/// Environment source layered last, above every file.
pub fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator(ENV_SEPARATOR)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}
