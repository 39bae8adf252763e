//! Configuration loading for the CLI

use anyhow::{Context, Result};
use memlens_lib::config::AnalysisConfig;
use std::path::{Path, PathBuf};

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "MEMLENS";

/// Load the analysis configuration
///
/// Layers, lowest first: built-in defaults, the config file, then
/// `MEMLENS_*` environment variables (`__` separates nested keys, as in
/// `MEMLENS_TREND__NORMAL_MAX_PERCENT=3`). An explicit `path` must exist;
/// the default file is optional.
pub fn load(path: Option<&Path>) -> Result<AnalysisConfig> {
    let mut builder = config::Config::builder();

    match path {
        Some(path) => {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Json)
                    .required(true),
            );
        }
        None => {
            if let Some(default_path) = default_config_path() {
                builder = builder.add_source(
                    config::File::from(default_path)
                        .format(config::FileFormat::Json)
                        .required(false),
                );
            }
        }
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to read configuration")?;

    let config: AnalysisConfig = settings
        .try_deserialize()
        .context("Failed to parse configuration")?;
    config.validate()?;

    Ok(config)
}

/// Get the default configuration file path
pub fn default_config_path() -> Option<PathBuf> {
    let home = dirs_next::home_dir()?;
    Some(home.join(".config").join("memlens").join("config.json"))
}
