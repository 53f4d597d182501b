pub mod config_cmd;
pub mod init;
pub mod render;
pub mod resolve;
pub mod serve;

use pagekit_config::AppConfig;
use std::path::{Path, PathBuf};

/// The config file in effect: `--config` or the default location.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"))
}

/// Load the config from `--config`, or the default location with env overrides.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, String> {
    let config = match explicit {
        Some(path) => AppConfig::load_from(path).and_then(|mut config| {
            config.apply_env_overrides()?;
            Ok(config)
        }),
        None => AppConfig::load(),
    };
    config.map_err(|e| format!("Failed to load config: {e}"))
}
