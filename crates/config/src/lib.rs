//! Configuration loading, validation, and management for pagekit.
//!
//! Loads configuration from `~/.pagekit/config.toml` with environment
//! variable overrides. Validates all settings at startup.

pub mod page;

pub use page::{CssEntry, JsCallConfig, PageConfig};

use pagekit_core::{
    AssetEnvironment, AssetSettings, BundleIndex, FsManifestSource, JsLoader, RenderMode,
    markup,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The root configuration structure.
///
/// Maps directly to `~/.pagekit/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Render mode for every page (`development` or `optimized`)
    #[serde(default)]
    pub mode: RenderMode,

    /// Title configuration
    #[serde(default)]
    pub title: TitleConfig,

    /// Stylesheet configuration
    #[serde(default)]
    pub css: CssConfig,

    /// Script configuration
    #[serde(default)]
    pub js: JsConfig,

    /// Manifest directory
    #[serde(default)]
    pub manifests: ManifestConfig,

    /// Optimizer output
    #[serde(default)]
    pub bundles: BundleConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Page definitions
    #[serde(default)]
    pub pages: Vec<PageConfig>,

    /// Directory relative paths are resolved against (the config file's directory).
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleConfig {
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Title every page starts with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
}

fn default_separator() -> String {
    " - ".into()
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            base: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CssConfig {
    #[serde(default = "default_css_root")]
    pub root: String,
}

fn default_css_root() -> String {
    "/css".into()
}

impl Default for CssConfig {
    fn default() -> Self {
        Self {
            root: default_css_root(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsConfig {
    #[serde(default = "default_js_root")]
    pub root: String,

    #[serde(default = "default_loader_url")]
    pub loader_url: String,

    #[serde(default = "default_loader_global")]
    pub loader_global: String,
}

fn default_js_root() -> String {
    "/js".into()
}
fn default_loader_url() -> String {
    "/static/loader.js".into()
}
fn default_loader_global() -> String {
    "pagekit".into()
}

impl Default for JsConfig {
    fn default() -> Self {
        Self {
            root: default_js_root(),
            loader_url: default_loader_url(),
            loader_global: default_loader_global(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestConfig {
    /// Directory holding `*.txt` manifests. Unset = manifests unavailable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BundleConfig {
    /// JSON bundle index written by the build step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    42680
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.pagekit/config.toml).
    ///
    /// Environment overrides:
    /// - `PAGEKIT_MODE` — `development` or `optimized`
    /// - `PAGEKIT_MANIFEST_DIR` — manifest directory
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf);

        config.validate()?;
        tracing::info!(path = %path.display(), pages = config.pages.len(), "Loaded configuration");
        Ok(config)
    }

    /// Apply `PAGEKIT_*` environment overrides.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(mode) = std::env::var("PAGEKIT_MODE") {
            self.mode = mode.parse().map_err(ConfigError::ValidationError)?;
        }
        if let Ok(dir) = std::env::var("PAGEKIT_MANIFEST_DIR") {
            self.manifests.dir = Some(dir);
        }
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".pagekit")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.title.separator.contains(['\n', '\r']) {
            return Err(ConfigError::ValidationError(
                "title.separator must not contain line breaks".into(),
            ));
        }

        if !markup::is_js_identifier(&self.js.loader_global) {
            return Err(ConfigError::ValidationError(format!(
                "js.loader_global '{}' is not a JavaScript identifier",
                self.js.loader_global
            )));
        }

        if self.gateway.port == 0 {
            return Err(ConfigError::ValidationError("gateway.port must be > 0".into()));
        }

        let mut names = HashSet::new();
        for page in &self.pages {
            if page.name.trim().is_empty() {
                return Err(ConfigError::ValidationError("page name must not be empty".into()));
            }
            if !names.insert(page.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate page name '{}'",
                    page.name
                )));
            }
        }

        Ok(())
    }

    /// Look up a page definition by name.
    pub fn page(&self, name: &str) -> Option<&PageConfig> {
        self.pages.iter().find(|p| p.name == name)
    }

    /// Resolve a configured path against the config file's directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Settings every page is created from.
    pub fn asset_settings(&self) -> Result<AssetSettings, ConfigError> {
        let loader = JsLoader::new(self.js.loader_url.clone(), self.js.loader_global.clone())
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        Ok(AssetSettings {
            mode: self.mode,
            css_root: self.css.root.clone(),
            js_root: self.js.root.clone(),
            loader,
            title_separator: self.title.separator.clone(),
            base_title: self.title.base.clone(),
        })
    }

    /// Build the shared per-process asset environment.
    pub fn environment(&self) -> Result<AssetEnvironment, ConfigError> {
        let mut env = AssetEnvironment::new(self.asset_settings()?);

        if let Some(dir) = &self.manifests.dir {
            let dir = self.resolve_path(dir);
            tracing::debug!(dir = %dir.display(), "Using manifest directory");
            env = env.with_manifests(Arc::new(FsManifestSource::new(dir)));
        }

        if let Some(index) = &self.bundles.index {
            let path = self.resolve_path(index);
            let index = BundleIndex::load(&path).map_err(|e| ConfigError::Bundles {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            env = env.with_optimizer(Arc::new(index));
        } else if self.mode.is_optimized() {
            tracing::warn!("Optimized mode without bundles.index; only explicit bundle references render");
        }

        Ok(env)
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: RenderMode::default(),
            title: TitleConfig::default(),
            css: CssConfig::default(),
            js: JsConfig::default(),
            manifests: ManifestConfig::default(),
            bundles: BundleConfig::default(),
            gateway: GatewayConfig::default(),
            pages: vec![],
            base_dir: None,
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Failed to load bundle index at {path}: {reason}")]
    Bundles { path: PathBuf, reason: String },
}
