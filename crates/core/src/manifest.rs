//! Manifest sources — ordered lists of asset identifiers kept in text files.
//!
//! Format: one identifier per line, blank lines and `#` comments ignored.
//!
//! ```text
//! # shared storefront styles
//! Shop.Common
//! Shop.Buttons
//! https://cdn.example.com/reset.css
//! ```

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Reads manifests by their resolved location (e.g. `/Shop/Common.txt`).
pub trait ManifestSource: Send + Sync {
    fn read(&self, location: &str) -> Result<Vec<String>>;
}

/// Parse manifest text into its ordered entries.
pub fn parse_manifest(location: &str, content: &str) -> Result<Vec<String>> {
    let mut entries = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.chars().any(char::is_whitespace) {
            return Err(Error::manifest(
                location,
                format!("line {}: entry '{line}' contains whitespace", idx + 1),
            ));
        }
        entries.push(line.to_string());
    }
    Ok(entries)
}

/// Manifests stored below a directory on disk.
#[derive(Debug, Clone)]
pub struct FsManifestSource {
    root: PathBuf,
}

impl FsManifestSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, location: &str) -> Result<PathBuf> {
        let relative = Path::new(location.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(Error::manifest(location, "path escapes the manifest directory"));
        }
        Ok(self.root.join(relative))
    }
}

impl ManifestSource for FsManifestSource {
    fn read(&self, location: &str) -> Result<Vec<String>> {
        let path = self.path_for(location)?;
        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::manifest(location, format!("{}: {e}", path.display())))?;
        let entries = parse_manifest(location, &content)?;
        tracing::debug!(manifest = %path.display(), entries = entries.len(), "Read manifest");
        Ok(entries)
    }
}

/// Manifests held in memory, keyed by location.
#[derive(Debug, Clone, Default)]
pub struct InMemoryManifests {
    files: HashMap<String, String>,
}

impl InMemoryManifests {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, location: &str, content: impl Into<String>) {
        self.files.insert(normalize(location), content.into());
    }

    pub fn with(mut self, location: &str, content: impl Into<String>) -> Self {
        self.insert(location, content);
        self
    }
}

impl ManifestSource for InMemoryManifests {
    fn read(&self, location: &str) -> Result<Vec<String>> {
        let content = self
            .files
            .get(&normalize(location))
            .ok_or_else(|| Error::manifest(location, "manifest not found"))?;
        parse_manifest(location, content)
    }
}

/// Source that has no manifests at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoManifests;

impl ManifestSource for NoManifests {
    fn read(&self, location: &str) -> Result<Vec<String>> {
        Err(Error::manifest(location, "no manifest source configured"))
    }
}

fn normalize(location: &str) -> String {
    location.trim().trim_start_matches('/').to_string()
}
