//! Stylesheet registry — external sources plus inline CSS lines.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{Component, Error, Result};
use crate::manifest::ManifestSource;
use crate::markup;
use crate::mode::{RenderGate, RenderMode};
use crate::ordered::{End, Identified, OrderedAssetList};
use crate::resolver::{AssetIdentifier, PathResolver};

/// An external stylesheet. Identity is the `(url, media)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CssSource {
    pub url: String,
    /// `None` means all devices, which is distinct from `Some("all")`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
}

impl CssSource {
    pub fn new(url: impl Into<String>, media: Option<&str>) -> Self {
        Self {
            url: url.into(),
            media: normalize_media(media),
        }
    }

    fn render(&self) -> String {
        let mut attrs = vec![("rel", "stylesheet"), ("href", self.url.as_str())];
        if let Some(media) = &self.media {
            attrs.push(("media", media.as_str()));
        }
        markup::void_element("link", attrs)
    }
}

impl Identified for CssSource {
    type Key = (String, Option<String>);

    fn identity(&self) -> Self::Key {
        (self.url.clone(), self.media.clone())
    }
}

fn normalize_media(media: Option<&str>) -> Option<String> {
    media.map(str::trim).filter(|m| !m.is_empty()).map(String::from)
}

/// Ordered stylesheet state for one page.
pub struct CssRegistry {
    mode: RenderMode,
    resolver: PathResolver,
    manifest_resolver: PathResolver,
    manifests: Arc<dyn ManifestSource>,
    gate: RenderGate,
    sources: OrderedAssetList<CssSource>,
    lines: OrderedAssetList<String>,
    optimized: OrderedAssetList<CssSource>,
}

impl CssRegistry {
    /// Standalone registry with its own render gate.
    pub fn new(mode: RenderMode, resolver: PathResolver, manifests: Arc<dyn ManifestSource>) -> Self {
        Self::with_gate(mode, resolver, manifests, RenderGate::new())
    }

    pub(crate) fn with_gate(
        mode: RenderMode,
        resolver: PathResolver,
        manifests: Arc<dyn ManifestSource>,
        gate: RenderGate,
    ) -> Self {
        Self {
            mode,
            resolver,
            manifest_resolver: PathResolver::default(),
            manifests,
            gate,
            sources: OrderedAssetList::new(),
            lines: OrderedAssetList::new(),
            optimized: OrderedAssetList::new(),
        }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Add a stylesheet after all existing ones.
    pub fn append_source(&mut self, location: &str, media: Option<&str>) -> Result<()> {
        self.add_source(location, media, End::Back)
    }

    /// Add a stylesheet before all existing ones.
    pub fn push_source(&mut self, location: &str, media: Option<&str>) -> Result<()> {
        self.add_source(location, media, End::Front)
    }

    /// Append every stylesheet listed in a manifest, in manifest order.
    pub fn append_sources_list(&mut self, location: &str, media: Option<&str>) -> Result<()> {
        self.import_manifest(location, media, End::Back)
    }

    /// Prepend every stylesheet listed in a manifest, in manifest order.
    pub fn push_sources_list(&mut self, location: &str, media: Option<&str>) -> Result<()> {
        self.import_manifest(location, media, End::Front)
    }

    /// Append a line to the inline style block. `None` and blank lines are no-ops.
    pub fn append_line(&mut self, text: Option<&str>) -> Result<()> {
        self.add_line(text, End::Back)
    }

    /// Prepend a line to the inline style block. `None` and blank lines are no-ops.
    pub fn push_line(&mut self, text: Option<&str>) -> Result<()> {
        self.add_line(text, End::Front)
    }

    /// Append a pre-built reference; used verbatim, never resolved.
    pub fn append_optimized_source(&mut self, url: &str, media: Option<&str>) -> Result<()> {
        self.add_optimized(url, media, End::Back)
    }

    /// Prepend a pre-built reference; used verbatim, never resolved.
    pub fn push_optimized_source(&mut self, url: &str, media: Option<&str>) -> Result<()> {
        self.add_optimized(url, media, End::Front)
    }

    /// Store the optimizer's output. Runs as part of the render step, so the
    /// gate is not consulted.
    pub(crate) fn install_optimized(&mut self, bundles: Vec<CssSource>) {
        self.optimized.import_list(bundles, End::Back);
    }

    pub fn sources(&self) -> Vec<CssSource> {
        self.sources.to_vec()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.to_vec()
    }

    pub fn optimized_sources(&self) -> Vec<CssSource> {
        self.optimized.to_vec()
    }

    pub(crate) fn has_development_entries(&self) -> bool {
        !self.sources.is_empty() || !self.lines.is_empty()
    }

    pub(crate) fn has_optimized_entries(&self) -> bool {
        !self.optimized.is_empty()
    }

    /// Render the markup for the current mode and freeze the page.
    pub fn render(&self) -> String {
        self.gate.seal();
        match self.mode {
            RenderMode::Development => self.render_development(),
            RenderMode::Optimized => {
                if self.has_development_entries() && self.optimized.is_empty() {
                    tracing::warn!(
                        sources = self.sources.len(),
                        lines = self.lines.len(),
                        "Optimized render has no bundle references; development styles omitted"
                    );
                }
                self.optimized
                    .iter()
                    .map(CssSource::render)
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
    }

    fn render_development(&self) -> String {
        let mut parts: Vec<String> = self.sources.iter().map(CssSource::render).collect();
        if !self.lines.is_empty() {
            let body = self
                .lines
                .iter()
                .map(|line| markup::raw_text(line))
                .collect::<Vec<_>>()
                .join("\n");
            parts.push(format!("<style>\n{body}\n</style>"));
        }
        parts.join("\n")
    }

    fn add_source(&mut self, location: &str, media: Option<&str>, end: End) -> Result<()> {
        self.gate.ensure_building(Component::Css)?;
        let url = AssetIdentifier::parse(location).resolve(&self.resolver, "css")?;
        self.sources.insert(CssSource::new(url, media), end);
        Ok(())
    }

    fn add_line(&mut self, text: Option<&str>, end: End) -> Result<()> {
        let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(());
        };
        self.gate.ensure_building(Component::Css)?;
        self.lines.insert(text.to_string(), end);
        Ok(())
    }

    fn add_optimized(&mut self, url: &str, media: Option<&str>, end: End) -> Result<()> {
        self.gate.ensure_building(Component::Css)?;
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::invalid(url, "optimized reference must not be empty"));
        }
        self.optimized.insert(CssSource::new(url, media), end);
        Ok(())
    }

    fn import_manifest(&mut self, location: &str, media: Option<&str>, end: End) -> Result<()> {
        self.gate.ensure_building(Component::Css)?;
        let manifest = AssetIdentifier::parse(location).resolve(&self.manifest_resolver, "txt")?;
        let entries = self.manifests.read(&manifest)?;

        // Resolve everything before touching the list so a bad entry leaves it unchanged.
        let batch = entries
            .iter()
            .map(|entry| {
                let url = AssetIdentifier::parse(entry).resolve(&self.resolver, "css")?;
                Ok(CssSource::new(url, media))
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(manifest = %manifest, entries = batch.len(), ?end, "Imported stylesheet list");
        self.sources.import_list(batch, end);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::manifest::InMemoryManifests;

    fn registry(mode: RenderMode) -> CssRegistry {
        let manifests = InMemoryManifests::new()
            .with("/Shop/Common.txt", "Shop.Base\nShop.Buttons\n")
            .with("/Shop/Broken.txt", "Shop.Base\nShop..Oops\n");
        CssRegistry::new(mode, PathResolver::new("/css"), Arc::new(manifests))
    }

    fn urls(css: &CssRegistry) -> Vec<String> {
        css.sources().into_iter().map(|s| s.url).collect()
    }

    #[test]
    fn append_and_push_order() {
        let mut css = registry(RenderMode::Development);
        css.append_source("A", None).unwrap();
        css.append_source("B", None).unwrap();
        css.push_source("C", None).unwrap();
        assert_eq!(urls(&css), ["/css/C.css", "/css/A.css", "/css/B.css"]);
    }

    #[test]
    fn equivalent_spellings_are_one_source() {
        let mut css = registry(RenderMode::Development);
        css.append_source("Shop.Checkout", None).unwrap();
        css.append_source("/css/site.css", None).unwrap();
        css.append_source("/css/Shop/Checkout.css", None).unwrap();
        assert_eq!(urls(&css), ["/css/site.css", "/css/Shop/Checkout.css"]);
    }

    #[test]
    fn media_is_part_of_identity() {
        let mut css = registry(RenderMode::Development);
        css.append_source("Print", None).unwrap();
        css.append_source("Print", Some("all")).unwrap();
        css.append_source("Print", Some("print")).unwrap();
        css.append_source("Print", None).unwrap();
        let media: Vec<_> = css.sources().into_iter().map(|s| s.media).collect();
        assert_eq!(media, [Some("all".into()), Some("print".into()), None]);
    }

    #[test]
    fn manifest_import_preserves_order() {
        let mut css = registry(RenderMode::Development);
        css.append_source("Page", None).unwrap();
        css.push_sources_list("Shop.Common", None).unwrap();
        assert_eq!(
            urls(&css),
            ["/css/Shop/Base.css", "/css/Shop/Buttons.css", "/css/Page.css"]
        );
    }

    #[test]
    fn failed_manifest_import_leaves_state_unchanged() {
        let mut css = registry(RenderMode::Development);
        css.append_source("Page", None).unwrap();

        let err = css.append_sources_list("Shop.Missing", None).unwrap_err();
        assert!(matches!(err, Error::ManifestRead { .. }));
        let err = css.append_sources_list("Shop.Broken", None).unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier { .. }));

        assert_eq!(urls(&css), ["/css/Page.css"]);
    }

    #[test]
    fn none_lines_are_noops() {
        let mut css = registry(RenderMode::Development);
        css.append_line(None).unwrap();
        css.append_line(Some("   ")).unwrap();
        assert!(css.lines().is_empty());
    }

    #[test]
    fn renders_links_then_style_block() {
        let mut css = registry(RenderMode::Development);
        css.append_source("Site", Some("screen")).unwrap();
        css.append_line(Some("body { margin: 0 }")).unwrap();
        css.push_line(Some("html { color: red }")).unwrap();
        css.append_line(Some("html { color: red }")).unwrap();

        assert_eq!(
            css.render(),
            "<link rel=\"stylesheet\" href=\"/css/Site.css\" media=\"screen\">\n\
             <style>\nbody { margin: 0 }\nhtml { color: red }\n</style>"
        );
    }

    #[test]
    fn optimized_mode_renders_only_optimized_references() {
        let mut css = registry(RenderMode::Optimized);
        css.append_source("Site", None).unwrap();
        css.append_line(Some("body { margin: 0 }")).unwrap();
        assert_eq!(css.render(), "");

        let mut css = registry(RenderMode::Optimized);
        css.append_source("Site", None).unwrap();
        css.append_optimized_source("/build/app.css", None).unwrap();
        css.push_optimized_source("/build/vendor.css", None).unwrap();
        let html = css.render();
        assert!(html.starts_with("<link rel=\"stylesheet\" href=\"/build/vendor.css\">"));
        assert!(html.contains("/build/app.css"));
        assert!(!html.contains("Site.css"));
    }

    #[test]
    fn development_mode_ignores_optimized_references() {
        let mut css = registry(RenderMode::Development);
        css.append_optimized_source("/build/app.css", None).unwrap();
        assert_eq!(css.render(), "");
    }

    #[test]
    fn blank_optimized_references_are_rejected() {
        let mut css = registry(RenderMode::Optimized);
        let err = css.append_optimized_source("", None).unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier { .. }));
        assert!(css.push_optimized_source("   ", Some("print")).is_err());
        assert!(css.optimized_sources().is_empty());
        assert_eq!(css.render(), "");
    }

    #[test]
    fn render_is_idempotent_and_freezes() {
        let mut css = registry(RenderMode::Development);
        css.append_source("Site", None).unwrap();
        let first = css.render();
        assert_eq!(first, css.render());

        let err = css.append_source("Other", None).unwrap_err();
        assert!(matches!(err, Error::FrozenState { component: Component::Css }));
        assert!(css.append_line(Some("a {}")).is_err());
        assert!(css.append_line(None).is_ok());
        assert_eq!(first, css.render());
    }
}
