//! `WebAssets` — the per-page facade over the four registries.
//!
//! An [`AssetEnvironment`] is built once per process and shared; every
//! request asks it for a fresh [`WebAssets`], so no mutable registry state
//! is ever shared between requests.

use serde::Serialize;
use std::sync::Arc;

use crate::css::CssRegistry;
use crate::error::Result;
use crate::js::{JsLoader, JsRegistry};
use crate::manifest::{ManifestSource, NoManifests};
use crate::meta::MetaRegistry;
use crate::mode::{RenderGate, RenderMode};
use crate::optimizer::Optimizer;
use crate::resolver::PathResolver;
use crate::title::{DEFAULT_SEPARATOR, TitleStack};

/// Process-wide settings every page is created from.
#[derive(Debug, Clone)]
pub struct AssetSettings {
    pub mode: RenderMode,
    pub css_root: String,
    pub js_root: String,
    pub loader: JsLoader,
    pub title_separator: String,
    /// Title every page starts with, e.g. the site name.
    pub base_title: Option<String>,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            mode: RenderMode::Development,
            css_root: "/css".into(),
            js_root: "/js".into(),
            loader: JsLoader::default(),
            title_separator: DEFAULT_SEPARATOR.into(),
            base_title: None,
        }
    }
}

/// Shared, immutable factory for per-request [`WebAssets`].
#[derive(Clone)]
pub struct AssetEnvironment {
    settings: Arc<AssetSettings>,
    manifests: Arc<dyn ManifestSource>,
    optimizer: Option<Arc<dyn Optimizer>>,
}

impl AssetEnvironment {
    pub fn new(settings: AssetSettings) -> Self {
        Self {
            settings: Arc::new(settings),
            manifests: Arc::new(NoManifests),
            optimizer: None,
        }
    }

    pub fn with_manifests(mut self, manifests: Arc<dyn ManifestSource>) -> Self {
        self.manifests = manifests;
        self
    }

    pub fn with_optimizer(mut self, optimizer: Arc<dyn Optimizer>) -> Self {
        self.optimizer = Some(optimizer);
        self
    }

    pub fn settings(&self) -> &AssetSettings {
        &self.settings
    }

    pub fn mode(&self) -> RenderMode {
        self.settings.mode
    }

    /// A new, empty page in the `Building` state.
    pub fn page(&self) -> WebAssets {
        let s = &self.settings;
        let gate = RenderGate::new();
        let mut title = TitleStack::with_gate(s.title_separator.clone(), gate.clone());
        if let Some(base) = &s.base_title {
            title.seed(base);
        }

        WebAssets {
            mode: s.mode,
            optimizer: self.optimizer.clone(),
            css: CssRegistry::with_gate(
                s.mode,
                PathResolver::new(s.css_root.clone()),
                self.manifests.clone(),
                gate.clone(),
            ),
            js: JsRegistry::with_gate(
                s.mode,
                PathResolver::new(s.js_root.clone()),
                s.loader.clone(),
                gate.clone(),
            ),
            meta: MetaRegistry::with_gate(gate.clone()),
            title,
            gate,
            optimizer_applied: false,
        }
    }
}

impl Default for AssetEnvironment {
    fn default() -> Self {
        Self::new(AssetSettings::default())
    }
}

/// All page-level assets of one page render.
pub struct WebAssets {
    mode: RenderMode,
    gate: RenderGate,
    optimizer: Option<Arc<dyn Optimizer>>,
    css: CssRegistry,
    js: JsRegistry,
    meta: MetaRegistry,
    title: TitleStack,
    /// Set once the optimizer's output is stored; independent of the gate,
    /// which a single component render can seal on its own.
    optimizer_applied: bool,
}

impl WebAssets {
    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn is_rendered(&self) -> bool {
        self.gate.is_rendered()
    }

    pub fn css(&self) -> &CssRegistry {
        &self.css
    }

    pub fn css_mut(&mut self) -> &mut CssRegistry {
        &mut self.css
    }

    pub fn js(&self) -> &JsRegistry {
        &self.js
    }

    pub fn js_mut(&mut self) -> &mut JsRegistry {
        &mut self.js
    }

    pub fn meta(&self) -> &MetaRegistry {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut MetaRegistry {
        &mut self.meta
    }

    pub fn title(&self) -> &TitleStack {
        &self.title
    }

    pub fn title_mut(&mut self) -> &mut TitleStack {
        &mut self.title
    }

    pub fn set_page_title(&mut self, title: Option<&str>) -> Result<()> {
        self.title.set(title)
    }

    pub fn append_page_title(&mut self, addendum: Option<&str>) -> Result<()> {
        self.title.append(addendum)
    }

    pub fn push_page_title(&mut self, prefix: Option<&str>) -> Result<()> {
        self.title.push(prefix)
    }

    /// Render every component and freeze the page.
    ///
    /// In optimized mode, registries that only hold development entries are
    /// first translated by the optimizer, if one is configured. This also
    /// happens when a single component was rendered beforehand. Rendering
    /// again returns the same output.
    pub fn render(&mut self) -> Result<RenderedHead> {
        if self.mode.is_optimized()
            && !self.optimizer_applied
            && let Some(optimizer) = self.optimizer.clone()
        {
            self.apply_optimizer(optimizer.as_ref())?;
        }

        let head = RenderedHead {
            title: self.title.render(),
            meta: self.meta.render(),
            css: self.css.render(),
            js: self.js.render(),
        };
        tracing::debug!(
            mode = %self.mode,
            css = self.css.sources().len(),
            js = self.js.calls().len(),
            "Rendered page assets"
        );
        Ok(head)
    }

    fn apply_optimizer(&mut self, optimizer: &dyn Optimizer) -> Result<()> {
        let css = if self.css.has_development_entries() && !self.css.has_optimized_entries() {
            Some(optimizer.optimize_css(&self.css.sources(), &self.css.lines())?)
        } else {
            None
        };
        let js = if self.js.has_development_entries() && !self.js.has_optimized_entries() {
            Some(optimizer.optimize_js(self.js.calls(), self.js.main())?)
        } else {
            None
        };

        // Both translations succeeded; only now is anything stored.
        if let Some(bundles) = css {
            tracing::debug!(bundles = bundles.len(), "Substituted stylesheet bundles");
            self.css.install_optimized(bundles);
        }
        if let Some(bundle) = js {
            tracing::debug!(calls = bundle.calls.len(), "Substituted script bundle");
            self.js.install_optimized(bundle);
        }
        self.optimizer_applied = true;
        Ok(())
    }
}

/// Markup fragments produced by one render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedHead {
    pub title: String,
    pub meta: String,
    pub css: String,
    pub js: String,
}

impl RenderedHead {
    /// All fragments concatenated in document order.
    pub fn head_html(&self) -> String {
        [&self.title, &self.meta, &self.css, &self.js]
            .into_iter()
            .filter(|fragment| !fragment.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// A complete HTML document around `body`.
    pub fn document(&self, body: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n{}\n</head>\n<body>\n{body}\n</body>\n</html>\n",
            self.head_html()
        )
    }
}
