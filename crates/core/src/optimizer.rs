//! Optimizer collaborator — maps development entries onto pre-built bundles.
//!
//! The bundles themselves are produced by an external build step. This
//! module only replays the references that step recorded.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::css::CssSource;
use crate::error::{Error, Result};
use crate::js::JsCall;
use crate::ordered::OrderedAssetList;

/// Optimized script state produced for one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsBundle {
    pub bundle: Option<String>,
    pub calls: Vec<JsCall>,
    pub main: Option<String>,
}

/// Translates a page's development entries into optimized references.
pub trait Optimizer: Send + Sync {
    fn optimize_css(&self, sources: &[CssSource], lines: &[String]) -> Result<Vec<CssSource>>;

    fn optimize_js(&self, calls: &[JsCall], main: Option<&str>) -> Result<JsBundle>;
}

/// Lookup table written by the build step.
///
/// ```json
/// {
///   "css": {
///     "sources": { "/css/Shop/Base.css": "/build/shop.css" },
///     "inline": "/build/inline.css"
///   },
///   "js": {
///     "bundle": "/build/app.js",
///     "modules": { "/js/Shop/Cart.js": "shop/cart" }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BundleIndex {
    #[serde(default)]
    pub css: CssBundles,
    #[serde(default)]
    pub js: JsBundles,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CssBundles {
    /// Development stylesheet URL → bundle URL.
    #[serde(default)]
    pub sources: HashMap<String, String>,
    /// Bundle holding the compiled inline style lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsBundles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle: Option<String>,
    /// Development module URL → module id inside the bundle.
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

impl BundleIndex {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| Error::Optimizer {
            reason: format!("cannot read bundle index {}: {e}", path.display()),
        })?;
        let index = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            css = index.css.sources.len(),
            js = index.js.modules.len(),
            "Loaded bundle index"
        );
        Ok(index)
    }

    fn module_id(&self, module: &str) -> Result<String> {
        self.js
            .modules
            .get(module)
            .filter(|id| !id.trim().is_empty())
            .cloned()
            .ok_or_else(|| Error::Optimizer {
                reason: format!("no bundle contains script module '{module}'"),
            })
    }
}

impl Optimizer for BundleIndex {
    fn optimize_css(&self, sources: &[CssSource], lines: &[String]) -> Result<Vec<CssSource>> {
        let mut bundles: OrderedAssetList<CssSource> = OrderedAssetList::new();
        for source in sources {
            let url = self
                .css
                .sources
                .get(&source.url)
                .filter(|url| !url.trim().is_empty())
                .ok_or_else(|| Error::Optimizer {
                    reason: format!("no bundle contains stylesheet '{}'", source.url),
                })?;
            // First occurrence fixes the position of each bundle.
            let bundle = CssSource {
                url: url.clone(),
                media: source.media.clone(),
            };
            if !bundles.contains(&(bundle.url.clone(), bundle.media.clone())) {
                bundles.append_back(bundle);
            }
        }

        if !lines.is_empty() {
            let inline = self
                .css
                .inline
                .as_ref()
                .filter(|url| !url.trim().is_empty())
                .ok_or_else(|| Error::Optimizer {
                    reason: "inline styles present but no inline bundle was built".into(),
                })?;
            bundles.append_back(CssSource::new(inline.clone(), None));
        }
        Ok(bundles.to_vec())
    }

    fn optimize_js(&self, calls: &[JsCall], main: Option<&str>) -> Result<JsBundle> {
        let calls = calls
            .iter()
            .map(|call| {
                Ok(JsCall {
                    module: self.module_id(&call.module)?,
                    function: call.function.clone(),
                    args: call.args.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let main = main.map(|m| self.module_id(m)).transpose()?;
        Ok(JsBundle {
            bundle: self.js.bundle.clone(),
            calls,
            main,
        })
    }
}
