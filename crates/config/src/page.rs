//! Declarative page definitions (`[[pages]]`).

use indexmap::IndexMap;
use pagekit_core::{Result, WebAssets};
use serde::{Deserialize, Serialize};

/// One page and the assets it registers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageConfig {
    /// Unique page name (used in `/pages/{name}` and `pagekit render <name>`)
    pub name: String,

    /// Appended to the title in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub title: Vec<String>,

    /// Pushed in front of the title in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub title_prefix: Vec<String>,

    /// `<meta>` elements; attribute order is kept
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meta: Vec<IndexMap<String, String>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,

    /// Stylesheets, literal or symbolic
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub css: Vec<CssEntry>,

    /// Stylesheet manifests
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub css_lists: Vec<CssEntry>,

    /// Inline style lines
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub css_lines: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub js: Vec<JsCallConfig>,

    /// Main script module
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,

    /// Body markup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CssEntry {
    pub source: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,

    /// Insert at the front instead of appending
    #[serde(default)]
    pub push: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsCallConfig {
    pub module: String,
    pub function: String,
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
}

impl PageConfig {
    /// Register this page's assets on `assets`.
    pub fn apply_to(&self, assets: &mut WebAssets) -> Result<()> {
        for part in &self.title {
            assets.append_page_title(Some(part))?;
        }
        for prefix in &self.title_prefix {
            assets.push_page_title(Some(prefix))?;
        }

        let meta = assets.meta_mut();
        for element in &self.meta {
            meta.add_element(element.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
        }
        meta.add_keywords(&self.keywords)?;

        let css = assets.css_mut();
        for entry in &self.css {
            if entry.push {
                css.push_source(&entry.source, entry.media.as_deref())?;
            } else {
                css.append_source(&entry.source, entry.media.as_deref())?;
            }
        }
        for entry in &self.css_lists {
            if entry.push {
                css.push_sources_list(&entry.source, entry.media.as_deref())?;
            } else {
                css.append_sources_list(&entry.source, entry.media.as_deref())?;
            }
        }
        for line in &self.css_lines {
            css.append_line(Some(line))?;
        }

        let js = assets.js_mut();
        for call in &self.js {
            js.call(&call.module, &call.function, call.args.clone())?;
        }
        if let Some(main) = &self.main {
            js.set_main(main)?;
        }

        tracing::debug!(page = %self.name, "Applied page definition");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagekit_core::{AssetEnvironment, Error, InMemoryManifests};
    use std::sync::Arc;

    const CHECKOUT: &str = r#"
name = "checkout"
title = ["Shop", "Checkout"]
title_prefix = ["Acme"]
keywords = ["shop", "checkout", "shop"]
css = [
    { source = "Shop.Checkout" },
    { source = "https://cdn.example.com/reset.css", push = true },
    { source = "Shop.Print", media = "print" },
]
css_lists = [{ source = "Shop.Common", push = true }]
css_lines = ["body { margin: 0 }"]
js = [{ module = "Shop.Cart", function = "init", args = [1, "eur"] }]
main = "Shop.Main"

[[meta]]
name = "description"
content = "Pay for your order"
"#;

    fn environment() -> AssetEnvironment {
        AssetEnvironment::default().with_manifests(Arc::new(
            InMemoryManifests::new().with("/Shop/Common.txt", "Shop.Base\n"),
        ))
    }

    #[test]
    fn applies_every_section() {
        let page: PageConfig = toml::from_str(CHECKOUT).unwrap();
        let mut assets = environment().page();
        page.apply_to(&mut assets).unwrap();

        assert_eq!(assets.title().get(), "Acme - Shop - Checkout");
        let urls: Vec<_> = assets.css().sources().into_iter().map(|s| s.url).collect();
        assert_eq!(
            urls,
            [
                "/css/Shop/Base.css",
                "https://cdn.example.com/reset.css",
                "/css/Shop/Checkout.css",
                "/css/Shop/Print.css",
            ]
        );
        assert_eq!(assets.js().main(), Some("/js/Shop/Main.js"));

        let head = assets.render().unwrap();
        assert!(head.meta.starts_with(
            r#"<meta name="description" content="Pay for your order">"#
        ));
        assert!(head.meta.ends_with(r#"<meta name="keywords" content="shop,checkout">"#));
        assert!(head.css.contains("media=\"print\""));
        assert!(head.js.contains("[1,\"eur\"]"));
    }

    #[test]
    fn missing_manifest_propagates() {
        let page = PageConfig {
            name: "broken".into(),
            css_lists: vec![CssEntry {
                source: "Missing".into(),
                media: None,
                push: false,
            }],
            ..PageConfig::default()
        };
        let mut assets = environment().page();
        let err = page.apply_to(&mut assets).unwrap_err();
        assert!(matches!(err, Error::ManifestRead { .. }));
    }
}
