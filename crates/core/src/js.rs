//! Script registry — module function calls and the page's main module.
//!
//! In development mode the page loads the module loader and asks it to call
//! each recorded function on its module, in call order:
//!
//! ```text
//! <script src="/static/loader.js" data-global="pagekit"></script>
//! <script>
//! pagekit.call("/js/Shop/Cart.js", "init", [1,"eur"]);
//! pagekit.main("/js/Shop/Main.js");
//! </script>
//! ```
//!
//! In optimized mode the loader is replaced by the pre-built bundle and the
//! module names are whatever the build step registered.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Component, Error, Result};
use crate::markup;
use crate::mode::{RenderGate, RenderMode};
use crate::optimizer::JsBundle;
use crate::resolver::{AssetIdentifier, PathResolver};

/// One recorded invocation. Calls are never de-duplicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsCall {
    pub module: String,
    pub function: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl JsCall {
    fn render(&self, global: &str) -> String {
        format!(
            "{global}.call({}, {}, {});",
            Value::String(self.module.clone()),
            Value::String(self.function.clone()),
            Value::Array(self.args.clone()),
        )
    }
}

/// Development-mode module loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsLoader {
    url: String,
    global: String,
}

impl JsLoader {
    /// `global` is the name the loader script exposes on `window`.
    pub fn new(url: impl Into<String>, global: impl Into<String>) -> Result<Self> {
        let global = global.into();
        if !markup::is_js_identifier(&global) {
            return Err(Error::invalid(global, "loader global must be a JavaScript identifier"));
        }
        Ok(Self {
            url: url.into(),
            global,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn global(&self) -> &str {
        &self.global
    }
}

impl Default for JsLoader {
    fn default() -> Self {
        Self {
            url: "/static/loader.js".into(),
            global: "pagekit".into(),
        }
    }
}

/// Script state for one page.
pub struct JsRegistry {
    mode: RenderMode,
    resolver: PathResolver,
    loader: JsLoader,
    gate: RenderGate,
    calls: Vec<JsCall>,
    main: Option<String>,
    bundle: Option<String>,
    optimized_calls: Vec<JsCall>,
    optimized_main: Option<String>,
}

impl JsRegistry {
    /// Standalone registry with its own render gate.
    pub fn new(mode: RenderMode, resolver: PathResolver, loader: JsLoader) -> Self {
        Self::with_gate(mode, resolver, loader, RenderGate::new())
    }

    pub(crate) fn with_gate(
        mode: RenderMode,
        resolver: PathResolver,
        loader: JsLoader,
        gate: RenderGate,
    ) -> Self {
        Self {
            mode,
            resolver,
            loader,
            gate,
            calls: Vec::new(),
            main: None,
            bundle: None,
            optimized_calls: Vec::new(),
            optimized_main: None,
        }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Record a call of `function` exported by module `name`.
    pub fn call(&mut self, name: &str, function: &str, args: Vec<Value>) -> Result<()> {
        self.gate.ensure_building(Component::Js)?;
        let module = AssetIdentifier::parse(name).resolve(&self.resolver, "js")?;
        let call = build_call(module, function, args)?;
        self.calls.push(call);
        Ok(())
    }

    /// Select the main module. The last call wins.
    pub fn set_main(&mut self, name: &str) -> Result<()> {
        self.gate.ensure_building(Component::Js)?;
        let module = AssetIdentifier::parse(name).resolve(&self.resolver, "js")?;
        if let Some(previous) = self.main.replace(module) {
            tracing::debug!(previous = %previous, "Replaced main module");
        }
        Ok(())
    }

    /// Record a call against a module id supplied by the build step, used verbatim.
    pub fn call_optimized(&mut self, module: &str, function: &str, args: Vec<Value>) -> Result<()> {
        self.gate.ensure_building(Component::Js)?;
        let call = build_call(module.trim().to_string(), function, args)?;
        self.optimized_calls.push(call);
        Ok(())
    }

    /// Select the main module by its build-step id. The last call wins.
    pub fn set_main_optimized(&mut self, module: &str) -> Result<()> {
        self.gate.ensure_building(Component::Js)?;
        self.optimized_main = Some(non_blank(module, "main module must not be empty")?);
        Ok(())
    }

    /// Reference to the pre-built bundle that replaces the loader.
    pub fn set_bundle(&mut self, url: &str) -> Result<()> {
        self.gate.ensure_building(Component::Js)?;
        self.bundle = Some(non_blank(url, "bundle reference must not be empty")?);
        Ok(())
    }

    /// Store the optimizer's output. Runs as part of the render step, so the
    /// gate is not consulted.
    pub(crate) fn install_optimized(&mut self, bundle: JsBundle) {
        if let Some(url) = bundle.bundle {
            self.bundle = Some(url);
        }
        self.optimized_calls.extend(bundle.calls);
        if let Some(main) = bundle.main {
            self.optimized_main = Some(main);
        }
    }

    pub fn calls(&self) -> &[JsCall] {
        &self.calls
    }

    pub fn main(&self) -> Option<&str> {
        self.main.as_deref()
    }

    pub fn optimized_calls(&self) -> &[JsCall] {
        &self.optimized_calls
    }

    pub fn optimized_main(&self) -> Option<&str> {
        self.optimized_main.as_deref()
    }

    pub fn bundle(&self) -> Option<&str> {
        self.bundle.as_deref()
    }

    pub(crate) fn has_development_entries(&self) -> bool {
        !self.calls.is_empty() || self.main.is_some()
    }

    pub(crate) fn has_optimized_entries(&self) -> bool {
        self.bundle.is_some() || !self.optimized_calls.is_empty() || self.optimized_main.is_some()
    }

    /// Render the markup for the current mode and freeze the page.
    pub fn render(&self) -> String {
        self.gate.seal();
        match self.mode {
            RenderMode::Development => {
                if !self.has_development_entries() {
                    return String::new();
                }
                let loader = markup::loader_src(self.loader.url(), self.loader.global());
                self.render_with(Some(loader), &self.calls, self.main.as_deref())
            }
            RenderMode::Optimized => {
                if self.has_development_entries() && !self.has_optimized_entries() {
                    tracing::warn!(
                        calls = self.calls.len(),
                        "Optimized render has no bundle references; development calls omitted"
                    );
                }
                self.render_with(
                    self.bundle.as_deref().map(markup::script_src),
                    &self.optimized_calls,
                    self.optimized_main.as_deref(),
                )
            }
        }
    }

    fn render_with(&self, bootstrap: Option<String>, calls: &[JsCall], main: Option<&str>) -> String {
        let global = self.loader.global();
        let mut parts = Vec::new();
        parts.extend(bootstrap);

        let mut statements: Vec<String> = calls.iter().map(|c| c.render(global)).collect();
        if let Some(main) = main {
            statements.push(format!("{global}.main({});", Value::String(main.to_string())));
        }
        if !statements.is_empty() {
            let body = markup::script_text(&statements.join("\n"));
            parts.push(format!("<script>\n{body}\n</script>"));
        }
        parts.join("\n")
    }
}

fn non_blank(reference: &str, reason: &str) -> Result<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(Error::invalid(reference, reason));
    }
    Ok(reference.to_string())
}

fn build_call(module: String, function: &str, args: Vec<Value>) -> Result<JsCall> {
    if module.is_empty() {
        return Err(Error::invalid(module, "module must not be empty"));
    }
    let function = function.trim();
    if !markup::is_js_identifier(function) {
        return Err(Error::invalid(function, "function name must be a JavaScript identifier"));
    }
    Ok(JsCall {
        module,
        function: function.to_string(),
        args,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry(mode: RenderMode) -> JsRegistry {
        JsRegistry::new(mode, PathResolver::new("/js"), JsLoader::default())
    }

    #[test]
    fn calls_render_in_order_with_json_args() {
        let mut js = registry(RenderMode::Development);
        js.call("Shop.Cart", "init", vec![json!(1), json!("eur")]).unwrap();
        js.call("/js/vendor/analytics.js", "track", vec![json!({"page": "cart"})])
            .unwrap();
        js.call("Shop.Cart", "init", vec![json!(1), json!("eur")]).unwrap();

        assert_eq!(
            js.render(),
            "<script src=\"/static/loader.js\" data-global=\"pagekit\"></script>\n<script>\n\
             pagekit.call(\"/js/Shop/Cart.js\", \"init\", [1,\"eur\"]);\n\
             pagekit.call(\"/js/vendor/analytics.js\", \"track\", [{\"page\":\"cart\"}]);\n\
             pagekit.call(\"/js/Shop/Cart.js\", \"init\", [1,\"eur\"]);\n</script>"
        );
    }

    #[test]
    fn main_last_write_wins_and_renders_after_calls() {
        let mut js = registry(RenderMode::Development);
        js.set_main("Shop.Main").unwrap();
        js.call("Shop.Cart", "init", vec![]).unwrap();
        js.set_main("Shop::Checkout").unwrap();

        assert_eq!(js.main(), Some("/js/Shop/Checkout.js"));
        let html = js.render();
        assert!(html.ends_with("pagekit.main(\"/js/Shop/Checkout.js\");\n</script>"));
        assert!(!html.contains("Shop/Main.js"));
    }

    #[test]
    fn empty_registry_renders_nothing() {
        assert_eq!(registry(RenderMode::Development).render(), "");
        assert_eq!(registry(RenderMode::Optimized).render(), "");
    }

    #[test]
    fn rejects_bad_function_names() {
        let mut js = registry(RenderMode::Development);
        let err = js.call("Shop.Cart", "init();alert", vec![]).unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier { .. }));
        assert!(js.call("", "init", vec![]).is_err());
        assert!(js.calls().is_empty());
    }

    #[test]
    fn script_close_in_args_is_neutralised() {
        let mut js = registry(RenderMode::Development);
        js.call("Shop.Cart", "say", vec![json!("</script><b>")]).unwrap();
        let html = js.render();
        assert!(html.contains(r#"["\u003c/script>\u003cb>"]"#));
        assert_eq!(html.matches("</script>").count(), 2);
    }

    #[test]
    fn comment_open_in_args_cannot_swallow_the_page() {
        let mut js = registry(RenderMode::Development);
        js.call("Shop.Cart", "say", vec![json!("<!--<script>")]).unwrap();
        let html = js.render();
        assert!(html.contains(r#"pagekit.call("/js/Shop/Cart.js", "say", ["\u003c!--\u003cscript>"]);"#));
        // Only the loader tag and the inline block open a script element.
        assert_eq!(html.matches('<').count(), 4);
        assert!(!html.contains("<!--"));
    }

    #[test]
    fn custom_loader_global_is_announced_to_the_loader() {
        let loader = JsLoader::new("/static/loader.js", "app").unwrap();
        let mut js = JsRegistry::new(RenderMode::Development, PathResolver::new("/js"), loader);
        js.call("Shop.Cart", "init", vec![]).unwrap();
        let html = js.render();
        assert!(html.starts_with(r#"<script src="/static/loader.js" data-global="app"></script>"#));
        assert!(html.contains(r#"app.call("/js/Shop/Cart.js", "init", []);"#));
    }

    #[test]
    fn blank_optimized_references_are_rejected() {
        let mut js = registry(RenderMode::Optimized);
        let err = js.set_bundle("  ").unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier { .. }));
        assert!(js.set_main_optimized("").is_err());
        assert!(js.call_optimized("", "init", vec![]).is_err());
        assert_eq!(js.bundle(), None);
        assert_eq!(js.optimized_main(), None);
        assert_eq!(js.render(), "");
    }

    #[test]
    fn optimized_mode_uses_bundle_only() {
        let mut js = registry(RenderMode::Optimized);
        js.call("Shop.Cart", "init", vec![json!(1)]).unwrap();
        js.set_main("Shop.Main").unwrap();
        js.set_bundle("/build/app.js").unwrap();
        js.call_optimized("shop/cart", "init", vec![json!(1)]).unwrap();
        js.set_main_optimized("shop/main").unwrap();

        assert_eq!(
            js.render(),
            "<script src=\"/build/app.js\"></script>\n<script>\n\
             pagekit.call(\"shop/cart\", \"init\", [1]);\n\
             pagekit.main(\"shop/main\");\n</script>"
        );
    }

    #[test]
    fn optimized_mode_never_emits_development_calls() {
        let mut js = registry(RenderMode::Optimized);
        js.call("Shop.Cart", "init", vec![]).unwrap();
        js.set_main("Shop.Main").unwrap();
        assert_eq!(js.render(), "");
    }

    #[test]
    fn loader_global_is_validated() {
        assert!(JsLoader::new("/l.js", "my-loader").is_err());
        let loader = JsLoader::new("/l.js", "app").unwrap();
        let mut js = JsRegistry::new(RenderMode::Development, PathResolver::new("/js"), loader);
        js.set_main("Main").unwrap();
        assert!(js.render().contains("app.main(\"/js/Main.js\");"));
    }

    #[test]
    fn mutation_after_render_fails() {
        let mut js = registry(RenderMode::Development);
        js.render();
        let err = js.set_main("Shop.Main").unwrap_err();
        assert!(matches!(err, Error::FrozenState { component: Component::Js }));
        assert!(js.set_bundle("/build/app.js").is_err());
    }
}
