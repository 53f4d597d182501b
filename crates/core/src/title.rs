//! Page title with set/append/push semantics.

use crate::error::{Component, Result};
use crate::markup;
use crate::mode::RenderGate;

pub const DEFAULT_SEPARATOR: &str = " - ";

/// Builds the `<title>` from pieces contributed by page code.
///
/// `None` arguments are no-ops. The separator is skipped when either side is empty.
#[derive(Debug)]
pub struct TitleStack {
    gate: RenderGate,
    separator: String,
    title: String,
}

impl Default for TitleStack {
    fn default() -> Self {
        Self::new(DEFAULT_SEPARATOR)
    }
}

impl TitleStack {
    /// Standalone title with its own render gate.
    pub fn new(separator: impl Into<String>) -> Self {
        Self::with_gate(separator, RenderGate::new())
    }

    pub(crate) fn with_gate(separator: impl Into<String>, gate: RenderGate) -> Self {
        Self {
            gate,
            separator: separator.into(),
            title: String::new(),
        }
    }

    /// Initial title for a fresh page, applied before page code runs.
    pub(crate) fn seed(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Replace the whole title.
    pub fn set(&mut self, title: Option<&str>) -> Result<()> {
        let Some(title) = title else { return Ok(()) };
        self.gate.ensure_building(Component::Title)?;
        self.title = title.to_string();
        Ok(())
    }

    /// `current + separator + addendum`
    pub fn append(&mut self, addendum: Option<&str>) -> Result<()> {
        let Some(addendum) = addendum else { return Ok(()) };
        self.gate.ensure_building(Component::Title)?;
        self.title = self.join(&self.title, addendum);
        Ok(())
    }

    /// `prefix + separator + current`
    pub fn push(&mut self, prefix: Option<&str>) -> Result<()> {
        let Some(prefix) = prefix else { return Ok(()) };
        self.gate.ensure_building(Component::Title)?;
        self.title = self.join(prefix, &self.title);
        Ok(())
    }

    pub fn get(&self) -> &str {
        &self.title
    }

    /// Render `<title>` (empty when unset) and freeze the page.
    pub fn render(&self) -> String {
        self.gate.seal();
        format!("<title>{}</title>", markup::escape(&self.title))
    }

    fn join(&self, left: &str, right: &str) -> String {
        match (left.is_empty(), right.is_empty()) {
            (true, _) => right.to_string(),
            (_, true) => left.to_string(),
            _ => format!("{left}{}{right}", self.separator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn set_append_push() {
        let mut title = TitleStack::new(" - ");
        title.set(Some("Shop")).unwrap();
        title.append(Some("Checkout")).unwrap();
        assert_eq!(title.get(), "Shop - Checkout");
        title.push(Some("Site")).unwrap();
        assert_eq!(title.get(), "Site - Shop - Checkout");
    }

    #[test]
    fn separator_skipped_when_empty() {
        let mut title = TitleStack::default();
        title.append(Some("Cart")).unwrap();
        assert_eq!(title.get(), "Cart");

        let mut title = TitleStack::default();
        title.push(Some("Site")).unwrap();
        assert_eq!(title.get(), "Site");
    }

    #[test]
    fn none_is_a_noop() {
        let mut title = TitleStack::default();
        title.set(Some("Shop")).unwrap();
        title.set(None).unwrap();
        title.append(None).unwrap();
        title.push(None).unwrap();
        assert_eq!(title.get(), "Shop");
    }

    #[test]
    fn unset_title_renders_empty_element() {
        assert_eq!(TitleStack::default().render(), "<title></title>");
    }

    #[test]
    fn render_escapes_and_freezes() {
        let mut title = TitleStack::default();
        title.set(Some("Fish & <Chips>")).unwrap();
        assert_eq!(title.render(), "<title>Fish &amp; &lt;Chips&gt;</title>");

        let err = title.append(Some("Late")).unwrap_err();
        assert!(matches!(err, Error::FrozenState { component: Component::Title }));
        assert!(title.append(None).is_ok());
        assert_eq!(title.get(), "Fish & <Chips>");
    }
}
