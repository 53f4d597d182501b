//! `<meta>` element registry with a merged keywords element.

use indexmap::{IndexMap, IndexSet};
use std::collections::BTreeMap;

use crate::error::{Component, Error, Result};
use crate::markup;
use crate::mode::RenderGate;

/// A single `<meta>` element. Attributes render in the order given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaElement {
    attributes: Vec<(String, String)>,
}

impl MetaElement {
    /// Build an element. A repeated attribute name keeps its last value.
    pub fn new<I, K, V>(attributes: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut attrs: IndexMap<String, String> = IndexMap::new();
        for (key, value) in attributes {
            let key: String = key.into();
            let key = key.trim().to_ascii_lowercase();
            if !is_attribute_name(&key) {
                return Err(Error::invalid(key, "not a valid attribute name"));
            }
            attrs.insert(key, value.into());
        }
        if attrs.is_empty() {
            return Err(Error::invalid("meta", "element needs at least one attribute"));
        }
        Ok(Self {
            attributes: attrs.into_iter().collect(),
        })
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn content_key(&self) -> BTreeMap<String, String> {
        self.attributes.iter().cloned().collect()
    }

    fn render(&self) -> String {
        markup::void_element(
            "meta",
            self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        )
    }
}

fn is_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum MetaKey {
    Explicit(String),
    Content(BTreeMap<String, String>),
}

/// Meta elements and keywords for one page.
#[derive(Debug, Default)]
pub struct MetaRegistry {
    gate: RenderGate,
    elements: IndexMap<MetaKey, MetaElement>,
    keywords: IndexSet<String>,
}

impl MetaRegistry {
    /// Standalone registry with its own render gate.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_gate(gate: RenderGate) -> Self {
        Self {
            gate,
            ..Self::default()
        }
    }

    /// Add an element. An element with identical attributes is not repeated.
    pub fn add_element<I, K, V>(&mut self, attributes: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.gate.ensure_building(Component::Meta)?;
        let element = MetaElement::new(attributes)?;
        self.elements
            .entry(MetaKey::Content(element.content_key()))
            .or_insert(element);
        Ok(())
    }

    /// Add or overwrite the element registered under `key`.
    ///
    /// Overwriting keeps the element's original position.
    pub fn set_element<I, K, V>(&mut self, key: &str, attributes: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.gate.ensure_building(Component::Meta)?;
        let element = MetaElement::new(attributes)?;
        if let Some(previous) = self.elements.insert(MetaKey::Explicit(key.to_string()), element) {
            tracing::debug!(key, replaced = ?previous.attributes(), "Overwrote meta element");
        }
        Ok(())
    }

    /// Add a keyword. Commas split a value into several keywords.
    pub fn add_keyword(&mut self, word: &str) -> Result<()> {
        self.add_keywords([word])
    }

    pub fn add_keywords<I, S>(&mut self, words: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.gate.ensure_building(Component::Meta)?;
        for word in words {
            for part in word.as_ref().split(',') {
                let part = part.trim();
                if !part.is_empty() {
                    self.keywords.insert(part.to_string());
                }
            }
        }
        Ok(())
    }

    pub fn elements(&self) -> impl Iterator<Item = &MetaElement> {
        self.elements.values()
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    /// Render all elements, then the combined keywords element, and freeze the page.
    pub fn render(&self) -> String {
        self.gate.seal();
        let mut parts: Vec<String> = self.elements.values().map(MetaElement::render).collect();
        if !self.keywords.is_empty() {
            let joined = self.keywords.iter().map(String::as_str).collect::<Vec<_>>().join(",");
            parts.push(markup::void_element(
                "meta",
                [("name", "keywords"), ("content", joined.as_str())],
            ));
        }
        parts.join("\n")
    }
}
