//! Symbolic identifier resolution.
//!
//! Pages refer to assets either by a literal URL (`/css/site.css`,
//! `https://cdn.example.com/reset.css`) or by a namespaced symbolic name
//! (`Shop.Checkout`, `Shop::Checkout`, `Shop\Checkout`). Symbolic names are
//! mapped deterministically onto a root-relative path:
//!
//! ```text
//! Shop.Checkout  + "css"  ->  /css/Shop/Checkout.css
//! Shop::Cart     + "js"   ->  /js/Shop/Cart.js
//! ```

use crate::error::{Error, Result};

/// Namespace separators accepted in symbolic names.
const SEPARATORS: [&str; 3] = ["::", "\\", "."];

/// Maps symbolic names onto paths below a fixed root.
///
/// Pure: holds only the root prefix, performs no I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    root: String,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new("")
    }
}

impl PathResolver {
    /// Create a resolver rooted at `root` (e.g. `/css`). Trailing slashes are dropped.
    pub fn new(root: impl Into<String>) -> Self {
        let root = root.into();
        let trimmed = root.trim().trim_end_matches('/');
        let root = if trimmed.is_empty() || trimmed.starts_with('/') || has_scheme(trimmed) {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        };
        Self { root }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Resolve `name` to `<root>/<segments>.<extension>`.
    ///
    /// An extension already present on `name` is not repeated, so
    /// `Shop.Checkout` and `Shop.Checkout.css` are equivalent spellings.
    pub fn resolve(&self, name: &str, extension: &str) -> Result<String> {
        let extension = extension.trim().trim_start_matches('.');
        if extension.is_empty() {
            return Err(Error::invalid(name, "extension must not be empty"));
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(Error::invalid(name, "name must not be empty"));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(Error::invalid(name, "name must not contain whitespace"));
        }

        let stem = name
            .strip_suffix(extension)
            .and_then(|s| s.strip_suffix('.'))
            .unwrap_or(name);

        let mut path = stem.to_string();
        for sep in SEPARATORS {
            path = path.replace(sep, "/");
        }

        if path.split('/').any(str::is_empty) {
            return Err(Error::invalid(name, "empty namespace segment"));
        }

        Ok(format!("{}/{}.{}", self.root, path, extension))
    }
}

/// A reference to an asset as written by page code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetIdentifier {
    /// Used verbatim.
    Literal(String),
    /// Needs a [`PathResolver`].
    Symbolic(String),
}

impl AssetIdentifier {
    /// Classify a raw location.
    ///
    /// Anything containing `/` or starting with a URL scheme is literal;
    /// everything else is a symbolic name.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.contains('/') || has_scheme(raw) {
            Self::Literal(raw.to_string())
        } else {
            Self::Symbolic(raw.to_string())
        }
    }

    /// Turn the identifier into a concrete location.
    pub fn resolve(&self, resolver: &PathResolver, extension: &str) -> Result<String> {
        match self {
            Self::Literal(url) => Ok(url.clone()),
            Self::Symbolic(name) => resolver.resolve(name, extension),
        }
    }

    pub fn is_symbolic(&self) -> bool {
        matches!(self, Self::Symbolic(_))
    }
}

/// `scheme:` prefix per RFC 3986 (`https:`, `data:`, `blob:`), but not `Ns::Name`.
fn has_scheme(raw: &str) -> bool {
    let Some(colon) = raw.find(':') else {
        return false;
    };
    let (scheme, rest) = raw.split_at(colon);
    let mut chars = scheme.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    starts_alpha
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        && !rest[1..].starts_with(':')
}
