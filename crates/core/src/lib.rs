//! # pagekit core
//!
//! Per-request registry of page-level assets: stylesheets, inline CSS,
//! script module calls, the main script module, `<meta>` elements and the
//! page title, rendered into head markup in either development or
//! optimized mode.
//!
//! ## Design
//!
//! - One [`OrderedAssetList`] implementation backs every ordered list, so
//!   push/append/re-add semantics are identical everywhere.
//! - Symbolic names (`Shop.Checkout`) and literal URLs are unified by the
//!   [`PathResolver`] before de-duplication.
//! - A single [`RenderMode`] is fixed per page and consumed by every registry.
//! - A shared [`RenderGate`] freezes the page on its first render.
//! - Pages are created per request from an [`AssetEnvironment`]; nothing
//!   mutable is shared between requests.

pub mod assets;
pub mod css;
pub mod error;
pub mod js;
pub mod manifest;
pub mod markup;
pub mod meta;
pub mod mode;
pub mod optimizer;
pub mod ordered;
pub mod resolver;
pub mod title;

// Re-export key types at crate root for ergonomics
pub use assets::{AssetEnvironment, AssetSettings, RenderedHead, WebAssets};
pub use css::{CssRegistry, CssSource};
pub use error::{Component, Error, Result};
pub use js::{JsCall, JsLoader, JsRegistry};
pub use manifest::{FsManifestSource, InMemoryManifests, ManifestSource, NoManifests};
pub use meta::{MetaElement, MetaRegistry};
pub use mode::{RenderGate, RenderMode};
pub use optimizer::{BundleIndex, JsBundle, Optimizer};
pub use ordered::{End, Identified, OrderedAssetList};
pub use resolver::{AssetIdentifier, PathResolver};
pub use title::TitleStack;
