//! Error types for page asset registration and rendering.
//!
//! Uses `thiserror` for ergonomic error definitions.

use thiserror::Error;

/// The top-level error type for all pagekit asset operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Identifier resolution ---
    #[error("Invalid identifier '{name}': {reason}")]
    InvalidIdentifier { name: String, reason: String },

    // --- Lifecycle ---
    #[error("Cannot modify {component} assets: the page has already been rendered")]
    FrozenState { component: Component },

    // --- Manifests ---
    #[error("Failed to read manifest '{location}': {reason}")]
    ManifestRead { location: String, reason: String },

    // --- Optimizer collaborator ---
    #[error("Optimizer error: {reason}")]
    Optimizer { reason: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn manifest(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ManifestRead {
            location: location.into(),
            reason: reason.into(),
        }
    }
}

/// The page component an operation targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Css,
    Js,
    Meta,
    Title,
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Css => "css",
            Self::Js => "js",
            Self::Meta => "meta",
            Self::Title => "title",
        })
    }
}
