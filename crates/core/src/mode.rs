//! Render mode and the per-page `Building → Rendered` lifecycle.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Component, Error, Result};

/// Selects how every registry renders for the lifetime of a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// One reference per registered source, one call per recorded invocation.
    #[default]
    Development,
    /// Only the pre-built references supplied by the build step.
    Optimized,
}

impl RenderMode {
    pub fn is_optimized(self) -> bool {
        matches!(self, Self::Optimized)
    }
}

impl std::fmt::Display for RenderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Development => "development",
            Self::Optimized => "optimized",
        })
    }
}

impl std::str::FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "optimized" | "optimised" | "production" | "prod" => Ok(Self::Optimized),
            other => Err(format!(
                "unknown render mode '{other}' (expected 'development' or 'optimized')"
            )),
        }
    }
}

/// Shared `Building → Rendered` switch for one page.
///
/// Clones observe the same state. The facade hands one gate to all four
/// registries, so the first render of any component freezes them all.
#[derive(Debug, Clone, Default)]
pub struct RenderGate {
    rendered: Arc<AtomicBool>,
}

impl RenderGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a render has happened.
    pub fn is_rendered(&self) -> bool {
        self.rendered.load(Ordering::Acquire)
    }

    /// Transition to `Rendered`. Idempotent.
    pub fn seal(&self) {
        self.rendered.store(true, Ordering::Release);
    }

    /// Fail with `FrozenState` if the page has been rendered.
    pub fn ensure_building(&self, component: Component) -> Result<()> {
        if self.is_rendered() {
            tracing::warn!(component = %component, "Mutation attempted after render");
            return Err(Error::FrozenState { component });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_render_mode() {
        assert_eq!("development".parse::<RenderMode>(), Ok(RenderMode::Development));
        assert_eq!(" Optimized ".parse::<RenderMode>(), Ok(RenderMode::Optimized));
        assert_eq!("prod".parse::<RenderMode>(), Ok(RenderMode::Optimized));
        assert!("fast".parse::<RenderMode>().is_err());
    }

    #[test]
    fn gate_is_shared_between_clones() {
        let gate = RenderGate::new();
        let other = gate.clone();
        assert!(gate.ensure_building(Component::Meta).is_ok());

        other.seal();
        assert!(gate.is_rendered());
        let err = gate.ensure_building(Component::Meta).unwrap_err();
        assert!(matches!(
            err,
            Error::FrozenState {
                component: Component::Meta
            }
        ));
    }
}
