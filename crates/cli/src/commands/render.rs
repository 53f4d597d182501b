//! `pagekit render` — Render one configured page to stdout.

use pagekit_core::RenderMode;
use std::path::Path;
use tracing::{debug, info};

pub async fn run(
    config_path: Option<&Path>,
    page_name: &str,
    mode: Option<RenderMode>,
    fragments: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(config_path)?;
    if let Some(mode) = mode {
        config.mode = mode;
    }

    let page = config.page(page_name).ok_or_else(|| {
        let known: Vec<&str> = config.pages.iter().map(|p| p.name.as_str()).collect();
        format!("Unknown page '{page_name}' (configured: {})", known.join(", "))
    })?;

    info!(page = %page.name, mode = %config.mode, "Rendering page");
    let environment = config.environment()?;
    let mut assets = environment.page();
    page.apply_to(&mut assets)?;
    let head = assets.render()?;
    debug!(
        css = head.css.len(),
        js = head.js.len(),
        meta = head.meta.len(),
        "Rendered head fragments"
    );

    if fragments {
        println!("{}", serde_json::to_string_pretty(&head)?);
    } else {
        print!("{}", head.document(page.body.as_deref().unwrap_or_default()));
    }

    Ok(())
}
