//! `pagekit resolve` — Show where an asset identifier points.

use pagekit_core::{AssetIdentifier, PathResolver};
use std::path::Path;

pub async fn run(
    config_path: Option<&Path>,
    name: &str,
    ext: &str,
    root: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let root = root.unwrap_or_else(|| match ext.trim_start_matches('.') {
        "css" => config.css.root.clone(),
        "js" => config.js.root.clone(),
        _ => String::new(),
    });

    let identifier = AssetIdentifier::parse(name);
    let resolved = identifier.resolve(&PathResolver::new(root), ext)?;
    if identifier.is_symbolic() {
        println!("{resolved}");
    } else {
        println!("{resolved}  (literal, not resolved)");
    }

    Ok(())
}
