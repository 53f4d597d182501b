//! `pagekit init` — Write a starter configuration.

use std::path::Path;

const STARTER_CONFIG: &str = r#"mode = "development"

[title]
separator = " - "
base = "My Site"

[css]
root = "/css"

[js]
root = "/js"
loader_url = "/static/loader.js"
loader_global = "pagekit"

[manifests]
dir = "manifests"

[[pages]]
name = "home"
title = ["Home"]
keywords = ["home"]
css = [{ source = "/static/base.css" }, { source = "Site.Home" }]
css_lists = [{ source = "Site.Common", push = true }]
js = [{ module = "Site.Home", function = "init", args = [] }]
body = "<main id=\"app\"></main>"
"#;

const STARTER_MANIFEST: &str = "# Stylesheets shared by every page\nSite.Reset\nSite.Layout\n";

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = super::config_path(config_path);
    let config_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    println!("pagekit — First-Time Setup");
    println!("==========================\n");

    if !config_dir.as_os_str().is_empty() && !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    }

    let manifest_dir = config_dir.join("manifests").join("Site");
    if !manifest_dir.exists() {
        std::fs::create_dir_all(&manifest_dir)?;
        std::fs::write(manifest_dir.join("Common.txt"), STARTER_MANIFEST)?;
        println!("✅ Created manifest: {}", manifest_dir.join("Common.txt").display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run init.\n");
    } else {
        std::fs::write(&config_path, STARTER_CONFIG)?;
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\nNext steps:");
        println!("   1. Run: pagekit render home");
        println!("   2. Run: pagekit serve\n");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_config_is_valid() {
        let config: pagekit_config::AppConfig = toml::from_str(STARTER_CONFIG).unwrap();
        assert!(config.validate().is_ok());
        assert!(config.page("home").is_some());
    }

    #[test]
    fn starter_manifest_parses() {
        let entries = pagekit_core::manifest::parse_manifest("Common.txt", STARTER_MANIFEST).unwrap();
        assert_eq!(entries, ["Site.Reset", "Site.Layout"]);
    }
}
