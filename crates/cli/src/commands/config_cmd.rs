//! `pagekit config` — Configuration management commands.

use std::path::Path;

pub async fn validate(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("Validating configuration...");

    let config = match super::load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("   ❌ {e}");
            return Err(e.into());
        }
    };
    println!("   ✅ Config parsed successfully");

    // Build every page once so manifest and identifier errors surface here.
    let environment = config.environment()?;
    let mut failures = 0;
    for page in &config.pages {
        let mut assets = environment.page();
        match page.apply_to(&mut assets).and_then(|()| assets.render()) {
            Ok(_) => println!("   ✅ page '{}'", page.name),
            Err(e) => {
                failures += 1;
                println!("   ❌ page '{}': {e}", page.name);
            }
        }
    }

    println!();
    println!("   Mode:      {}", config.mode);
    println!("   CSS root:  {}", config.css.root);
    println!("   JS root:   {}", config.js.root);
    println!("   Pages:     {}", config.pages.len());

    if failures > 0 {
        return Err(format!("{failures} page(s) failed to render").into());
    }
    Ok(())
}

pub async fn show(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", super::config_path(config_path).display());
    Ok(())
}
