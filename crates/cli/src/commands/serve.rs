//! `pagekit serve` — Start the HTTP gateway.

use std::path::Path;
use tracing::info;

pub async fn run(
    config_path: Option<&Path>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(config_path)?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("pagekit gateway");
    println!("   Listening: http://{}:{}", config.gateway.host, config.gateway.port);
    println!("   Mode:      {}", config.mode);
    println!("   Pages:     {}", config.pages.len());

    info!(
        host = %config.gateway.host,
        port = config.gateway.port,
        "Starting gateway from CLI"
    );
    pagekit_gateway::start(config).await?;

    Ok(())
}
