//! `sortinghat serve` — Start the labeler gateway.

use std::sync::Arc;

use sortinghat_config::AppConfig;
use sortinghat_gateway::GatewayState;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    let runtime = super::build_runtime(&config).await?;

    println!("Sorting Hat labeler");
    println!("   Issuer:    {}", config.issuer_did);
    println!("   Ledger:    {}", config.store.db_path);
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);

    let state = Arc::new(GatewayState {
        dispatcher: runtime.dispatcher,
        store: runtime.store,
    });
    sortinghat_gateway::start(&config, state).await?;

    Ok(())
}
