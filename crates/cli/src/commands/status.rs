//! `sortinghat status` — Show configuration and ledger status.

use sortinghat_config::AppConfig;
use sortinghat_core::store::LabelStore;
use sortinghat_store::SqliteLabelStore;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("Sorting Hat Status");
    println!("==================");
    println!("  Config dir:  {}", AppConfig::config_dir().display());
    println!("  Issuer:      {}", if config.issuer_did.is_empty() { "(unset)" } else { &config.issuer_did });
    println!("  Signing key: {}", if config.signing_key.is_some() { "configured" } else { "(unset)" });
    println!("  Ledger:      {}", config.store.db_path);
    println!("  Gateway:     {}:{}", config.gateway.host, config.gateway.port);
    println!("  AppView:     {}", config.network.appview_url);
    println!("  Classifier:  {} @ {}", config.classifier.model, config.classifier.api_url);
    println!(
        "  API key:     {}",
        if config.classifier.api_key.is_some() { "configured" } else { "(unset)" }
    );

    match SqliteLabelStore::open(&config.store.db_path).await {
        Ok(store) => {
            let count = store.count().await?;
            println!("\n  Ledger events: {count}");
        }
        Err(e) => println!("\n  Ledger unavailable: {e}"),
    }

    Ok(())
}
