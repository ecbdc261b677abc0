//! `sortinghat register-labels` — Publish the house label definitions.
//!
//! One-time setup: writes the `app.bsky.labeler.service` record into the
//! issuer's repository so clients know how to render the four houses.

use sortinghat_config::AppConfig;
use sortinghat_labeler::definitions;
use sortinghat_profile::BskyClient;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let identifier = config
        .network
        .identifier
        .as_deref()
        .ok_or("BSKY_IDENTIFIER is not configured")?;
    let password = config
        .network
        .password
        .as_deref()
        .ok_or("BSKY_PASSWORD is not configured")?;

    let client = BskyClient::new(
        config.network.appview_url.as_str(),
        config.network.pds_url.as_str(),
    );

    println!("Logging in as {identifier}...");
    let session = client.login(identifier, password).await?;

    let record = definitions::labeler_service_record();
    client
        .put_record(&session, "app.bsky.labeler.service", "self", record)
        .await?;

    let defs = definitions::house_definitions();
    println!("Registered {} label definitions for {}", defs.len(), session.did);
    for definition in &defs {
        println!("  - {}", definition.identifier);
    }

    Ok(())
}
