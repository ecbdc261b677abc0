//! `sortinghat show` — Show a subject's label history and current state.

use sortinghat_config::AppConfig;
use sortinghat_core::label::LabelState;
use sortinghat_core::profile::ProfileProvider;
use sortinghat_core::store::LabelStore;
use sortinghat_core::subject::Did;
use sortinghat_profile::BskyClient;
use sortinghat_store::SqliteLabelStore;

pub async fn run(subject: String) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let store = SqliteLabelStore::open(&config.store.db_path).await?;

    let did = if Did::is_did(&subject) {
        Did::new(&subject)
    } else {
        let client = BskyClient::new(
            config.network.appview_url.as_str(),
            config.network.pds_url.as_str(),
        );
        client.resolve_handle(&subject).await?
    };

    let history = store.history(&did).await?;
    if history.is_empty() {
        println!("{did}: no labels on record");
        return Ok(());
    }

    println!("Ledger for {did}:");
    for event in &history {
        let polarity = if event.negated { "negate" } else { "assert" };
        println!(
            "  #{:<4} {} {:<10} {}",
            event.seq, polarity, event.category, event.timestamp
        );
    }

    match LabelState::fold(&history) {
        LabelState::Unlabeled => println!("\nCurrent state: unlabeled"),
        LabelState::Labeled(house) => println!("\nCurrent state: {house}"),
        LabelState::Conflicted(categories) => {
            let names: Vec<String> = categories.iter().map(|c| c.to_string()).collect();
            println!(
                "\nCurrent state: CONFLICTED ({}) — manual ledger repair required",
                names.join(", ")
            );
        }
    }

    Ok(())
}
