//! CLI command implementations.

pub mod init;
pub mod label;
pub mod register_labels;
pub mod serve;
pub mod show;
pub mod status;

use std::sync::Arc;
use std::time::Duration;

use sortinghat_classifier::OpenAiClassifier;
use sortinghat_config::AppConfig;
use sortinghat_core::store::LabelStore;
use sortinghat_core::subject::Did;
use sortinghat_labeler::{Dispatcher, SignedSink};
use sortinghat_profile::BskyClient;
use sortinghat_store::SqliteLabelStore;

/// Everything the label-processing commands need, wired from config.
pub struct Runtime {
    pub dispatcher: Arc<Dispatcher>,
    pub store: Arc<dyn LabelStore>,
}

/// Wire the full dispatch pipeline from a validated config.
///
/// Fails fast on missing signing material or classifier credentials so a
/// misconfigured process never reaches the first event.
pub async fn build_runtime(config: &AppConfig) -> Result<Runtime, Box<dyn std::error::Error>> {
    if config.issuer_did.is_empty() {
        return Err("issuer_did is not configured — run `sortinghat init` and edit the config".into());
    }
    let seed = config.signing_key_bytes()?;
    let api_key = config
        .classifier
        .api_key
        .clone()
        .ok_or("classifier API key is not configured (set OPENAI_API_KEY)")?;

    let store: Arc<dyn LabelStore> = Arc::new(SqliteLabelStore::open(&config.store.db_path).await?);
    let profiles = Arc::new(BskyClient::new(
        config.network.appview_url.as_str(),
        config.network.pds_url.as_str(),
    ));
    let classifier = Arc::new(OpenAiClassifier::new(
        config.classifier.api_url.as_str(),
        api_key,
        config.classifier.model.as_str(),
        Duration::from_secs(config.classifier.timeout_secs),
    ));
    let sink = SignedSink::new(Did::new(&config.issuer_did), seed, store.clone());

    let dispatcher = Dispatcher::new(
        store.clone(),
        profiles,
        classifier,
        sink,
        config.revocation_marker.clone(),
        config.network.avatar_size,
    );

    Ok(Runtime {
        dispatcher: Arc::new(dispatcher),
        store,
    })
}
