//! `sortinghat label` — Process one subject from the command line.
//!
//! Runs the same pipeline a live moderation event would, so a manual run is
//! indistinguishable from a delivered one in the ledger.

use sortinghat_config::AppConfig;
use sortinghat_core::event::ModerationEvent;
use sortinghat_labeler::Outcome;

pub async fn run(subject: String, negate: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let runtime = super::build_runtime(&config).await?;

    let event_key = if negate {
        config.revocation_marker.clone()
    } else {
        "manual".to_string()
    };
    let event = ModerationEvent { subject, event_key };

    match runtime.dispatcher.handle(&event).await? {
        Outcome::Labeled(house) => println!("Labeled {} as {house}", event.subject),
        Outcome::AlreadyLabeled(house) => {
            println!("{} is already labeled {house}, nothing to do", event.subject)
        }
        Outcome::Negated(house) => println!("Negated {house} on {}", event.subject),
        Outcome::NothingToNegate => {
            println!("{} carries no active label, nothing to negate", event.subject)
        }
    }

    Ok(())
}
