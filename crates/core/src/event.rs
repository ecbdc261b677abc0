//! Inbound moderation events and the assign/negate action mapping.

use serde::{Deserialize, Serialize};

/// An inbound event from the external moderation-event source.
///
/// The source posts one of these whenever a subject opts in (record creation)
/// or opts out (record deletion). `event_key` carrying the configured
/// revocation marker signals a negation; any other key signals an assignment.
/// That mapping is an external convention, carried in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationEvent {
    /// DID or handle of the subject account.
    pub subject: String,

    /// Record key from the originating event.
    pub event_key: String,
}

impl ModerationEvent {
    /// Map the event key to an action using the configured revocation marker.
    pub fn action(&self, revocation_marker: &str) -> Action {
        if self.event_key.contains(revocation_marker) {
            Action::Negate
        } else {
            Action::Assign
        }
    }
}

/// The two external stimuli the label state machine responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Assign,
    Negate,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &str = "3l3izhv734g2o";

    #[test]
    fn revocation_marker_maps_to_negate() {
        let event = ModerationEvent {
            subject: "did:plc:abc".into(),
            event_key: format!("rkey-{MARKER}-suffix"),
        };
        assert_eq!(event.action(MARKER), Action::Negate);
    }

    #[test]
    fn other_keys_map_to_assign() {
        let event = ModerationEvent {
            subject: "did:plc:abc".into(),
            event_key: "3k7qmnev4xg2p".into(),
        };
        assert_eq!(event.action(MARKER), Action::Assign);
    }
}
