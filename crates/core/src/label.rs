//! Labels — the four houses, signed label events, and derived label state.
//!
//! The ledger of [`LabelEvent`]s is the source of truth. "Current state" is
//! always a fold over a subject's events, never a cached value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::subject::Did;

/// The four mutually exclusive classification outcomes.
///
/// Closed set, known at compile time. The wire names are the lowercase
/// house names — these are the label values third-party clients see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum House {
    Gryffindor,
    Slytherin,
    Ravenclaw,
    Hufflepuff,
}

impl House {
    /// All houses, in taxonomy order.
    pub const ALL: [House; 4] = [
        House::Gryffindor,
        House::Slytherin,
        House::Ravenclaw,
        House::Hufflepuff,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            House::Gryffindor => "gryffindor",
            House::Slytherin => "slytherin",
            House::Ravenclaw => "ravenclaw",
            House::Hufflepuff => "hufflepuff",
        }
    }
}

impl std::fmt::Display for House {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for House {
    type Err = UnknownHouse;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gryffindor" => Ok(House::Gryffindor),
            "slytherin" => Ok(House::Slytherin),
            "ravenclaw" => Ok(House::Ravenclaw),
            "hufflepuff" => Ok(House::Hufflepuff),
            other => Err(UnknownHouse(other.to_string())),
        }
    }
}

/// Returned when a string is not one of the four house names.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown house: {0}")]
pub struct UnknownHouse(pub String);

/// Whether a label event asserts or revokes a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Assert,
    Negate,
}

impl Polarity {
    pub fn is_negation(&self) -> bool {
        matches!(self, Polarity::Negate)
    }
}

/// An immutable, signed label record as committed to the ledger.
///
/// The serde field names are the durable wire/storage format other systems
/// depend on; they must not change. `seq` is the store-assigned commit order
/// and is internal, not part of the wire record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelEvent {
    /// Store-assigned sequence number (commit order). 0 until appended.
    #[serde(skip)]
    pub seq: i64,

    /// The identity whose signing key authorized this label.
    pub issuer: Did,

    /// The account identity the label is attached to.
    pub subject: Did,

    /// The asserted (or negated) house.
    pub category: House,

    /// True for a negation event, false for an assertion.
    pub negated: bool,

    /// Ed25519 signature over the canonical unsigned record.
    #[serde(with = "sig_base64")]
    pub signature: Vec<u8>,

    /// When the issuer created the event.
    pub timestamp: DateTime<Utc>,
}

impl LabelEvent {
    pub fn polarity(&self) -> Polarity {
        if self.negated {
            Polarity::Negate
        } else {
            Polarity::Assert
        }
    }
}

/// Signature bytes travel as base64 in JSON.
mod sig_base64 {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(s).map_err(serde::de::Error::custom)
    }
}

/// The derived label state for a subject — never stored, always re-folded
/// from the ledger before a decision is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelState {
    /// No category currently asserted.
    Unlabeled,
    /// Exactly one category currently asserted.
    Labeled(House),
    /// More than one category simultaneously asserted. Only reachable if
    /// the ledger was corrupted out of band; surfaced as an error upstream,
    /// never auto-resolved.
    Conflicted(Vec<House>),
}

impl LabelState {
    /// Fold a subject's history (ordered by commit) into the current state.
    ///
    /// Last event per category wins: an assertion turns a category on, a
    /// negation turns it off.
    pub fn fold(events: &[LabelEvent]) -> Self {
        let mut asserted: Vec<House> = Vec::new();
        for event in events {
            if event.negated {
                asserted.retain(|h| *h != event.category);
            } else if !asserted.contains(&event.category) {
                asserted.push(event.category);
            }
        }
        match asserted.len() {
            0 => LabelState::Unlabeled,
            1 => LabelState::Labeled(asserted[0]),
            _ => {
                asserted.sort();
                LabelState::Conflicted(asserted)
            }
        }
    }

    /// The asserted category if exactly one is asserted, otherwise none.
    pub fn current(&self) -> Option<House> {
        match self {
            LabelState::Labeled(h) => Some(*h),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(subject: &str, house: House, negated: bool) -> LabelEvent {
        LabelEvent {
            seq: 0,
            issuer: Did::new("did:plc:issuer"),
            subject: Did::new(subject),
            category: house,
            negated,
            signature: vec![1, 2, 3],
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn house_round_trip() {
        for house in House::ALL {
            let parsed: House = house.as_str().parse().unwrap();
            assert_eq!(parsed, house);
        }
        assert!("durmstrang".parse::<House>().is_err());
    }

    #[test]
    fn house_wire_names_are_lowercase() {
        let json = serde_json::to_string(&House::Ravenclaw).unwrap();
        assert_eq!(json, "\"ravenclaw\"");
    }

    #[test]
    fn fold_empty_is_unlabeled() {
        assert_eq!(LabelState::fold(&[]), LabelState::Unlabeled);
    }

    #[test]
    fn fold_single_assert() {
        let events = [event("did:plc:a", House::Ravenclaw, false)];
        assert_eq!(LabelState::fold(&events), LabelState::Labeled(House::Ravenclaw));
    }

    #[test]
    fn fold_assert_then_negate_is_unlabeled() {
        let events = [
            event("did:plc:a", House::Hufflepuff, false),
            event("did:plc:a", House::Hufflepuff, true),
        ];
        assert_eq!(LabelState::fold(&events), LabelState::Unlabeled);
    }

    #[test]
    fn fold_negate_then_reassign() {
        let events = [
            event("did:plc:a", House::Gryffindor, false),
            event("did:plc:a", House::Gryffindor, true),
            event("did:plc:a", House::Slytherin, false),
        ];
        assert_eq!(LabelState::fold(&events), LabelState::Labeled(House::Slytherin));
    }

    #[test]
    fn fold_detects_conflict() {
        let events = [
            event("did:plc:a", House::Ravenclaw, false),
            event("did:plc:a", House::Slytherin, false),
        ];
        match LabelState::fold(&events) {
            LabelState::Conflicted(houses) => {
                assert_eq!(houses.len(), 2);
                assert!(houses.contains(&House::Ravenclaw));
                assert!(houses.contains(&House::Slytherin));
            }
            other => panic!("expected Conflicted, got {other:?}"),
        }
    }

    #[test]
    fn fold_ignores_stray_negation() {
        let events = [event("did:plc:a", House::Ravenclaw, true)];
        assert_eq!(LabelState::fold(&events), LabelState::Unlabeled);
    }

    #[test]
    fn current_is_none_for_conflict() {
        let state = LabelState::Conflicted(vec![House::Gryffindor, House::Ravenclaw]);
        assert_eq!(state.current(), None);
    }

    #[test]
    fn event_wire_format_field_names() {
        let e = event("did:plc:abc", House::Ravenclaw, false);
        let json = serde_json::to_value(&e).unwrap();
        // Durable wire format — field names must be preserved exactly.
        assert!(json.get("issuer").is_some());
        assert!(json.get("subject").is_some());
        assert_eq!(json["category"], "ravenclaw");
        assert_eq!(json["negated"], false);
        assert!(json.get("signature").is_some());
        assert!(json.get("timestamp").is_some());
        assert!(json.get("seq").is_none(), "seq is internal, not wire");
    }

    #[test]
    fn signature_round_trips_as_base64() {
        let e = event("did:plc:abc", House::Hufflepuff, true);
        let json = serde_json::to_string(&e).unwrap();
        let back: LabelEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.signature, vec![1, 2, 3]);
        assert!(back.negated);
    }
}
