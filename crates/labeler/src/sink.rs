//! Signed publication sink.
//!
//! Wraps a decision outcome in a signed, issuer-attributed label event and
//! commits it to the label store. No retry here: redelivery plus the
//! resolver's no-op rules are the retry mechanism, so a failed append simply
//! propagates to the dispatch boundary.

use chrono::{DateTime, Utc};
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use sortinghat_core::error::Error;
use sortinghat_core::label::{House, LabelEvent, Polarity};
use sortinghat_core::store::LabelStore;
use sortinghat_core::subject::Did;
use std::sync::Arc;
use tracing::info;

/// Domain-separation prefix for label signatures.
const SIGNING_DOMAIN: &[u8] = b"sortinghat:label:v1:";

/// Signs label events with the issuer's ed25519 key and appends them to the
/// ledger. The append is durable before `publish` returns.
pub struct SignedSink {
    issuer: Did,
    signing_key: SigningKey,
    store: Arc<dyn LabelStore>,
}

impl SignedSink {
    /// Key material is validated by configuration at startup; a bad seed
    /// never reaches this constructor.
    pub fn new(issuer: Did, seed: [u8; 32], store: Arc<dyn LabelStore>) -> Self {
        Self {
            issuer,
            signing_key: SigningKey::from_bytes(&seed),
            store,
        }
    }

    /// The public half of the issuer key, for consumers verifying labels.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Canonical bytes covered by the signature: domain prefix followed by
    /// JSON of the unsigned record with alphabetically ordered keys.
    fn canonical_bytes(
        issuer: &Did,
        subject: &Did,
        category: House,
        negated: bool,
        timestamp: &DateTime<Utc>,
    ) -> Vec<u8> {
        let payload = serde_json::json!({
            "category": category,
            "issuer": issuer,
            "negated": negated,
            "subject": subject,
            "timestamp": timestamp.to_rfc3339(),
        });
        let mut bytes = Vec::from(SIGNING_DOMAIN);
        bytes.extend_from_slice(payload.to_string().as_bytes());
        bytes
    }

    /// Sign and durably commit one label event. Returns the committed event
    /// with its store-assigned sequence number.
    pub async fn publish(
        &self,
        subject: &Did,
        category: House,
        polarity: Polarity,
    ) -> Result<LabelEvent, Error> {
        let timestamp = Utc::now();
        let negated = polarity.is_negation();

        let bytes = Self::canonical_bytes(&self.issuer, subject, category, negated, &timestamp);
        let signature = self.signing_key.sign(&bytes);

        let mut event = LabelEvent {
            seq: 0,
            issuer: self.issuer.clone(),
            subject: subject.clone(),
            category,
            negated,
            signature: signature.to_bytes().to_vec(),
            timestamp,
        };

        event.seq = self.store.append(&event).await?;

        info!(
            subject = %event.subject,
            category = %event.category,
            negated = event.negated,
            seq = event.seq,
            "Label event published"
        );
        Ok(event)
    }

    /// Re-check a committed event's signature against an issuer key.
    pub fn verify(event: &LabelEvent, key: &VerifyingKey) -> bool {
        let bytes = Self::canonical_bytes(
            &event.issuer,
            &event.subject,
            event.category,
            event.negated,
            &event.timestamp,
        );
        let Ok(signature) = ed25519_dalek::Signature::from_slice(&event.signature) else {
            return false;
        };
        key.verify(&bytes, &signature).is_ok()
    }
}
