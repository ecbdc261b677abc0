//! Label store trait — the append-only, queryable label ledger.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::label::{LabelEvent, LabelState};
use crate::subject::Did;

/// The append-only label ledger.
///
/// The store exclusively owns the event history. Events are never updated or
/// deleted, only appended; every "current state" read is a fold over a
/// subject's history. Appends must be durable before they return.
#[async_trait]
pub trait LabelStore: Send + Sync {
    /// Durably persist one event. Atomic per event — no partial writes are
    /// ever visible. Returns the store-assigned sequence number.
    async fn append(&self, event: &LabelEvent) -> Result<i64, StoreError>;

    /// All events for one subject, ordered by commit sequence.
    async fn history(&self, subject: &Did) -> Result<Vec<LabelEvent>, StoreError>;

    /// The derived current state for a subject: a fold of [`history`].
    ///
    /// [`history`]: LabelStore::history
    async fn current_state(&self, subject: &Did) -> Result<LabelState, StoreError> {
        Ok(LabelState::fold(&self.history(subject).await?))
    }

    /// Events whose subject matches any of the given patterns. A trailing
    /// `*` on a pattern does prefix matching; anything else matches exactly.
    /// Serves the public label query endpoint.
    async fn query(&self, patterns: &[String], limit: u32) -> Result<Vec<LabelEvent>, StoreError>;

    /// Total number of events in the ledger.
    async fn count(&self) -> Result<u64, StoreError>;
}
