//! Dispatch entry point.
//!
//! Receives moderation events, maps the record key to an action, resolves
//! handles to DIDs, and sequences resolver → [profile fetch → request
//! builder → classifier] → sink. The read-state-then-append unit runs under
//! a per-subject lock so concurrent events for the same subject cannot both
//! observe `Unlabeled`; different subjects proceed in parallel.

use sortinghat_core::classify::Classifier;
use sortinghat_core::error::{Error, Result};
use sortinghat_core::event::{Action, ModerationEvent};
use sortinghat_core::label::{House, Polarity};
use sortinghat_core::profile::{ProfileProvider, ProfileSnapshot};
use sortinghat_core::store::LabelStore;
use sortinghat_core::subject::Did;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::prompt;
use crate::resolver::{Decision, decide};
use crate::sink::SignedSink;

/// What happened for one processed event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A new label was classified and committed.
    Labeled(House),
    /// The subject already carried this label; nothing was done.
    AlreadyLabeled(House),
    /// The active label was negated.
    Negated(House),
    /// Negation requested but nothing was asserted; nothing was done.
    NothingToNegate,
}

/// Sequences one moderation event through the label state machine.
///
/// All collaborators are injected; constructed once at process start.
pub struct Dispatcher {
    store: Arc<dyn LabelStore>,
    profiles: Arc<dyn ProfileProvider>,
    classifier: Arc<dyn Classifier>,
    sink: SignedSink,
    revocation_marker: String,
    avatar_size: u32,
    subject_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn LabelStore>,
        profiles: Arc<dyn ProfileProvider>,
        classifier: Arc<dyn Classifier>,
        sink: SignedSink,
        revocation_marker: impl Into<String>,
        avatar_size: u32,
    ) -> Self {
        Self {
            store,
            profiles,
            classifier,
            sink,
            revocation_marker: revocation_marker.into(),
            avatar_size,
            subject_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Process one event. Errors abort this subject only; the caller logs
    /// them at the boundary and keeps listening.
    pub async fn handle(&self, event: &ModerationEvent) -> Result<Outcome> {
        let action = event.action(&self.revocation_marker);
        let subject = self.resolve_subject(&event.subject).await?;

        // Serialize read-state-then-append per subject.
        let lock = self.subject_lock(&subject).await;
        let result = {
            let _guard = lock.lock().await;
            self.process(&subject, action).await
        };
        drop(lock);
        self.prune_subject_lock(&subject).await;
        result
    }

    /// The locked unit: read state, decide, act. Caller holds the subject
    /// lock for the whole call.
    async fn process(&self, subject: &Did, action: Action) -> Result<Outcome> {
        let state = self.store.current_state(subject).await?;

        match decide(&state, action) {
            Decision::Classify => {
                let snapshot = self.snapshot(subject).await?;
                let request = prompt::build_request(&snapshot);
                let house = self.classifier.classify(request).await?;
                self.sink.publish(subject, house, Polarity::Assert).await?;
                Ok(Outcome::Labeled(house))
            }
            Decision::AlreadyLabeled(house) => {
                info!(subject = %subject, %house, "Already labeled, skipping classification");
                Ok(Outcome::AlreadyLabeled(house))
            }
            Decision::Negate(house) => {
                self.sink.publish(subject, house, Polarity::Negate).await?;
                Ok(Outcome::Negated(house))
            }
            Decision::NothingToNegate => {
                info!(subject = %subject, "Nothing to negate");
                Ok(Outcome::NothingToNegate)
            }
            Decision::Refuse(categories) => Err(Error::CorruptState {
                subject: subject.clone(),
                categories,
            }),
        }
    }

    async fn resolve_subject(&self, raw: &str) -> Result<Did> {
        if Did::is_did(raw) {
            Ok(Did::new(raw))
        } else {
            Ok(self.profiles.resolve_handle(raw).await?)
        }
    }

    /// Fetch a fresh snapshot for a classify decision. Never cached.
    async fn snapshot(&self, subject: &Did) -> Result<ProfileSnapshot> {
        let view = self.profiles.get_profile(subject).await?;

        let avatar = match &view.avatar {
            Some(url) => Some(
                self.profiles
                    .render_avatar(url, self.avatar_size)
                    .await?,
            ),
            None => None,
        };

        Ok(ProfileSnapshot {
            subject: subject.clone(),
            handle: view.handle,
            display_name: view.display_name,
            bio: view.description,
            avatar,
        })
    }

    async fn subject_lock(&self, subject: &Did) -> Arc<Mutex<()>> {
        let mut locks = self.subject_locks.lock().await;
        locks
            .entry(subject.as_str().to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the map entry once no handler holds it, so the map stays
    /// bounded by the number of in-flight subjects rather than every
    /// subject ever seen.
    async fn prune_subject_lock(&self, subject: &Did) {
        let mut locks = self.subject_locks.lock().await;
        let idle = locks
            .get(subject.as_str())
            .is_some_and(|entry| Arc::strong_count(entry) == 1);
        if idle {
            locks.remove(subject.as_str());
        }
    }

    #[cfg(test)]
    async fn subject_lock_count(&self) -> usize {
        self.subject_locks.lock().await.len()
    }
}
