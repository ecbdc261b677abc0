//! Shared test doubles for the labeler crate's unit tests.

use async_trait::async_trait;
use sortinghat_core::classify::{ClassificationRequest, Classifier};
use sortinghat_core::error::{ClassifyError, IdentityError, ProfileError, StoreError};
use sortinghat_core::label::{House, LabelEvent};
use sortinghat_core::profile::{ProfileProvider, ProfileView};
use sortinghat_core::store::LabelStore;
use sortinghat_core::subject::Did;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// In-memory append-only label store.
#[derive(Default)]
pub struct MemStore {
    events: Mutex<Vec<LabelEvent>>,
    fail: Mutex<bool>,
}

impl MemStore {
    pub async fn events(&self) -> Vec<LabelEvent> {
        self.events.lock().await.clone()
    }

    /// Make every subsequent append fail with `StoreError::Unavailable`.
    pub async fn fail_appends(&self) {
        *self.fail.lock().await = true;
    }

    /// Seed an event directly, bypassing the sink (for corrupt-state tests).
    pub async fn seed(&self, mut event: LabelEvent) {
        let mut events = self.events.lock().await;
        event.seq = events.len() as i64 + 1;
        events.push(event);
    }
}

#[async_trait]
impl LabelStore for MemStore {
    async fn append(&self, event: &LabelEvent) -> Result<i64, StoreError> {
        if *self.fail.lock().await {
            return Err(StoreError::Unavailable("MemStore set to fail".into()));
        }
        let mut events = self.events.lock().await;
        let seq = events.len() as i64 + 1;
        let mut committed = event.clone();
        committed.seq = seq;
        events.push(committed);
        Ok(seq)
    }

    async fn history(&self, subject: &Did) -> Result<Vec<LabelEvent>, StoreError> {
        Ok(self
            .events
            .lock()
            .await
            .iter()
            .filter(|e| &e.subject == subject)
            .cloned()
            .collect())
    }

    async fn query(&self, patterns: &[String], limit: u32) -> Result<Vec<LabelEvent>, StoreError> {
        let events = self.events.lock().await;
        Ok(events
            .iter()
            .filter(|e| {
                patterns.iter().any(|p| match p.strip_suffix('*') {
                    Some(prefix) => e.subject.as_str().starts_with(prefix),
                    None => e.subject.as_str() == p,
                })
            })
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.events.lock().await.len() as u64)
    }
}

/// Classifier double: always answers the same house, counts invocations.
pub struct StubClassifier {
    pub answer: House,
    pub calls: AtomicUsize,
    /// Artificial latency so concurrency tests can force overlap.
    pub delay_ms: u64,
}

impl StubClassifier {
    pub fn answering(answer: House) -> Self {
        Self {
            answer,
            calls: AtomicUsize::new(0),
            delay_ms: 0,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Classifier for StubClassifier {
    fn name(&self) -> &str {
        "stub"
    }

    async fn classify(&self, _request: ClassificationRequest) -> Result<House, ClassifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        Ok(self.answer)
    }
}

/// Profile provider double backed by a handle map and a profile map.
#[derive(Default)]
pub struct StubProfiles {
    pub handles: HashMap<String, Did>,
    pub profiles: HashMap<String, ProfileView>,
}

impl StubProfiles {
    pub fn with_profile(mut self, view: ProfileView) -> Self {
        self.handles
            .insert(view.handle.clone(), view.did.clone());
        self.profiles.insert(view.did.as_str().to_string(), view);
        self
    }
}

#[async_trait]
impl ProfileProvider for StubProfiles {
    async fn resolve_handle(&self, handle: &str) -> Result<Did, IdentityError> {
        self.handles
            .get(handle)
            .cloned()
            .ok_or_else(|| IdentityError::NotFound(handle.to_string()))
    }

    async fn get_profile(&self, did: &Did) -> Result<ProfileView, IdentityError> {
        self.profiles
            .get(did.as_str())
            .cloned()
            .ok_or_else(|| IdentityError::NotFound(did.to_string()))
    }

    async fn render_avatar(&self, _url: &str, _size: u32) -> Result<Vec<u8>, ProfileError> {
        Ok(vec![0xFA; 16])
    }
}

pub fn profile(did: &str, handle: &str, bio: Option<&str>, avatar: Option<&str>) -> ProfileView {
    ProfileView {
        did: Did::new(did),
        handle: handle.to_string(),
        display_name: None,
        description: bio.map(String::from),
        avatar: avatar.map(String::from),
    }
}
