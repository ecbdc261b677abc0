//! HTTP surface for the labeler.
//!
//! Two jobs:
//! - accept inbound moderation events from the external event source
//!   (`POST /events`) and run them through the dispatch entry point;
//! - serve committed labels to third-party consumers
//!   (`GET /xrpc/com.atproto.label.queryLabels`).
//!
//! Built on Axum. Per-subject failures are logged here, at the boundary,
//! and never take the listening process down.

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use sortinghat_core::event::ModerationEvent;
use sortinghat_core::store::LabelStore;
use sortinghat_labeler::{Dispatcher, Outcome};

/// Shared application state for the gateway.
pub struct GatewayState {
    pub dispatcher: Arc<Dispatcher>,
    pub store: Arc<dyn LabelStore>,
}

type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/events", post(events_handler))
        .route(
            "/xrpc/com.atproto.label.queryLabels",
            get(query_labels_handler),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server. Blocks until shutdown.
pub async fn start(
    config: &sortinghat_config::AppConfig,
    state: SharedState,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Labeler gateway listening on {addr}");
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Inbound moderation event. One subject per request; an error aborts that
/// subject only and is reported to the poster so redelivery can retry.
async fn events_handler(
    State(state): State<SharedState>,
    Json(event): Json<ModerationEvent>,
) -> (StatusCode, Json<serde_json::Value>) {
    match state.dispatcher.handle(&event).await {
        Ok(outcome) => {
            info!(subject = %event.subject, ?outcome, "Event processed");
            let (name, category) = describe(&outcome);
            (
                StatusCode::OK,
                Json(serde_json::json!({ "outcome": name, "category": category })),
            )
        }
        Err(err) if err.is_transient() => {
            warn!(subject = %event.subject, %err, "Transient failure, safe to redeliver");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "error": err.to_string(), "transient": true })),
            )
        }
        Err(err) => {
            error!(subject = %event.subject, %err, "Event processing failed");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({ "error": err.to_string(), "transient": false })),
            )
        }
    }
}

fn describe(outcome: &Outcome) -> (&'static str, Option<String>) {
    match outcome {
        Outcome::Labeled(h) => ("labeled", Some(h.to_string())),
        Outcome::AlreadyLabeled(h) => ("already_labeled", Some(h.to_string())),
        Outcome::Negated(h) => ("negated", Some(h.to_string())),
        Outcome::NothingToNegate => ("nothing_to_negate", None),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryLabelsParams {
    /// Comma-separated subject patterns; a trailing `*` is prefix matching.
    uri_patterns: String,

    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_limit() -> u32 {
    50
}

/// The label query endpoint third-party clients consume.
async fn query_labels_handler(
    State(state): State<SharedState>,
    Query(params): Query<QueryLabelsParams>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let patterns: Vec<String> = params
        .uri_patterns
        .split(',')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();

    let labels = state
        .store
        .query(&patterns, params.limit.min(250))
        .await
        .map_err(|err| {
            error!(%err, "Label query failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "error": err.to_string() })),
            )
        })?;

    let cursor = labels.last().map(|e| e.seq.to_string());
    Ok(Json(serde_json::json!({
        "cursor": cursor,
        "labels": labels,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, header};
    use sortinghat_core::classify::{ClassificationRequest, Classifier};
    use sortinghat_core::error::{ClassifyError, IdentityError, ProfileError, StoreError};
    use sortinghat_core::label::{House, LabelEvent};
    use sortinghat_core::profile::{ProfileProvider, ProfileView};
    use sortinghat_core::subject::Did;
    use sortinghat_labeler::SignedSink;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    const MARKER: &str = "3l3izhv734g2o";

    #[derive(Default)]
    struct VecStore {
        events: Mutex<Vec<LabelEvent>>,
    }

    #[async_trait]
    impl LabelStore for VecStore {
        async fn append(&self, event: &LabelEvent) -> Result<i64, StoreError> {
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

        async fn query(
            &self,
            patterns: &[String],
            limit: u32,
        ) -> Result<Vec<LabelEvent>, StoreError> {
            Ok(self
                .events
                .lock()
                .await
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

    struct FixedClassifier(House);

    #[async_trait]
    impl Classifier for FixedClassifier {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn classify(&self, _: ClassificationRequest) -> Result<House, ClassifyError> {
            Ok(self.0)
        }
    }

    struct OneProfile(ProfileView);

    #[async_trait]
    impl ProfileProvider for OneProfile {
        async fn resolve_handle(&self, handle: &str) -> Result<Did, IdentityError> {
            if handle == self.0.handle {
                Ok(self.0.did.clone())
            } else {
                Err(IdentityError::NotFound(handle.to_string()))
            }
        }

        async fn get_profile(&self, did: &Did) -> Result<ProfileView, IdentityError> {
            if did == &self.0.did {
                Ok(self.0.clone())
            } else {
                Err(IdentityError::NotFound(did.to_string()))
            }
        }

        async fn render_avatar(&self, _: &str, _: u32) -> Result<Vec<u8>, ProfileError> {
            Ok(vec![1; 8])
        }
    }

    fn test_state() -> SharedState {
        let store: Arc<VecStore> = Arc::new(VecStore::default());
        let profile = ProfileView {
            did: Did::new("did:plc:abc"),
            handle: "abc.bsky.social".into(),
            display_name: None,
            description: Some("loves chess and rules".into()),
            avatar: None,
        };
        let sink = SignedSink::new(Did::new("did:plc:issuer"), [3u8; 32], store.clone());
        let dispatcher = Dispatcher::new(
            store.clone(),
            Arc::new(OneProfile(profile)),
            Arc::new(FixedClassifier(House::Ravenclaw)),
            sink,
            MARKER,
            100,
        );
        Arc::new(GatewayState {
            dispatcher: Arc::new(dispatcher),
            store,
        })
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_event(subject: &str, event_key: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/events")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::json!({ "subject": subject, "event_key": event_key }).to_string(),
            ))
            .unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn assign_event_commits_a_label() {
        let state = test_state();
        let app = build_router(state.clone());

        let response = app
            .oneshot(post_event("did:plc:abc", "3k7qmnev4xg2p"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["outcome"], "labeled");
        assert_eq!(json["category"], "ravenclaw");
        assert_eq!(state.store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn negate_event_uses_revocation_marker() {
        let state = test_state();
        let app = build_router(state.clone());

        app.clone()
            .oneshot(post_event("did:plc:abc", "3k7qmnev4xg2p"))
            .await
            .unwrap();
        let response = app
            .oneshot(post_event("did:plc:abc", MARKER))
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json["outcome"], "negated");
        assert_eq!(state.store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn unknown_subject_does_not_crash_the_listener() {
        let state = test_state();
        let app = build_router(state.clone());

        let response = app
            .clone()
            .oneshot(post_event("ghost.bsky.social", "3k7qmnev4xg2p"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        // The listener is still serving.
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn query_labels_returns_wire_format() {
        let state = test_state();
        let app = build_router(state.clone());

        app.clone()
            .oneshot(post_event("did:plc:abc", "3k7qmnev4xg2p"))
            .await
            .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/xrpc/com.atproto.label.queryLabels?uriPatterns=did:plc:*")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let labels = json["labels"].as_array().unwrap();
        assert_eq!(labels.len(), 1);
        let label = &labels[0];
        assert_eq!(label["subject"], "did:plc:abc");
        assert_eq!(label["issuer"], "did:plc:issuer");
        assert_eq!(label["category"], "ravenclaw");
        assert_eq!(label["negated"], false);
        assert!(label.get("signature").is_some());
        assert!(label.get("timestamp").is_some());
    }

    #[tokio::test]
    async fn query_labels_with_no_match_is_empty() {
        let app = build_router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/xrpc/com.atproto.label.queryLabels?uriPatterns=did:web:nobody")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(response).await;
        assert!(json["labels"].as_array().unwrap().is_empty());
        assert!(json["cursor"].is_null());
    }
}
