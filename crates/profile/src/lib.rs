//! Identity/profile provider — XRPC client for the public app view and the
//! PDS, plus avatar rasterization.
//!
//! The client is constructed once at process start and passed by reference
//! into the dispatch entry point; there is no shared global session.

pub mod avatar;

use async_trait::async_trait;
use serde::Deserialize;
use sortinghat_core::error::{IdentityError, ProfileError};
use sortinghat_core::profile::{ProfileProvider, ProfileView};
use sortinghat_core::subject::Did;
use tracing::debug;

/// XRPC client for the app view (reads) and the PDS (authenticated writes).
pub struct BskyClient {
    appview_url: String,
    pds_url: String,
    client: reqwest::Client,
}

/// An authenticated PDS session, as returned by `createSession`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub did: Did,
    pub access_jwt: String,
}

impl BskyClient {
    pub fn new(appview_url: impl Into<String>, pds_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            appview_url: trim_url(appview_url.into()),
            pds_url: trim_url(pds_url.into()),
            client,
        }
    }

    /// Log in to the PDS with an identifier + app password.
    ///
    /// Only the `register-labels` path needs this; labeling itself reads
    /// public data and never authenticates.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<Session, IdentityError> {
        let url = format!("{}/xrpc/com.atproto.server.createSession", self.pds_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "identifier": identifier,
                "password": password,
            }))
            .send()
            .await
            .map_err(|e| IdentityError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 401 || status == 400 {
            return Err(IdentityError::AuthenticationFailed(
                "PDS rejected the credentials".into(),
            ));
        }
        if status != 200 {
            return Err(IdentityError::Network(format!(
                "createSession returned status {status}"
            )));
        }

        response
            .json::<Session>()
            .await
            .map_err(|e| IdentityError::Network(format!("createSession parse: {e}")))
    }

    /// Write a record into the issuer's repository (`putRecord`).
    pub async fn put_record(
        &self,
        session: &Session,
        collection: &str,
        rkey: &str,
        record: serde_json::Value,
    ) -> Result<(), IdentityError> {
        let url = format!("{}/xrpc/com.atproto.repo.putRecord", self.pds_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&session.access_jwt)
            .json(&serde_json::json!({
                "repo": session.did,
                "collection": collection,
                "rkey": rkey,
                "record": record,
            }))
            .send()
            .await
            .map_err(|e| IdentityError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::Network(format!(
                "putRecord returned status {status}: {body}"
            )));
        }
        debug!(collection, rkey, "Record written");
        Ok(())
    }
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[derive(Debug, Deserialize)]
struct ResolveHandleResponse {
    did: Did,
}

#[async_trait]
impl ProfileProvider for BskyClient {
    async fn resolve_handle(&self, handle: &str) -> Result<Did, IdentityError> {
        let url = format!(
            "{}/xrpc/com.atproto.identity.resolveHandle",
            self.appview_url
        );
        let response = self
            .client
            .get(&url)
            .query(&[("handle", handle)])
            .send()
            .await
            .map_err(|e| IdentityError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 400 || status == 404 {
            return Err(IdentityError::NotFound(format!(
                "could not resolve handle {handle}"
            )));
        }
        if status != 200 {
            return Err(IdentityError::Network(format!(
                "resolveHandle returned status {status}"
            )));
        }

        let resolved: ResolveHandleResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::Network(format!("resolveHandle parse: {e}")))?;

        debug!(handle, did = %resolved.did, "Handle resolved");
        Ok(resolved.did)
    }

    async fn get_profile(&self, did: &Did) -> Result<ProfileView, IdentityError> {
        let url = format!("{}/xrpc/app.bsky.actor.getProfile", self.appview_url);
        let response = self
            .client
            .get(&url)
            .query(&[("actor", did.as_str())])
            .send()
            .await
            .map_err(|e| IdentityError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 400 || status == 404 {
            return Err(IdentityError::NotFound(format!("no profile for {did}")));
        }
        if status != 200 {
            return Err(IdentityError::Network(format!(
                "getProfile returned status {status}"
            )));
        }

        response
            .json::<ProfileView>()
            .await
            .map_err(|e| IdentityError::Network(format!("getProfile parse: {e}")))
    }

    async fn render_avatar(&self, url: &str, size: u32) -> Result<Vec<u8>, ProfileError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProfileError::AvatarFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProfileError::AvatarFetch(format!(
                "avatar fetch returned status {}",
                response.status().as_u16()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProfileError::AvatarFetch(e.to_string()))?;

        avatar::rasterize(&bytes, size)
    }
}
