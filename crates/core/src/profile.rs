//! Profile provider trait — the abstraction over the identity/profile
//! collaborator (handle resolution, profile fetch, avatar rasterization).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{IdentityError, ProfileError};
use crate::subject::Did;

/// A profile as returned by the app view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub did: Did,
    pub handle: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// The bio text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Avatar image URL, if the account has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// A transient snapshot of everything the classifier gets to see.
///
/// Fetched fresh for every assign decision, discarded after the
/// classification request is built, never cached.
#[derive(Debug, Clone)]
pub struct ProfileSnapshot {
    pub subject: Did,
    pub handle: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    /// Square PNG, `avatar_size` a side — or `None` when the account has no
    /// avatar, in which case the request builder substitutes the documented
    /// 1×1 placeholder.
    pub avatar: Option<Vec<u8>>,
}

/// The identity/profile collaborator.
///
/// Failures propagate as recoverable errors; a missing profile aborts
/// processing of that one subject only.
#[async_trait]
pub trait ProfileProvider: Send + Sync {
    /// Resolve a human-readable handle to its canonical DID.
    async fn resolve_handle(&self, handle: &str) -> Result<Did, IdentityError>;

    /// Fetch the subject's current profile from the app view.
    async fn get_profile(&self, did: &Did) -> Result<ProfileView, IdentityError>;

    /// Fetch and rasterize an avatar into a `size`×`size` PNG.
    async fn render_avatar(&self, url: &str, size: u32) -> Result<Vec<u8>, ProfileError>;
}
