//! Error types for the sortinghat domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant. All per-subject errors are
//! caught at the dispatch boundary and logged with subject context; only
//! signing-material failures are fatal for the process.

use thiserror::Error;

use crate::label::House;
use crate::subject::Did;

/// The top-level error type for all sortinghat operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Identity / handle resolution ---
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    // --- Profile / avatar fetch ---
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    // --- Remote classification ---
    #[error("Classification error: {0}")]
    Classify(#[from] ClassifyError),

    // --- Label store ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Signing (fatal for the process) ---
    #[error("Signing error: {0}")]
    Signing(#[from] SignError),

    /// More than one simultaneously asserted category in the ledger.
    /// Requires operator intervention; never auto-resolved by guessing.
    #[error("Corrupt label state for {subject}: {categories:?} simultaneously asserted")]
    CorruptState { subject: Did, categories: Vec<House> },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error is transient — safe to retry on the next
    /// redelivery of the same moderation event.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Identity(IdentityError::Network(_))
                | Error::Profile(_)
                | Error::Classify(_)
                | Error::Store(StoreError::Unavailable(_))
        )
    }
}

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    #[error("Handle or profile not found: {0}")]
    NotFound(String),

    #[error("Network error resolving identity: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),
}

#[derive(Debug, Clone, Error)]
pub enum ProfileError {
    #[error("Avatar fetch failed: {0}")]
    AvatarFetch(String),

    #[error("Avatar decode failed: {0}")]
    AvatarDecode(String),
}

#[derive(Debug, Clone, Error)]
pub enum ClassifyError {
    #[error("Classifier API error: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Classifier request timed out: {0}")]
    Timeout(String),

    #[error("Network error reaching classifier: {0}")]
    Network(String),

    /// Should be structurally impossible given the forced tool-call contract,
    /// but the parser refuses anything outside the closed enum anyway.
    #[error("Classifier returned no valid category: {0}")]
    InvalidAnswer(String),
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Label store unavailable: {0}")]
    Unavailable(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

#[derive(Debug, Clone, Error)]
pub enum SignError {
    #[error("Invalid signing key material: {0}")]
    InvalidKey(String),
}
