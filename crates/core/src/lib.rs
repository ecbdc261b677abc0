//! # Sortinghat Core
//!
//! Domain types, traits, and error definitions for the sortinghat labeler.
//! This crate has **zero framework dependencies** — it defines the domain model
//! that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is defined as a trait here. Implementations live
//! in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with stub classifiers, profile providers, and stores
//! - Clean dependency graph (all crates depend inward on core)

pub mod classify;
pub mod error;
pub mod event;
pub mod label;
pub mod profile;
pub mod store;
pub mod subject;

// Re-export key types at crate root for ergonomics
pub use classify::{ClassificationRequest, Classifier};
pub use error::{ClassifyError, Error, IdentityError, ProfileError, Result, SignError, StoreError};
pub use event::{Action, ModerationEvent};
pub use label::{House, LabelEvent, LabelState, Polarity};
pub use profile::{ProfileProvider, ProfileSnapshot, ProfileView};
pub use store::LabelStore;
pub use subject::Did;
