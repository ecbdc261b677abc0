//! Classifier trait — the abstraction over the remote multimodal model.

use async_trait::async_trait;

use crate::error::ClassifyError;
use crate::label::House;

/// A fully assembled classification request: prompt text plus the rendered
/// avatar (or the 1×1 placeholder). Transient; built fresh per decision.
#[derive(Debug, Clone)]
pub struct ClassificationRequest {
    pub prompt: String,
    /// PNG bytes sent alongside the prompt.
    pub image_png: Vec<u8>,
}

/// The remote classifier collaborator.
///
/// The calling contract (a forced tool call whose parameter schema is the
/// closed four-house enum) guarantees the model returns exactly one
/// [`House`] — never free text and never empty. Implementations still parse
/// strictly and surface anything else as [`ClassifyError::InvalidAnswer`].
#[async_trait]
pub trait Classifier: Send + Sync {
    /// A human-readable name for this classifier backend.
    fn name(&self) -> &str;

    /// Classify one profile into exactly one house.
    async fn classify(&self, request: ClassificationRequest) -> Result<House, ClassifyError>;
}
