use anyhow::Result;
use tracing::warn;

use super::assembler::ClipPayload;

/// The upload/persistence collaborator.
///
/// Owns persistence, retry, and offline queuing; the recording pipeline's
/// responsibility ends once `enqueue` returns.
#[async_trait::async_trait]
pub trait UploadQueue: Send + Sync {
    async fn enqueue(&self, payload: ClipPayload) -> Result<()>;
}

/// Ranked tag suggestions for a query string. Advisory only, never
/// required for submission.
#[async_trait::async_trait]
pub trait TagSuggestionService: Send + Sync {
    async fn suggest(&self, query: &str) -> Result<Vec<String>>;
}

/// Optional title and hashtag proposals.
#[derive(Debug, Clone, Default)]
pub struct ClipSuggestions {
    pub titles: Vec<String>,
    pub hashtags: Vec<String>,
}

#[async_trait::async_trait]
pub trait AiSuggestionService: Send + Sync {
    async fn propose(&self, hint: &str) -> Result<ClipSuggestions>;
}

/// Read-only profile/consent data.
#[async_trait::async_trait]
pub trait ProfileProvider: Send + Sync {
    /// The user's city, if they opted into sharing it.
    async fn consented_city(&self) -> Result<Option<String>>;
}

/// Fetch tag suggestions, absorbing service failures into an empty list.
pub async fn suggested_tags(service: &dyn TagSuggestionService, query: &str) -> Vec<String> {
    match service.suggest(query).await {
        Ok(tags) => tags,
        Err(e) => {
            warn!("Tag suggestion failed (advisory): {e:#}");
            Vec::new()
        }
    }
}

/// Fetch AI title/hashtag proposals, absorbing failures into defaults.
pub async fn suggested_metadata(service: &dyn AiSuggestionService, hint: &str) -> ClipSuggestions {
    match service.propose(hint).await {
        Ok(suggestions) => suggestions,
        Err(e) => {
            warn!("AI suggestion failed (advisory): {e:#}");
            ClipSuggestions::default()
        }
    }
}

/// Resolve the user's consented city, absorbing provider failures into
/// "no city shared".
pub async fn profile_city(provider: &dyn ProfileProvider) -> Option<String> {
    match provider.consented_city().await {
        Ok(city) => city,
        Err(e) => {
            warn!("Profile lookup failed (advisory): {e:#}");
            None
        }
    }
}
