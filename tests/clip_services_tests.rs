// Tests for the advisory collaborator seams
//
// Tag, AI-suggestion, and profile lookups are advisory: a failing service
// degrades to an empty or default result and must never surface an error
// to the submission flow.

use anyhow::Result;
use voiceclip::{
    profile_city, suggested_metadata, suggested_tags, AiSuggestionService, ClipSuggestions,
    ProfileProvider, TagSuggestionService,
};

struct WorkingTags;

#[async_trait::async_trait]
impl TagSuggestionService for WorkingTags {
    async fn suggest(&self, query: &str) -> Result<Vec<String>> {
        Ok(vec![query.to_string(), format!("{query}-weekly")])
    }
}

struct DownTags;

#[async_trait::async_trait]
impl TagSuggestionService for DownTags {
    async fn suggest(&self, _query: &str) -> Result<Vec<String>> {
        anyhow::bail!("tag service unavailable")
    }
}

struct WorkingAi;

#[async_trait::async_trait]
impl AiSuggestionService for WorkingAi {
    async fn propose(&self, hint: &str) -> Result<ClipSuggestions> {
        Ok(ClipSuggestions {
            titles: vec![format!("About {hint}")],
            hashtags: vec!["#voice".to_string()],
        })
    }
}

struct DownAi;

#[async_trait::async_trait]
impl AiSuggestionService for DownAi {
    async fn propose(&self, _hint: &str) -> Result<ClipSuggestions> {
        anyhow::bail!("model endpoint timed out")
    }
}

struct ConsentingProfile;

#[async_trait::async_trait]
impl ProfileProvider for ConsentingProfile {
    async fn consented_city(&self) -> Result<Option<String>> {
        Ok(Some("Porto".to_string()))
    }
}

struct WithheldProfile;

#[async_trait::async_trait]
impl ProfileProvider for WithheldProfile {
    async fn consented_city(&self) -> Result<Option<String>> {
        Ok(None)
    }
}

struct DownProfile;

#[async_trait::async_trait]
impl ProfileProvider for DownProfile {
    async fn consented_city(&self) -> Result<Option<String>> {
        anyhow::bail!("profile backend unreachable")
    }
}

#[tokio::test]
async fn test_tag_suggestions_pass_through() {
    let tags = suggested_tags(&WorkingTags, "music").await;
    assert_eq!(tags, vec!["music".to_string(), "music-weekly".to_string()]);
}

#[tokio::test]
async fn test_failed_tag_service_degrades_to_empty() {
    let tags = suggested_tags(&DownTags, "music").await;
    assert!(tags.is_empty());
}

#[tokio::test]
async fn test_ai_suggestions_pass_through() {
    let suggestions = suggested_metadata(&WorkingAi, "rainy morning").await;
    assert_eq!(suggestions.titles, vec!["About rainy morning".to_string()]);
    assert_eq!(suggestions.hashtags, vec!["#voice".to_string()]);
}

#[tokio::test]
async fn test_failed_ai_service_degrades_to_defaults() {
    let suggestions = suggested_metadata(&DownAi, "rainy morning").await;
    assert!(suggestions.titles.is_empty());
    assert!(suggestions.hashtags.is_empty());
}

#[tokio::test]
async fn test_profile_city_respects_consent() {
    assert_eq!(profile_city(&ConsentingProfile).await, Some("Porto".to_string()));
    assert_eq!(profile_city(&WithheldProfile).await, None);
}

#[tokio::test]
async fn test_failed_profile_lookup_means_no_city() {
    assert_eq!(profile_city(&DownProfile).await, None);
}
