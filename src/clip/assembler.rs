use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::blob::AudioBlob;
use super::AudioClip;
use crate::analysis::QualityMetrics;
use crate::error::ValidationError;
use crate::waveform::WaveformFrame;

/// Who can see the published clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Followers,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentRating {
    Everyone,
    Mature,
}

/// Where the clip is being posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum PostTarget {
    /// Another user's profile.
    Profile(String),
    /// A topic/community feed.
    Topic(String),
}

/// User-chosen metadata accompanying a clip.
#[derive(Debug, Clone)]
pub struct ClipMetadata {
    pub mood_emoji: String,
    pub content_rating: ContentRating,
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub visibility: Visibility,
    pub scheduled_for: Option<DateTime<Utc>>,
    /// City from profile data; attached only with consent.
    pub city: Option<String>,
    pub consent_city: bool,
    pub podcast_flag: bool,
    pub accessibility_urls: Vec<String>,
    pub target: Option<PostTarget>,
}

/// The immutable payload handed to the upload queue.
#[derive(Debug, Clone, Serialize)]
pub struct ClipPayload {
    pub audio_bytes: Vec<u8>,
    pub mime_type: String,
    pub duration_seconds: f64,
    pub waveform_summary: Vec<f32>,
    pub quality_metrics: Option<QualityMetrics>,
    pub mood_emoji: String,
    pub content_rating: ContentRating,
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub visibility: Visibility,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub city: Option<String>,
    pub podcast_flag: bool,
    pub accessibility_urls: Vec<String>,
    pub target: PostTarget,
}

/// Final validation and payload construction.
///
/// On success the payload goes to the upload queue and this component's
/// responsibility ends; persistence, retry, and offline queuing live
/// entirely behind that collaborator.
pub struct ClipAssembler;

impl ClipAssembler {
    pub fn assemble(
        clip: &AudioClip,
        metadata: ClipMetadata,
    ) -> Result<ClipPayload, ValidationError> {
        let blob: &AudioBlob = clip.effective_blob();

        if !blob.mime_type.starts_with("audio/") {
            return Err(ValidationError::UnsupportedFormat {
                mime_type: blob.mime_type.clone(),
            });
        }

        if metadata.mood_emoji.trim().is_empty() {
            return Err(ValidationError::MissingMood);
        }

        let target = metadata.target.ok_or(ValidationError::MissingTarget)?;

        // City rides along only when the user opted in.
        let city = if metadata.consent_city {
            metadata.city
        } else {
            None
        };

        let payload = ClipPayload {
            audio_bytes: blob.bytes.clone(),
            mime_type: blob.mime_type.clone(),
            duration_seconds: clip.duration_seconds,
            waveform_summary: summary_vec(&clip.waveform_summary),
            quality_metrics: clip.quality_metrics.clone(),
            mood_emoji: metadata.mood_emoji,
            content_rating: metadata.content_rating,
            title: metadata.title,
            tags: metadata.tags,
            visibility: metadata.visibility,
            scheduled_for: metadata.scheduled_for,
            city,
            podcast_flag: metadata.podcast_flag,
            accessibility_urls: metadata.accessibility_urls,
            target,
        };

        info!(
            "Clip payload assembled: {:.2}s, {} bytes, visibility={:?}",
            payload.duration_seconds,
            payload.audio_bytes.len(),
            payload.visibility
        );

        Ok(payload)
    }
}

fn summary_vec(summary: &WaveformFrame) -> Vec<f32> {
    summary.to_vec()
}
