//! Catalog models.
//!
//! Two shapes live here. [`ProductRecord`] is the full catalog document as the
//! service stores and returns it (camelCase on the wire). [`Model`] is the
//! slim card the feed collections hold and render. The same `id` may sit in
//! several collections at once; collections are views over models, not owners.

use serde::{Deserialize, Serialize};

/// Number of seconds in one minute.
const SECONDS_PER_MINUTE: i64 = 60;

/// Number of seconds in one hour.
const SECONDS_PER_HOUR: i64 = 3600;

/// Number of seconds in one day.
const SECONDS_PER_DAY: i64 = 86400;

/// Review status of a catalog product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    /// Visible to everyone.
    Published,
    /// Uploaded and waiting for review.
    #[default]
    Verification,
    /// Refused by a reviewer; see `rejection_reason`.
    Rejected,
}

impl ModelStatus {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Verification => "verification",
            Self::Rejected => "rejected",
        }
    }
}

/// Short reference to another product, embedded in a record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelatedModel {
    pub id: String,
    pub title: String,
    pub author: String,
    pub downloads: u64,
    pub likes: u64,
    pub shares: u64,
}

/// A catalog product as stored by the service.
///
/// Every field except `id` and `title` defaults when missing, so partial
/// documents from older uploads still decode.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductRecord {
    pub id: String,
    pub title: String,
    pub author: String,
    pub username: String,
    pub category: String,
    pub likes: u64,
    pub downloads: u64,
    pub shares: u64,
    pub status: ModelStatus,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    pub published_date: Option<String>,
    pub description: String,
    pub license: String,
    pub tags: Vec<String>,
    pub model_url: String,
    pub preview_image: String,
    pub images: Vec<String>,
    pub related_models: Vec<RelatedModel>,
    pub rejection_reason: Option<String>,
    pub admin_notes: Option<String>,
}

impl ProductRecord {
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.status == ModelStatus::Published
    }

    /// Parses `created_at` as a Unix timestamp, `None` when it is not RFC 3339.
    #[must_use]
    pub fn created_timestamp(&self) -> Option<i64> {
        chrono::DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|dt| dt.timestamp())
    }

    /// Human-readable age of the record, e.g. `"3h ago"`.
    ///
    /// Returns an empty string when `created_at` cannot be parsed.
    #[must_use]
    pub fn age(&self) -> String {
        self.created_timestamp()
            .map(|ts| time_ago(chrono::Utc::now().timestamp() - ts))
            .unwrap_or_default()
    }
}

/// Formats an elapsed number of seconds the way the list shows it.
#[must_use]
pub fn time_ago(diff: i64) -> String {
    if diff < SECONDS_PER_MINUTE {
        "just now".to_string()
    } else if diff < SECONDS_PER_HOUR {
        format!("{}m ago", diff / SECONDS_PER_MINUTE)
    } else if diff < SECONDS_PER_DAY {
        format!("{}h ago", diff / SECONDS_PER_HOUR)
    } else {
        format!("{}d ago", diff / SECONDS_PER_DAY)
    }
}

/// A model card held by the feed collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub title: String,
    pub author: String,
    pub downloads: u64,
    pub likes: u64,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
}

impl Model {
    /// Creates a model with zero counters and no optional fields.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            downloads: 0,
            likes: 0,
            image_url: None,
            category: None,
            tags: Vec::new(),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl From<&ProductRecord> for Model {
    fn from(record: &ProductRecord) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            author: record.author.clone(),
            downloads: record.downloads,
            likes: record.likes,
            image_url: non_empty(&record.preview_image)
                .or_else(|| record.images.first().and_then(|url| non_empty(url))),
            category: non_empty(&record.category),
            tags: record.tags.clone(),
        }
    }
}
