use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Author shown when a record carries none.
pub const DEFAULT_AUTHOR: &str = "Equipo Triada Cognitiva";

/// Canonical content record (blog post or course), produced only by the normalizer.
///
/// `id`, `title` and `body` are always non-empty. Serializing an entity yields the
/// canonical field names, which the normalizer accepts back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEntity {
    pub id: String,
    pub title: String,
    pub body: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_label: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub price: Option<f64>,
    pub discounted_price: Option<f64>,
    pub image_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

impl ContentEntity {
    /// Creation time in epoch milliseconds, with missing dates treated as epoch zero.
    pub fn created_millis(&self) -> i64 {
        self.created_at.map_or(0, |ts| ts.timestamp_millis())
    }

    /// A discount is active only when `0 < discounted_price < price`.
    pub fn has_active_discount(&self) -> bool {
        matches!(
            (self.price, self.discounted_price),
            (Some(list), Some(discounted)) if discounted > 0.0 && discounted < list
        )
    }
}

/// Ordered, immutable result of one fetch-and-normalize attempt.
pub type Collection = Arc<[ContentEntity]>;

/// Joins city and country into a display label, skipping whichever is missing.
pub(crate) fn location_label(city: Option<&str>, country: Option<&str>) -> Option<String> {
    let parts: Vec<&str> = [city, country].into_iter().flatten().collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}
