//! Domain model structs persisted in the offers document.
//!
//! Field names are camelCase on the wire and on disk, matching the document
//! format the frontend already consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub(crate) fn default_currency() -> String {
    "$".to_string()
}

/// A single classified listing.
///
/// Offers are immutable after creation: there is no update operation, only
/// append and remove. `id` and `date` are assigned by the store at append
/// time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    /// Creation-time millisecond timestamp, doubling as the unique id.
    /// Not guaranteed monotonic for two creations in the same millisecond.
    pub id: i64,
    /// Product being offered.
    pub product_name: String,
    /// Social-media link or handle for contacting the seller. Unvalidated.
    pub social_link: String,
    /// Optional seller blurb.
    #[serde(default)]
    pub bio: String,
    /// Price as free text so listings can say "ask for price".
    #[serde(default)]
    pub price: String,
    /// Currency symbol shown next to the price.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Country name; expected to come from the location catalog but not
    /// enforced.
    #[serde(default)]
    pub country: String,
    /// City name; expected to belong to `country`'s catalog entry but not
    /// enforced.
    #[serde(default)]
    pub city: String,
    /// Public URLs of the uploaded images, exactly 4 for offers created
    /// through the full pipeline.
    pub images: Vec<String>,
    /// Server-assigned creation timestamp.
    pub date: DateTime<Utc>,
}

/// The caller-supplied part of an [`Offer`], before the store assigns
/// `id` and `date`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfferDraft {
    pub product_name: String,
    pub social_link: String,
    pub bio: String,
    pub price: String,
    pub currency: String,
    pub country: String,
    pub city: String,
    pub images: Vec<String>,
}
