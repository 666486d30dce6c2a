//! Ad offer shape for the interstitial sequencer.

use serde::{Deserialize, Serialize};

/// One interstitial offer from the externally-hosted catalog.
///
/// `id`, `image_url` and `alt_text` are mandatory for an offer to be
/// usable; a fetched catalog containing any unusable entry is rejected
/// as a whole — see [`crate::ads::parse_offers`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdOffer {
    pub id: String,
    pub image_url: String,
    pub alt_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

impl AdOffer {
    /// Whether every mandatory field is present and non-empty.
    pub fn is_usable(&self) -> bool {
        !self.id.is_empty() && !self.image_url.is_empty() && !self.alt_text.is_empty()
    }
}
