//! Remote ad offer catalog: fetch and whole-batch validation.

use tracing::{info, warn};

use crate::types::AdOffer;
use crate::{MedhanitError, Result};

/// Parse an offer catalog document, validating the batch as a whole.
///
/// Any structurally invalid or unusable entry (missing id, image URL or
/// alt text) rejects the entire list — callers fall back to "no ads
/// this session", never a partial list.
pub fn parse_offers(json: &str) -> Result<Vec<AdOffer>> {
    let offers: Vec<AdOffer> = serde_json::from_str(json)
        .map_err(|e| MedhanitError::Configuration(format!("failed to parse ad catalog: {e}")))?;

    if let Some(bad) = offers.iter().find(|offer| !offer.is_usable()) {
        return Err(MedhanitError::Configuration(format!(
            "ad catalog entry '{}' is missing mandatory fields",
            bad.id
        )));
    }

    Ok(offers)
}

/// Fetch the offer catalog from a remote URL.
pub async fn fetch_offers(url: &str) -> Result<Vec<AdOffer>> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| MedhanitError::Configuration(format!("failed to fetch ad catalog from {url}: {e}")))?;

    if !response.status().is_success() {
        return Err(MedhanitError::Configuration(format!(
            "ad catalog fetch returned HTTP {}",
            response.status()
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| MedhanitError::Configuration(format!("failed to read ad catalog body: {e}")))?;

    parse_offers(&body)
}

/// Fetch the catalog, degrading any failure to an empty list.
///
/// This is the startup entrypoint: ads are an optional feature, so a
/// missing or malformed catalog disables them for the session rather
/// than failing the caller.
pub async fn load_offers(url: &str) -> Vec<AdOffer> {
    match fetch_offers(url).await {
        Ok(offers) => {
            info!(count = offers.len(), "loaded ad offer catalog");
            offers
        }
        Err(e) => {
            warn!(error = %e, "ad catalog unavailable, ads disabled for this session");
            Vec::new()
        }
    }
}
