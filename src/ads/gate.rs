//! Interstitial ad sequencer.
//!
//! A tagged state machine `Idle → Pending → Showing → Idle` replaces
//! scattered pending/showing flags: the transitions are the only way to
//! mutate the held record, so a fetch finishing while an interstitial is
//! up cannot cross-talk with the held state.
//!
//! The successful-fetch counter and the round-robin offer cursor are
//! persisted through the [`StateStore`] and survive restarts.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::store::{self, StateStore, keys};
use crate::telemetry;
use crate::types::{AdOffer, GroundingMetadata, LanguageCode, MedicationRecord};

/// Show an interstitial every N successful, non-bypassed fetches.
pub const AD_INTERVAL: u64 = 2;

/// Countdown before the dismiss affordance is enabled.
pub const AD_COUNTDOWN: Duration = Duration::from_secs(5);

/// Display context held alongside a gated record so the UI can restore
/// itself exactly as if the fetch had just completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayContext {
    /// The originating query text.
    pub query: String,
    pub language: LanguageCode,
    /// Captured-image preview bytes, when the query came from a photo.
    pub image_preview: Option<Vec<u8>>,
}

impl DisplayContext {
    /// Context for a typed query.
    pub fn typed(query: impl Into<String>, language: LanguageCode) -> Self {
        Self {
            query: query.into(),
            language,
            image_preview: None,
        }
    }
}

/// A record held back by the sequencer, released unchanged on dismissal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeldResult {
    pub record: MedicationRecord,
    pub grounding: Option<GroundingMetadata>,
    pub context: DisplayContext,
}

/// What the sequencer decided for a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// No interstitial; hand the result straight to the caller.
    PassThrough(HeldResult),
    /// The result is held; show this offer, then dismiss to release it.
    Held { offer: AdOffer },
}

enum GateState {
    Idle,
    Pending(HeldResult),
    Showing { offer: AdOffer, held: HeldResult },
}

/// Interstitial sequencer over the persisted fetch counter and cursor.
pub struct AdGate {
    store: Arc<dyn StateStore>,
    offers: Vec<AdOffer>,
    interval: u64,
    state: GateState,
}

impl AdGate {
    /// Create a gate with the default interval ([`AD_INTERVAL`]).
    pub fn new(store: Arc<dyn StateStore>, offers: Vec<AdOffer>) -> Self {
        Self::with_interval(store, offers, AD_INTERVAL)
    }

    /// Create a gate with a custom interval.
    pub fn with_interval(store: Arc<dyn StateStore>, offers: Vec<AdOffer>, interval: u64) -> Self {
        Self {
            store,
            offers,
            interval: interval.max(1),
            state: GateState::Idle,
        }
    }

    /// Replace the offer catalog (e.g. after the startup fetch lands).
    pub fn set_offers(&mut self, offers: Vec<AdOffer>) {
        self.offers = offers;
    }

    /// Whether an interstitial is currently showing.
    pub fn is_showing(&self) -> bool {
        matches!(self.state, GateState::Showing { .. })
    }

    /// The offer currently showing, if any.
    pub fn active_offer(&self) -> Option<&AdOffer> {
        match &self.state {
            GateState::Showing { offer, .. } => Some(offer),
            _ => None,
        }
    }

    /// Countdown the UI should run before enabling the dismiss affordance.
    pub fn countdown(&self) -> Duration {
        AD_COUNTDOWN
    }

    /// Route a validator-approved result through the gate.
    ///
    /// Bypassed fetches pass straight through without touching the
    /// counter. Otherwise the persisted counter is incremented first;
    /// when it lands on a multiple of the interval and offers are
    /// available, the result is held and the cursor's offer is shown.
    pub fn on_success(
        &mut self,
        record: MedicationRecord,
        grounding: Option<GroundingMetadata>,
        context: DisplayContext,
        bypass: bool,
    ) -> GateDecision {
        // A new fetch resolves any previously held state first.
        self.reset();

        let held = HeldResult {
            record,
            grounding,
            context,
        };

        if bypass {
            return GateDecision::PassThrough(held);
        }

        let count = self.increment_fetch_count();
        if self.offers.is_empty() || count % self.interval != 0 {
            return GateDecision::PassThrough(held);
        }

        self.state = GateState::Pending(held);
        self.show()
    }

    /// Promote `Pending` to `Showing`, selecting the cursor's offer.
    fn show(&mut self) -> GateDecision {
        let GateState::Pending(held) = std::mem::replace(&mut self.state, GateState::Idle) else {
            unreachable!("show is only called from the pending state");
        };
        let cursor = self.cursor();
        let offer = self.offers[cursor as usize % self.offers.len()].clone();
        info!(offer = %offer.id, "holding result behind interstitial");
        metrics::counter!(telemetry::INTERSTITIALS_TOTAL).increment(1);
        self.state = GateState::Showing {
            offer: offer.clone(),
            held,
        };
        GateDecision::Held { offer }
    }

    /// Dismiss the interstitial: advance the cursor by one (mod catalog
    /// length), persist it, and release the held result unchanged.
    ///
    /// Returns `None` when nothing is showing.
    pub fn dismiss(&mut self) -> Option<HeldResult> {
        match std::mem::replace(&mut self.state, GateState::Idle) {
            GateState::Showing { held, .. } => {
                if !self.offers.is_empty() {
                    let next = (self.cursor() + 1) % self.offers.len() as u64;
                    store::write_json(self.store.as_ref(), keys::AD_CURSOR, &next);
                    debug!(cursor = next, "advanced ad offer cursor");
                }
                Some(held)
            }
            previous => {
                self.state = previous;
                None
            }
        }
    }

    /// Drop any held state without releasing it.
    ///
    /// Used when the user switches input methods or navigates away
    /// while a result is held.
    pub fn reset(&mut self) {
        if !matches!(self.state, GateState::Idle) {
            debug!("discarding held interstitial state");
        }
        self.state = GateState::Idle;
    }

    fn cursor(&self) -> u64 {
        store::read_json(self.store.as_ref(), keys::AD_CURSOR).unwrap_or(0)
    }

    fn increment_fetch_count(&self) -> u64 {
        let count: u64 =
            store::read_json(self.store.as_ref(), keys::FETCH_COUNT).unwrap_or(0) + 1;
        store::write_json(self.store.as_ref(), keys::FETCH_COUNT, &count);
        debug!(count, "recorded successful fetch");
        count
    }
}
