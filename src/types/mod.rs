//! Public types for the Medhanit API.

mod ads;
mod language;
mod medication;

pub use ads::AdOffer;
pub use language::{DEFAULT_LANGUAGE_CODE, Language, LanguageCode, SUPPORTED_LANGUAGES};
pub use medication::{GroundingCitation, GroundingMetadata, MedicationRecord};
