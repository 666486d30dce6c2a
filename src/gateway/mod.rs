//! Gateway implementations

mod builder;
mod core;

pub use builder::{Medhanit, MedhanitBuilder};
pub use core::{LookupOutcome, LookupResult, MedhanitGateway};
