//! Seed records written to an empty store on first run.

use crate::error::Result;
use crate::record::LandRecord;

/// The seed collection, in the JSON shape the store persists.
pub const SEED_RECORDS_JSON: &str = include_str!("../data/seed_records.json");

/// Decode the seed collection.
///
/// # Errors
///
/// Returns an error if the embedded JSON does not decode, which indicates a
/// broken build rather than bad user data.
pub fn seed_records() -> Result<Vec<LandRecord>> {
    Ok(serde_json::from_str(SEED_RECORDS_JSON)?)
}
