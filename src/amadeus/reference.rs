//! City/airport reference data and IATA resolution

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::AmadeusClient;
use super::models::{DataEnvelope, LocationRecord};
use crate::cache::{PersistentCache, jittered_ttl};
use crate::{Result, TravelBuddyError};

const LOCATIONS_PATH: &str = "/v1/reference-data/locations";
const RESOLVE_LIMIT: u32 = 5;

/// City and airport code for a place. Either may repeat the other when
/// Amadeus only knows one of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IataCodes {
    pub city: String,
    pub airport: String,
}

impl AmadeusClient {
    /// Location search for cities and airports matching `keyword`
    pub async fn search_locations(&self, keyword: &str, limit: u32) -> Result<Vec<LocationRecord>> {
        let params = [
            ("keyword", keyword.to_string()),
            ("subType", "CITY,AIRPORT".to_string()),
            ("page[limit]", limit.to_string()),
        ];
        let envelope: DataEnvelope<LocationRecord> = self.get(LOCATIONS_PATH, &params).await?;
        Ok(envelope.data)
    }
}

/// Pick the first CITY and first AIRPORT code, falling back to the top result
fn pick_codes(input: &str, records: &[LocationRecord]) -> Result<IataCodes> {
    let first_of = |sub_type: &str| {
        records
            .iter()
            .filter(|r| r.sub_type.as_deref() == Some(sub_type))
            .find_map(|r| r.iata_code.clone())
    };
    let top = records
        .first()
        .and_then(|r| r.iata_code.clone())
        .ok_or_else(|| TravelBuddyError::validation(format!("No IATA match for '{input}'")))?;

    Ok(IataCodes {
        city: first_of("CITY").unwrap_or_else(|| top.clone()),
        airport: first_of("AIRPORT").unwrap_or(top),
    })
}

/// Resolves free-text places to IATA codes, remembering answers on disk
pub struct ReferenceResolver {
    client: Arc<AmadeusClient>,
    cache: Arc<PersistentCache>,
    ttl: Duration,
}

impl ReferenceResolver {
    pub fn new(client: Arc<AmadeusClient>, cache: Arc<PersistentCache>, ttl: Duration) -> Self {
        Self { client, cache, ttl }
    }

    /// Three-letter inputs are taken as codes already; anything else goes
    /// through the location search.
    #[instrument(skip(self))]
    pub async fn city_to_codes(&self, city_or_iata: &str) -> Result<IataCodes> {
        let upper = city_or_iata.trim().to_uppercase();
        if upper.chars().count() == 3 {
            return Ok(IataCodes {
                city: upper.clone(),
                airport: upper,
            });
        }
        if upper.is_empty() {
            return Err(TravelBuddyError::validation("Location cannot be empty"));
        }

        let key = format!("iata:{upper}");
        match self.cache.get::<IataCodes>(&key).await {
            Ok(Some(codes)) => {
                debug!("IATA cache hit for {upper}");
                return Ok(codes);
            }
            Ok(None) => {}
            Err(e) => warn!("IATA cache lookup failed: {e}"),
        }

        let records = self
            .client
            .search_locations(city_or_iata.trim(), RESOLVE_LIMIT)
            .await?;
        let codes = pick_codes(city_or_iata.trim(), &records)?;
        debug!("Resolved {upper} to city={} airport={}", codes.city, codes.airport);

        if let Err(e) = self
            .cache
            .put(&key, codes.clone(), jittered_ttl(self.ttl))
            .await
        {
            warn!("Failed to cache IATA codes: {e}");
        }
        Ok(codes)
    }
}
