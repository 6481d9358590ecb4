//! Carrier code to airline name lookup

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use super::AmadeusClient;
use super::models::{AirlineRecord, DataEnvelope};
use crate::Result;
use crate::cache::{PersistentCache, jittered_ttl};

const AIRLINES_PATH: &str = "/v1/reference-data/airlines";
pub const UNKNOWN_AIRLINE: &str = "Unknown Airline";

/// Capitalise the first letter of every alphabetic run and lowercase the rest
/// (`"QATAR AIRWAYS"` -> `"Qatar Airways"`, `"KLM-ROYAL"` -> `"Klm-Royal"`).
#[must_use]
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut previous_is_letter = false;
    for c in input.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }
    out
}

pub struct AirlineDirectory {
    client: Arc<AmadeusClient>,
    cache: Arc<PersistentCache>,
    ttl: Duration,
}

impl AirlineDirectory {
    pub fn new(client: Arc<AmadeusClient>, cache: Arc<PersistentCache>, ttl: Duration) -> Self {
        Self { client, cache, ttl }
    }

    /// Map carrier codes to readable names.
    ///
    /// Codes are de-duplicated and looked up in the cache first; the rest go
    /// out in a single request. Codes Amadeus does not know map to
    /// `"Unknown Airline"`.
    #[instrument(skip(self))]
    pub async fn airline_names(&self, codes: &[String]) -> Result<HashMap<String, String>> {
        let mut unique: Vec<&str> = Vec::new();
        for code in codes.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
            if !unique.contains(&code) {
                unique.push(code);
            }
        }

        let mut names = HashMap::new();
        let mut to_fetch = Vec::new();
        for code in &unique {
            match self.cache.get::<String>(&cache_key(code)).await {
                Ok(Some(name)) => {
                    names.insert((*code).to_string(), name);
                }
                Ok(None) => to_fetch.push(*code),
                Err(e) => {
                    warn!("Airline cache lookup failed: {e}");
                    to_fetch.push(*code);
                }
            }
        }

        if !to_fetch.is_empty() {
            debug!("Fetching {} airline names", to_fetch.len());
            let params = [("airlineCodes", to_fetch.join(","))];
            let envelope: DataEnvelope<AirlineRecord> =
                self.client.get(AIRLINES_PATH, &params).await?;

            for record in &envelope.data {
                let (Some(code), Some(name)) = (record.code(), record.display_name()) else {
                    continue;
                };
                let name = title_case(name);
                if let Err(e) = self
                    .cache
                    .put(&cache_key(code), name.clone(), jittered_ttl(self.ttl))
                    .await
                {
                    warn!("Failed to cache airline {code}: {e}");
                }
                names.insert(code.to_string(), name);
            }
        }

        Ok(unique
            .into_iter()
            .map(|code| {
                let name = names
                    .get(code)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_AIRLINE.to_string());
                (code.to_string(), name)
            })
            .collect())
    }
}

fn cache_key(code: &str) -> String {
    format!("airline:{code}")
}
