//! Flight and hotel summaries shown in the UI

use serde::{Deserialize, Serialize};

/// One direction of a flight offer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegSummary {
    pub from_airport: Option<String>,
    pub to_airport: Option<String>,
    /// Local departure time as reported by Amadeus (`YYYY-MM-DDTHH:MM:SS`)
    pub depart_time: Option<String>,
    pub arrive_time: Option<String>,
    /// Number of connections (segments - 1)
    pub stops: Option<usize>,
    /// Carrier codes in flight order, operating carrier preferred
    pub carriers: Vec<String>,
    /// `"QR — Qatar Airways"`
    pub carrier_names: Vec<String>,
}

/// Compact flight offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSummary {
    pub id: Option<String>,
    /// Grand total exactly as returned, e.g. `"933.00"`
    pub price_total: Option<String>,
    pub currency: Option<String>,
    pub outbound: LegSummary,
    pub inbound: Option<LegSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geo {
    pub lat: f64,
    pub lng: f64,
}

/// Cheapest bookable offer of a hotel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheapestOffer {
    pub total: Option<String>,
    pub currency: Option<String>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub nights: Option<i64>,
    pub board: Option<String>,
}

/// Compact hotel with its cheapest offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelSummary {
    pub hotel_id: Option<String>,
    pub name: Option<String>,
    pub city_code: Option<String>,
    pub address: Option<String>,
    pub geo: Option<Geo>,
    pub cheapest: Option<CheapestOffer>,
}

impl HotelSummary {
    /// Numeric total of the cheapest offer
    #[must_use]
    pub fn cheapest_total(&self) -> Option<f64> {
        self.cheapest
            .as_ref()
            .and_then(|c| c.total.as_deref())
            .and_then(|t| t.parse().ok())
    }
}
