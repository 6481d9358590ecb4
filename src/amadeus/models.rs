//! Amadeus response payloads.
//!
//! Only the fields the planner reads are modelled, and every one is optional:
//! test-environment data is sparse and shapes vary between endpoints.

use serde::{Deserialize, Deserializer, Serialize};

/// Standard `{"data": [...]}` envelope. A missing or `null` `data` is empty.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct DataEnvelope<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    pub data: Vec<T>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

// ---- reference data ----

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocationRecord {
    pub name: Option<String>,
    /// `CITY` or `AIRPORT`
    pub sub_type: Option<String>,
    pub iata_code: Option<String>,
    pub address: Option<LocationAddress>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocationAddress {
    pub city_name: Option<String>,
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AirlineRecord {
    pub iata_code: Option<String>,
    pub icao_code: Option<String>,
    pub business_name: Option<String>,
    pub common_name: Option<String>,
    pub name: Option<String>,
}

impl AirlineRecord {
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        non_blank(&self.iata_code).or_else(|| non_blank(&self.icao_code))
    }

    /// Most human-friendly name available
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        non_blank(&self.business_name)
            .or_else(|| non_blank(&self.common_name))
            .or_else(|| non_blank(&self.name))
    }
}

// ---- flight offers ----

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FlightOffer {
    pub id: Option<String>,
    pub itineraries: Vec<Itinerary>,
    pub price: Option<FlightPrice>,
}

impl FlightOffer {
    /// Parsed `price.grandTotal`
    #[must_use]
    pub fn grand_total(&self) -> Option<f64> {
        self.price
            .as_ref()
            .and_then(|p| p.grand_total.as_deref())
            .and_then(|t| t.parse().ok())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Itinerary {
    pub duration: Option<String>,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Segment {
    pub departure: Option<FlightEndpoint>,
    pub arrival: Option<FlightEndpoint>,
    /// Marketing carrier
    pub carrier_code: Option<String>,
    pub operating: Option<OperatingCarrier>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlightEndpoint {
    pub iata_code: Option<String>,
    pub at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OperatingCarrier {
    pub carrier_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlightPrice {
    pub currency: Option<String>,
    pub total: Option<String>,
    pub grand_total: Option<String>,
}

// ---- hotels ----

/// Static hotel record from the Hotel List API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HotelListItem {
    pub hotel_id: Option<String>,
    pub name: Option<String>,
    pub address: Option<HotelAddress>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub geo_code: Option<GeoCode>,
    /// Some payloads nest the id one level down
    pub hotel: Option<HotelRef>,
}

impl HotelListItem {
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.hotel_id
            .as_deref()
            .or_else(|| self.hotel.as_ref().and_then(|h| h.hotel_id.as_deref()))
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HotelRef {
    pub hotel_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HotelAddress {
    pub lines: Vec<String>,
    pub city_name: Option<String>,
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct GeoCode {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// One element of the Hotel Search v3 `data` array
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HotelOffersItem {
    pub hotel: Option<HotelInfo>,
    pub available: Option<bool>,
    pub offers: Vec<HotelOffer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HotelInfo {
    pub hotel_id: Option<String>,
    pub name: Option<String>,
    pub city_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HotelOffer {
    pub id: Option<String>,
    pub check_in_date: Option<String>,
    pub check_out_date: Option<String>,
    pub board_type: Option<String>,
    pub room: Option<HotelRoom>,
    pub price: Option<HotelPrice>,
}

impl HotelOffer {
    /// Parsed `price.total`
    #[must_use]
    pub fn total(&self) -> Option<f64> {
        self.price
            .as_ref()
            .and_then(|p| p.total.as_deref())
            .and_then(|t| t.parse().ok())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HotelRoom {
    pub board_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HotelPrice {
    pub currency: Option<String>,
    pub total: Option<String>,
}
