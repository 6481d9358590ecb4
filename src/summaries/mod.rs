//! Pure transformations from raw Amadeus payloads to UI summaries.
//! Nothing in here touches the network.

pub mod flights;
pub mod hotels;

use std::cmp::Ordering;

pub use flights::{
    carrier_codes, dedupe_flights, group_by_outbound_arrival_airport,
    group_by_outbound_departure_airport, summarize_offers,
};
pub use hotels::{filter_hotels_by_budget, summarize_hotel_offers};

/// Ascending by price with missing prices last
pub(crate) fn price_order(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
