//! Flight offer summaries

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::amadeus::airlines::UNKNOWN_AIRLINE;
use crate::amadeus::models::{FlightOffer, Itinerary, Segment};
use crate::models::{FlightSummary, LegSummary};

use super::price_order;

const UNKNOWN_BUCKET: &str = "UNKNOWN";

fn segments(offer: &FlightOffer, leg: usize) -> Option<&[Segment]> {
    offer.itineraries.get(leg).map(|it: &Itinerary| it.segments.as_slice())
}

/// Airports, times and stop count of one leg (0 outbound, 1 inbound).
/// `None` when the offer has no such itinerary.
#[must_use]
pub fn leg_summary(offer: &FlightOffer, leg: usize) -> Option<LegSummary> {
    let segments = segments(offer, leg)?;
    let (Some(first), Some(last)) = (segments.first(), segments.last()) else {
        return Some(LegSummary {
            stops: Some(0),
            ..LegSummary::default()
        });
    };

    let departure = first.departure.as_ref();
    let arrival = last.arrival.as_ref();
    Some(LegSummary {
        from_airport: departure.and_then(|d| d.iata_code.clone()),
        to_airport: arrival.and_then(|a| a.iata_code.clone()),
        depart_time: departure.and_then(|d| d.at.clone()),
        arrive_time: arrival.and_then(|a| a.at.clone()),
        stops: Some(segments.len() - 1),
        carriers: carrier_codes_for_leg(offer, leg),
        carrier_names: Vec::new(),
    })
}

/// Unique carrier codes of a leg in flight order. The operating carrier wins
/// over the marketing one.
#[must_use]
pub fn carrier_codes_for_leg(offer: &FlightOffer, leg: usize) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();
    for segment in segments(offer, leg).unwrap_or_default() {
        let code = segment
            .operating
            .as_ref()
            .and_then(|o| o.carrier_code.as_deref())
            .or(segment.carrier_code.as_deref());
        if let Some(code) = code.filter(|c| !c.is_empty()) {
            if !codes.iter().any(|c| c == code) {
                codes.push(code.to_string());
            }
        }
    }
    codes
}

/// Every carrier code across all offers, de-duplicated, for one batch lookup
#[must_use]
pub fn carrier_codes(offers: &[FlightOffer]) -> Vec<String> {
    let mut seen = HashSet::new();
    offers
        .iter()
        .flat_map(|offer| [carrier_codes_for_leg(offer, 0), carrier_codes_for_leg(offer, 1)])
        .flatten()
        .filter(|code| seen.insert(code.clone()))
        .collect()
}

fn with_names(mut leg: LegSummary, names: &HashMap<String, String>) -> LegSummary {
    leg.carrier_names = leg
        .carriers
        .iter()
        .map(|code| {
            let name = names.get(code).map_or(UNKNOWN_AIRLINE, String::as_str);
            format!("{code} — {name}")
        })
        .collect();
    leg
}

/// UI summary of one offer. The inbound leg is dropped when it has no
/// departure airport.
#[must_use]
pub fn summarize_offer(offer: &FlightOffer, names: &HashMap<String, String>) -> FlightSummary {
    let outbound = leg_summary(offer, 0).unwrap_or_default();
    let inbound = leg_summary(offer, 1).filter(|leg| leg.from_airport.is_some());
    let price = offer.price.as_ref();

    FlightSummary {
        id: offer.id.clone(),
        price_total: price.and_then(|p| p.grand_total.clone()),
        currency: price.and_then(|p| p.currency.clone()),
        outbound: with_names(outbound, names),
        inbound: inbound.map(|leg| with_names(leg, names)),
    }
}

/// Summaries of all offers, cheapest first, unpriced last
#[must_use]
pub fn summarize_offers(offers: &[FlightOffer], names: &HashMap<String, String>) -> Vec<FlightSummary> {
    let mut sorted: Vec<&FlightOffer> = offers.iter().collect();
    sorted.sort_by(|a, b| price_order(a.grand_total(), b.grand_total()));
    sorted.into_iter().map(|o| summarize_offer(o, names)).collect()
}

fn group_by<'a, F>(offers: &'a [FlightOffer], key: F) -> BTreeMap<String, Vec<&'a FlightOffer>>
where
    F: Fn(&LegSummary) -> Option<String>,
{
    let mut buckets: BTreeMap<String, Vec<&FlightOffer>> = BTreeMap::new();
    for offer in offers {
        let bucket = leg_summary(offer, 0)
            .as_ref()
            .and_then(&key)
            .unwrap_or_else(|| UNKNOWN_BUCKET.to_string());
        buckets.entry(bucket).or_default().push(offer);
    }
    buckets
}

/// Bucket offers by the final arrival airport of the outbound leg
/// (a city code such as `ROM` fans out to `FCO`/`CIA`).
#[must_use]
pub fn group_by_outbound_arrival_airport(offers: &[FlightOffer]) -> BTreeMap<String, Vec<&FlightOffer>> {
    group_by(offers, |leg| leg.to_airport.clone())
}

#[must_use]
pub fn group_by_outbound_departure_airport(offers: &[FlightOffer]) -> BTreeMap<String, Vec<&FlightOffer>> {
    group_by(offers, |leg| leg.from_airport.clone())
}

fn leg_signature(leg: Option<&LegSummary>) -> String {
    leg.map(|l| {
        format!(
            "{}>{}@{}/{}[{}]",
            l.from_airport.as_deref().unwrap_or_default(),
            l.to_airport.as_deref().unwrap_or_default(),
            l.depart_time.as_deref().unwrap_or_default(),
            l.arrive_time.as_deref().unwrap_or_default(),
            l.carriers.join(","),
        )
    })
    .unwrap_or_default()
}

fn signature(flight: &FlightSummary) -> String {
    format!(
        "{}|{}|{}|{}",
        leg_signature(Some(&flight.outbound)),
        leg_signature(flight.inbound.as_ref()),
        flight.price_total.as_deref().unwrap_or_default(),
        flight.currency.as_deref().unwrap_or_default(),
    )
}

/// Drop offers identical in airports, times, carriers and price, keeping
/// the first of each.
#[must_use]
pub fn dedupe_flights(flights: Vec<FlightSummary>) -> Vec<FlightSummary> {
    let mut seen = HashSet::new();
    flights
        .into_iter()
        .filter(|flight| seen.insert(signature(flight)))
        .collect()
}
