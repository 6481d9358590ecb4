//! Hotel offer summaries, enriched with static Hotel List data

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::amadeus::models::{HotelListItem, HotelOffer, HotelOffersItem};
use crate::models::{CheapestOffer, Geo, HotelSummary};

use super::price_order;

/// `{hotelId: item}` for enrichment
#[must_use]
pub fn index_hotel_list(hotel_list: &[HotelListItem]) -> HashMap<&str, &HotelListItem> {
    hotel_list
        .iter()
        .filter_map(|item| item.id().map(|id| (id, item)))
        .collect()
}

/// Offer with the lowest numeric `price.total`
#[must_use]
pub fn cheapest_offer(item: &HotelOffersItem) -> Option<&HotelOffer> {
    item.offers
        .iter()
        .filter_map(|offer| offer.total().map(|total| (total, offer)))
        .min_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, offer)| offer)
}

/// Nights between two `YYYY-MM-DD` dates, never negative
#[must_use]
pub fn nights_between(check_in: Option<&str>, check_out: Option<&str>) -> Option<i64> {
    let parse = |d: &str| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok();
    let check_in = parse(check_in?)?;
    let check_out = parse(check_out?)?;
    Some((check_out - check_in).num_days().max(0))
}

fn address_of(item: &HotelListItem) -> Option<String> {
    let address = item.address.as_ref()?;
    let parts: Vec<&str> = [
        address.lines.first().map(String::as_str),
        address.city_name.as_deref(),
        address.country_code.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|p| !p.is_empty())
    .collect();

    (!parts.is_empty()).then(|| parts.join(", "))
}

fn geo_of(item: &HotelListItem) -> Option<Geo> {
    let (lat, lng) = match (item.latitude, item.longitude) {
        (Some(lat), Some(lng)) => (lat, lng),
        _ => {
            let geo = item.geo_code?;
            (geo.latitude?, geo.longitude?)
        }
    };
    Some(Geo { lat, lng })
}

fn cheapest_summary(offer: &HotelOffer) -> CheapestOffer {
    let price = offer.price.as_ref();
    CheapestOffer {
        total: price.and_then(|p| p.total.clone()),
        currency: price.and_then(|p| p.currency.clone()),
        check_in: offer.check_in_date.clone(),
        check_out: offer.check_out_date.clone(),
        nights: nights_between(offer.check_in_date.as_deref(), offer.check_out_date.as_deref()),
        board: offer
            .board_type
            .clone()
            .or_else(|| offer.room.as_ref().and_then(|r| r.board_type.clone())),
    }
}

/// Compact summary of one v3 item, with name, address and geo filled from
/// the hotel list when the id is known there.
#[must_use]
pub fn summarize_hotel_offer(
    item: &HotelOffersItem,
    list_index: &HashMap<&str, &HotelListItem>,
) -> HotelSummary {
    let hotel = item.hotel.as_ref();
    let hotel_id = hotel.and_then(|h| h.hotel_id.clone());

    let mut summary = HotelSummary {
        hotel_id: hotel_id.clone(),
        name: hotel.and_then(|h| h.name.clone()),
        city_code: hotel.and_then(|h| h.city_code.clone()),
        address: None,
        geo: None,
        cheapest: cheapest_offer(item).map(cheapest_summary),
    };

    if let Some(listed) = hotel_id.as_deref().and_then(|id| list_index.get(id)) {
        if summary.name.is_none() {
            summary.name = listed.name.clone();
        }
        summary.address = address_of(listed);
        summary.geo = geo_of(listed);
    }
    summary
}

/// Summaries for all items, cheapest first
#[must_use]
pub fn summarize_hotel_offers(items: &[HotelOffersItem], hotel_list: &[HotelListItem]) -> Vec<HotelSummary> {
    let index = index_hotel_list(hotel_list);
    let mut sorted: Vec<&HotelOffersItem> = items.iter().collect();
    sorted.sort_by(|a, b| {
        price_order(
            cheapest_offer(a).and_then(HotelOffer::total),
            cheapest_offer(b).and_then(HotelOffer::total),
        )
    });
    sorted
        .into_iter()
        .map(|item| summarize_hotel_offer(item, &index))
        .collect()
}

/// Keep hotels whose cheapest stay fits into `share` of the trip budget.
/// Hotels without a price are dropped.
#[must_use]
pub fn filter_hotels_by_budget(hotels: Vec<HotelSummary>, total_budget: f64, share: f64) -> Vec<HotelSummary> {
    let limit = total_budget * share;
    hotels
        .into_iter()
        .filter(|hotel| hotel.cheapest_total().is_some_and(|total| total <= limit))
        .collect()
}
