use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use super::{TripAgent, require_trip};
use crate::Result;
use crate::amadeus::{AirlineDirectory, AmadeusClient, FlightQuery, HotelQuery, IataCodes, ReferenceResolver};
use crate::config::PlannerConfig;
use crate::models::{FlightSummary, HotelSummary, TripRequest, TripState};
use crate::summaries::{carrier_codes, dedupe_flights, filter_hotels_by_budget, summarize_hotel_offers, summarize_offers};

/// Fetches flight and hotel options for the parsed trip
pub struct FlightHotelAgent {
    client: Arc<AmadeusClient>,
    resolver: Arc<ReferenceResolver>,
    airlines: Arc<AirlineDirectory>,
    planner: PlannerConfig,
}

impl FlightHotelAgent {
    pub fn new(
        client: Arc<AmadeusClient>,
        resolver: Arc<ReferenceResolver>,
        airlines: Arc<AirlineDirectory>,
        planner: PlannerConfig,
    ) -> Self {
        Self {
            client,
            resolver,
            airlines,
            planner,
        }
    }

    async fn flights(
        &self,
        trip: &TripRequest,
        origin: &IataCodes,
        destination: &IataCodes,
        currency: &str,
    ) -> Result<Vec<FlightSummary>> {
        let query = FlightQuery {
            return_date: Some(trip.end_date),
            adults: self.planner.adults,
            currency: currency.to_string(),
            max_results: self.planner.max_flight_results,
            travel_class: Some(self.planner.travel_class.clone()),
            ..FlightQuery::new(&origin.city, &destination.city, trip.start_date)
        };
        let offers = self.client.search_flights(&query).await?;

        let names = match self.airlines.airline_names(&carrier_codes(&offers)).await {
            Ok(names) => names,
            Err(e) => {
                warn!("Airline name lookup failed: {e}");
                HashMap::new()
            }
        };
        Ok(dedupe_flights(summarize_offers(&offers, &names)))
    }

    async fn hotels(&self, trip: &TripRequest, destination: &IataCodes, currency: &str) -> Result<Vec<HotelSummary>> {
        let query = HotelQuery {
            adults: self.planner.adults,
            currency: currency.to_string(),
            max_hotels: self.planner.max_hotels,
            ..HotelQuery::new(&destination.city, trip.start_date, trip.end_date)
        };
        let (offers, hotel_list) = self.client.search_hotels(&query).await?;
        let hotels = summarize_hotel_offers(&offers, &hotel_list);

        Ok(match trip.budget {
            Some(budget) if budget > 0.0 => {
                filter_hotels_by_budget(hotels, budget, self.planner.hotel_budget_share)
            }
            _ => hotels,
        })
    }

    async fn resolve(&self, origin: &str, destination: &str) -> Result<(IataCodes, IataCodes)> {
        let origin = self.resolver.city_to_codes(origin).await?;
        let destination = self.resolver.city_to_codes(destination).await?;
        Ok((origin, destination))
    }
}

#[async_trait]
impl TripAgent for FlightHotelAgent {
    fn name(&self) -> &'static str {
        "flight_hotel"
    }

    #[instrument(name = "flight_hotel", skip_all)]
    async fn run(&self, state: &mut TripState) -> Result<()> {
        let trip = require_trip(state)?.clone();
        let origin = trip
            .origin
            .clone()
            .or_else(|| state.home_iata.clone())
            .unwrap_or_else(|| self.planner.default_origin.clone());

        let (origin_codes, dest_codes) = match self.resolve(&origin, &trip.destination).await {
            Ok(codes) => codes,
            Err(e) => {
                state.flight_options.clear();
                state.hotel_options.clear();
                state.record_error(self.name(), format!("IATA resolution failed: {e}"));
                return Ok(());
            }
        };
        info!(
            origin = %origin_codes.city,
            destination = %dest_codes.city,
            "Searching flights and hotels"
        );

        let currency = state.currency.clone();
        let (flights, hotels) = futures::join!(
            self.flights(&trip, &origin_codes, &dest_codes, &currency),
            self.hotels(&trip, &dest_codes, &currency),
        );

        match flights {
            Ok(flights) => state.flight_options = flights,
            Err(e) => {
                warn!("Flight search failed: {e}");
                state.flight_options.clear();
                state.record_error(self.name(), format!("Flight search failed: {e}"));
            }
        }
        match hotels {
            Ok(hotels) => state.hotel_options = hotels,
            Err(e) => {
                warn!("Hotel search failed: {e}");
                state.hotel_options.clear();
                state.record_error(self.name(), format!("Hotel search failed: {e}"));
            }
        }

        info!(
            flights = state.flight_options.len(),
            hotels = state.hotel_options.len(),
            "Flight and hotel search finished"
        );
        Ok(())
    }
}
