//! The record accumulated by the planning pipeline

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{FlightSummary, HotelSummary, TripDraft, TripRequest};

/// Body of `POST /api/plan`
///
/// Structured form fields sit at the top level next to the optional
/// free-text description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanRequest {
    #[serde(flatten)]
    pub trip: TripDraft,
    pub currency: Option<String>,
    pub user_input: Option<String>,
    pub home_iata: Option<String>,
}

/// A timestamped nudge relative to the trip dates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub when: NaiveDateTime,
    pub message: String,
}

/// Failure of one pipeline stage, surfaced to the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageError {
    pub stage: String,
    pub message: String,
}

/// Trip record passed from stage to stage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TripState {
    pub user_input: String,
    pub home_iata: Option<String>,
    pub currency: String,
    /// Form fields awaiting validation by the destination parser
    #[serde(skip)]
    pub draft: Option<TripDraft>,
    pub trip_request: Option<TripRequest>,
    pub flight_options: Vec<FlightSummary>,
    pub hotel_options: Vec<HotelSummary>,
    pub itinerary: Vec<String>,
    pub packing_list: Vec<String>,
    pub reminders: Vec<Reminder>,
    pub errors: Vec<StageError>,
}

impl TripState {
    /// Build the initial state from a web request
    #[must_use]
    pub fn from_request(request: PlanRequest, default_currency: &str) -> Self {
        let currency = request
            .currency
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| default_currency.to_string());

        let home_iata = request
            .home_iata
            .map(|h| h.trim().to_uppercase())
            .filter(|h| !h.is_empty());

        Self {
            user_input: request.user_input.unwrap_or_default().trim().to_string(),
            home_iata,
            currency,
            draft: Some(request.trip),
            ..Self::default()
        }
    }

    pub fn record_error(&mut self, stage: &str, message: impl Into<String>) {
        self.errors.push(StageError {
            stage: stage.to_string(),
            message: message.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_request_flattens_form_fields() {
        let request: PlanRequest = serde_json::from_str(
            r#"{"origin":"LHE","destination":"Rome","start_date":"2025-09-12",
                "end_date":"2025-09-17","budget":2000,"preferences":"history, food",
                "currency":" usd "}"#,
        )
        .unwrap();

        assert_eq!(request.trip.destination.as_deref(), Some("Rome"));
        assert_eq!(request.trip.budget, Some(2000.0));

        let state = TripState::from_request(request, "EUR");
        assert_eq!(state.currency, "USD");
        assert!(state.draft.is_some());
        assert!(state.user_input.is_empty());
    }

    #[test]
    fn test_default_currency_applies() {
        let state = TripState::from_request(PlanRequest::default(), "USD");
        assert_eq!(state.currency, "USD");
        assert!(state.home_iata.is_none());
    }

    #[test]
    fn test_state_serialises_result_fields() {
        let mut state = TripState::default();
        state.record_error("flight_hotel", "Hotel search failed");
        let json = serde_json::to_value(&state).unwrap();

        for key in [
            "trip_request",
            "flight_options",
            "hotel_options",
            "itinerary",
            "packing_list",
            "reminders",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert!(json.get("draft").is_none());
        assert_eq!(json["errors"][0]["stage"], "flight_hotel");
    }
}
