//! Planning stages.
//!
//! Each stage reads what earlier stages left in the [`TripState`] and adds its
//! own piece. Stages never call each other; the supervisor runs them in order.

mod destination_parser;
mod flight_hotel;
mod itinerary;
mod packing_list;
mod reminders;

use async_trait::async_trait;

use crate::models::{TripRequest, TripState};
use crate::{Result, TravelBuddyError};

pub use destination_parser::DestinationParserAgent;
pub use flight_hotel::FlightHotelAgent;
pub use itinerary::ItineraryAgent;
pub use packing_list::PackingListAgent;
pub use reminders::{ReminderAgent, build_reminders};

/// One stage of the planning pipeline
#[async_trait]
pub trait TripAgent: Send + Sync {
    /// Stage name used in logs and in [`crate::models::StageError`]
    fn name(&self) -> &'static str;

    /// Read from and write to the shared state. An `Err` is recorded by the
    /// supervisor and the pipeline moves on.
    async fn run(&self, state: &mut TripState) -> Result<()>;
}

/// The parsed trip, or the error every downstream stage reports without one
pub(crate) fn require_trip(state: &TripState) -> Result<&TripRequest> {
    state
        .trip_request
        .as_ref()
        .ok_or_else(|| TravelBuddyError::validation("No trip request provided"))
}

/// Render an LLM list element as display text
pub(crate) fn item_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
