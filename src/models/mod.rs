//! Data models for the TravelBuddy application
//!
//! This module contains the records passed through the planning pipeline:
//! - Trip: the validated request and the raw draft it is built from
//! - Offers: UI-facing flight and hotel summaries
//! - State: the accumulating pipeline record, reminders and stage errors

pub mod offers;
pub mod state;
pub mod trip;

// Re-export all public types for convenient access
pub use offers::{CheapestOffer, FlightSummary, Geo, HotelSummary, LegSummary};
pub use state::{PlanRequest, Reminder, StageError, TripState};
pub use trip::{MAX_TRIP_DAYS, TripDraft, TripRequest};
