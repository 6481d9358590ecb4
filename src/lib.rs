//! `TravelBuddy` - multi-stage trip planning on top of Amadeus and an LLM
//!
//! A trip request (form fields or free text) runs through a fixed pipeline:
//! destination parsing, flight and hotel search, itinerary, packing list and
//! reminders. Each stage adds its part to a shared [`TripState`].

pub mod agents;
pub mod amadeus;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod llm;
pub mod models;
pub mod summaries;
pub mod supervisor;
pub mod telemetry;
pub mod web;

// Re-export core types for public API
pub use amadeus::AmadeusClient;
pub use cache::PersistentCache;
pub use config::TravelBuddyConfig;
pub use error::TravelBuddyError;
pub use llm::{ChatCompletionClient, LanguageModel};
pub use models::{PlanRequest, TripRequest, TripState};
pub use supervisor::TravelPlanner;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TravelBuddyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
