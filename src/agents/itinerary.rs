use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use super::{TripAgent, item_text, require_trip};
use crate::Result;
use crate::llm::{CompletionOptions, LanguageModel, extract_json_array};
use crate::models::{TripRequest, TripState};

const ITINERARY: CompletionOptions = CompletionOptions::new(350, 0.7);

fn itinerary_prompt(trip: &TripRequest) -> String {
    format!(
        "Generate a detailed day-by-day travel itinerary for a trip to {} from {} to {}. \
         The traveler prefers: {}. Respond ONLY with a strict JSON array, where each element is a string \
         describing the plan for one day. Do not include explanations, markdown, or any extra text. \
         Example: [\"Day 1: ...\", \"Day 2: ...\"]",
        trip.destination,
        trip.start_date,
        trip.end_date,
        trip.preferences_text()
    )
}

/// Asks the model for a day-by-day plan
pub struct ItineraryAgent {
    llm: Arc<dyn LanguageModel>,
}

impl ItineraryAgent {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl TripAgent for ItineraryAgent {
    fn name(&self) -> &'static str {
        "itinerary"
    }

    #[instrument(name = "itinerary", skip_all)]
    async fn run(&self, state: &mut TripState) -> Result<()> {
        let prompt = itinerary_prompt(require_trip(state)?);
        let reply = self.llm.complete(&prompt, ITINERARY).await?;

        state.itinerary = extract_json_array(&reply)?.iter().map(item_text).collect();
        info!(days = state.itinerary.len(), "Itinerary ready");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::test_support::ScriptedModel;
    use chrono::NaiveDate;

    fn state() -> TripState {
        TripState {
            trip_request: Some(TripRequest {
                origin: None,
                destination: "Rome".into(),
                start_date: NaiveDate::from_ymd_opt(2025, 9, 12).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2025, 9, 14).unwrap(),
                budget: None,
                preferences: vec![],
            }),
            ..TripState::default()
        }
    }

    #[tokio::test]
    async fn test_itinerary_items_become_strings() {
        let llm = Arc::new(ScriptedModel::replying([
            r#"Sure! ["Day 1: Colosseum", {"day": 2, "plan": "Vatican"}, "Day 3: Trastevere"]"#,
        ]));
        let mut state = state();
        ItineraryAgent::new(llm.clone()).run(&mut state).await.unwrap();

        assert_eq!(state.itinerary.len(), 3);
        assert_eq!(state.itinerary[0], "Day 1: Colosseum");
        assert_eq!(state.itinerary[1], r#"{"day":2,"plan":"Vatican"}"#);

        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0].0.contains("trip to Rome from 2025-09-12 to 2025-09-14"));
        assert!(prompts[0].0.contains("general sightseeing"));
        assert_eq!(prompts[0].1, ITINERARY);
    }

    #[tokio::test]
    async fn test_reply_without_array_is_error() {
        let llm = Arc::new(ScriptedModel::replying(["I cannot help with that."]));
        let mut state = state();
        assert!(ItineraryAgent::new(llm).run(&mut state).await.is_err());
        assert!(state.itinerary.is_empty());
    }
}
