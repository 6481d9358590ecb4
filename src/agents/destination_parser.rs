use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use tracing::{info, instrument};

use super::TripAgent;
use crate::llm::{CompletionOptions, LanguageModel, extract_json_object};
use crate::models::{TripDraft, TripState};
use crate::{Result, TravelBuddyError};

const EXTRACTION: CompletionOptions = CompletionOptions::new(300, 0.0);

fn extraction_prompt(user_input: &str) -> String {
    format!(
        "Extract the following fields from the user's travel request and output them as strict JSON \
         (no explanations, no markdown, no comments): destination, start_date, end_date, budget, preferences. \
         If a field is not mentioned, set it to null. User input: \"{user_input}\"\nJSON:"
    )
}

/// Turns form fields or free text into a validated trip request
pub struct DestinationParserAgent {
    llm: Arc<dyn LanguageModel>,
    today: fn() -> NaiveDate,
}

impl DestinationParserAgent {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self {
            llm,
            today: || Local::now().date_naive(),
        }
    }

    /// Fix the reference date used for dates without a year
    #[must_use]
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    async fn draft_from_text(&self, user_input: &str) -> Result<TripDraft> {
        let reply = self
            .llm
            .complete(&extraction_prompt(user_input), EXTRACTION)
            .await?;
        let value = extract_json_object(&reply)?;
        serde_json::from_value(value)
            .map_err(|e| TravelBuddyError::llm(format!("Model returned an unusable trip: {e}")))
    }
}

#[async_trait]
impl TripAgent for DestinationParserAgent {
    fn name(&self) -> &'static str {
        "destination_parser"
    }

    #[instrument(name = "destination_parser", skip_all)]
    async fn run(&self, state: &mut TripState) -> Result<()> {
        let draft = match state.draft.take() {
            Some(draft) if draft.has_destination() => draft,
            _ if !state.user_input.is_empty() => self.draft_from_text(&state.user_input).await?,
            _ => {
                return Err(TravelBuddyError::validation(
                    "Provide a destination with dates or describe the trip in text",
                ));
            }
        };

        let request = draft.into_request((self.today)())?;
        info!(
            destination = %request.destination,
            start = %request.start_date,
            end = %request.end_date,
            "Trip request ready"
        );
        state.trip_request = Some(request);
        Ok(())
    }
}
