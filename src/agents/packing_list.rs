use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use super::{TripAgent, item_text, require_trip};
use crate::Result;
use crate::llm::{CompletionOptions, LanguageModel, extract_json_array};
use crate::models::{TripRequest, TripState};

const PACKING: CompletionOptions = CompletionOptions::new(350, 0.5);

fn packing_prompt(trip: &TripRequest) -> String {
    format!(
        "Generate a packing checklist as a STRICT JSON array of strings for the following trip. \
         Do NOT include any explanations, markdown, or extra text. ONLY output a JSON array.\n\
         Trip details:\n\
         - Destination: {}\n\
         - Dates: {} to {}\n\
         - Traveler preferences: {}\n\n\
         Checklist should cover essentials (documents, chargers, adapters), weather-agnostic clothing basics, \
         and a few items related to the preferences. Example format: [\"Passport\", \"Phone charger\", \"...\"]",
        trip.destination,
        trip.start_date,
        trip.end_date,
        trip.preferences_text()
    )
}

/// Asks the model for a packing checklist
pub struct PackingListAgent {
    llm: Arc<dyn LanguageModel>,
}

impl PackingListAgent {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl TripAgent for PackingListAgent {
    fn name(&self) -> &'static str {
        "packing_list"
    }

    #[instrument(name = "packing_list", skip_all)]
    async fn run(&self, state: &mut TripState) -> Result<()> {
        let prompt = packing_prompt(require_trip(state)?);
        let reply = self.llm.complete(&prompt, PACKING).await?;

        state.packing_list = extract_json_array(&reply)?
            .iter()
            .map(|item| item_text(item).trim().to_string())
            .filter(|item| !item.is_empty())
            .collect();
        info!(items = state.packing_list.len(), "Packing list ready");
        Ok(())
    }
}
