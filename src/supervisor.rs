//! Runs the planning stages in their fixed order

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use crate::agents::{
    DestinationParserAgent, FlightHotelAgent, ItineraryAgent, PackingListAgent, ReminderAgent, TripAgent,
};
use crate::amadeus::{AirlineDirectory, AmadeusClient, ReferenceResolver};
use crate::cache::PersistentCache;
use crate::config::TravelBuddyConfig;
use crate::llm::LanguageModel;
use crate::models::{PlanRequest, TripState};

pub struct TravelPlanner {
    agents: Vec<Box<dyn TripAgent>>,
    default_currency: String,
}

impl TravelPlanner {
    /// Standard pipeline: destination parser, flights & hotels, itinerary,
    /// packing list, reminders.
    pub fn new(
        config: &TravelBuddyConfig,
        client: Arc<AmadeusClient>,
        llm: Arc<dyn LanguageModel>,
        cache: Arc<PersistentCache>,
    ) -> Self {
        let ttl = Duration::from_secs(u64::from(config.cache.reference_ttl_hours) * 3600);
        let resolver = Arc::new(ReferenceResolver::new(client.clone(), cache.clone(), ttl));
        let airlines = Arc::new(AirlineDirectory::new(client.clone(), cache, ttl));

        let agents: Vec<Box<dyn TripAgent>> = vec![
            Box::new(DestinationParserAgent::new(llm.clone())),
            Box::new(FlightHotelAgent::new(client, resolver, airlines, config.planner.clone())),
            Box::new(ItineraryAgent::new(llm.clone())),
            Box::new(PackingListAgent::new(llm)),
            Box::new(ReminderAgent),
        ];
        Self::with_agents(agents, &config.planner.default_currency)
    }

    pub fn with_agents(agents: Vec<Box<dyn TripAgent>>, default_currency: &str) -> Self {
        Self {
            agents,
            default_currency: default_currency.to_string(),
        }
    }

    /// Stage names in execution order
    #[must_use]
    pub fn stages(&self) -> Vec<&'static str> {
        self.agents.iter().map(|a| a.name()).collect()
    }

    /// Run every stage over a fresh state. Stage failures end up in
    /// `errors` and never abort the run.
    #[instrument(skip_all)]
    pub async fn plan(&self, request: PlanRequest) -> TripState {
        let mut state = TripState::from_request(request, &self.default_currency);
        let started = Instant::now();

        for agent in &self.agents {
            if let Err(e) = agent.run(&mut state).await {
                warn!(stage = agent.name(), "Stage failed: {e}");
                state.record_error(agent.name(), e.to_string());
            }
        }

        info!(
            elapsed_ms = started.elapsed().as_millis(),
            errors = state.errors.len(),
            "Planning finished"
        );
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Result, TravelBuddyError};
    use async_trait::async_trait;

    struct Mark(&'static str);

    #[async_trait]
    impl TripAgent for Mark {
        fn name(&self) -> &'static str {
            self.0
        }

        async fn run(&self, state: &mut TripState) -> Result<()> {
            state.itinerary.push(self.0.to_string());
            Ok(())
        }
    }

    struct Fail;

    #[async_trait]
    impl TripAgent for Fail {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn run(&self, _state: &mut TripState) -> Result<()> {
            Err(TravelBuddyError::api("upstream down"))
        }
    }

    #[tokio::test]
    async fn test_failing_stage_is_recorded_and_pipeline_continues() {
        let planner = TravelPlanner::with_agents(
            vec![Box::new(Mark("first")), Box::new(Fail), Box::new(Mark("last"))],
            "USD",
        );
        assert_eq!(planner.stages(), vec!["first", "broken", "last"]);

        let state = planner.plan(PlanRequest::default()).await;

        assert_eq!(state.itinerary, vec!["first", "last"]);
        assert_eq!(state.errors.len(), 1);
        assert_eq!(state.errors[0].stage, "broken");
        assert_eq!(state.errors[0].message, "API error: upstream down");
        assert_eq!(state.currency, "USD");
    }
}
