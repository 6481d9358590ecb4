//! JSON API mounted under `/api`

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::amadeus::AmadeusClient;
use crate::amadeus::models::LocationRecord;
use crate::models::{PlanRequest, TripState};
use crate::supervisor::TravelPlanner;
use crate::{TravelBuddyError, VERSION};

const DEFAULT_LOCATION_LIMIT: u32 = 5;
const MAX_LOCATION_LIMIT: u32 = 20;

#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<TravelPlanner>,
    pub amadeus: Arc<AmadeusClient>,
}

#[derive(Debug, Deserialize)]
pub struct LocationsQuery {
    pub keyword: String,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/plan", post(plan_trip))
        .route("/locations", get(search_locations))
        .route("/health", get(health))
        .with_state(state)
}

async fn plan_trip(State(state): State<AppState>, Json(request): Json<PlanRequest>) -> Json<TripState> {
    info!(
        destination = request.trip.destination.as_deref().unwrap_or_default(),
        free_text = request.user_input.is_some(),
        "Planning request"
    );
    Json(state.planner.plan(request).await)
}

async fn search_locations(
    State(state): State<AppState>,
    Query(query): Query<LocationsQuery>,
) -> Result<Json<Vec<LocationRecord>>, TravelBuddyError> {
    let keyword = query.keyword.trim();
    if keyword.chars().count() < 2 {
        return Err(TravelBuddyError::validation("Keyword must have at least 2 characters"));
    }
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LOCATION_LIMIT)
        .clamp(1, MAX_LOCATION_LIMIT);

    let locations = state.amadeus.search_locations(keyword, limit).await?;
    Ok(Json(locations))
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: VERSION,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::ReminderAgent;
    use crate::amadeus::test_support::{client_for, mock_token};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use mockito::Matcher;
    use rstest::rstest;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app(amadeus_url: &str) -> Router {
        router(AppState {
            planner: Arc::new(TravelPlanner::with_agents(vec![Box::new(ReminderAgent)], "USD")),
            amadeus: Arc::new(client_for(amadeus_url)),
        })
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app("http://127.0.0.1:9")
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], VERSION);
    }

    #[tokio::test]
    async fn test_plan_records_stage_errors_with_ok_status() {
        let response = app("http://127.0.0.1:9")
            .oneshot(
                Request::post("/plan")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"destination":"Rome"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["errors"][0]["stage"], "reminders");
        assert!(json["reminders"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_plan_rejects_malformed_json() {
        let response = app("http://127.0.0.1:9")
            .oneshot(
                Request::post("/plan")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_locations_passthrough() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server, 1).await;
        server
            .mock("GET", "/v1/reference-data/locations")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("keyword".into(), "Par".into()),
                Matcher::UrlEncoded("page[limit]".into(), "20".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"data":[{"subType":"CITY","iataCode":"PAR","name":"PARIS"}]}"#)
            .create_async()
            .await;

        let response = app(&server.url())
            .oneshot(
                Request::get("/locations?keyword=Par&limit=99")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json[0]["iataCode"], "PAR");
        assert_eq!(json[0]["subType"], "CITY");
    }

    #[rstest]
    #[case::single_letter("P")]
    #[case::single_multibyte_letter("%C3%A9")]
    #[case::blank("%20%20")]
    #[tokio::test]
    async fn test_locations_short_keyword_is_bad_request(#[case] keyword: &str) {
        let response = app("http://127.0.0.1:9")
            .oneshot(
                Request::get(format!("/locations?keyword={keyword}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
