//! Flight Offers Search (v2)

use chrono::NaiveDate;
use tracing::{info, instrument};

use super::AmadeusClient;
use super::models::{DataEnvelope, FlightOffer};
use crate::Result;

const FLIGHT_OFFERS_PATH: &str = "/v2/shopping/flight-offers";

/// Flight search parameters
#[derive(Debug, Clone, PartialEq)]
pub struct FlightQuery {
    pub origin_iata: String,
    pub dest_iata: String,
    pub depart_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub adults: u32,
    pub currency: String,
    pub max_results: u32,
    /// Drop offers whose grand total exceeds this
    pub max_price: Option<f64>,
    pub non_stop: Option<bool>,
    /// `ECONOMY`, `PREMIUM_ECONOMY`, `BUSINESS` or `FIRST`
    pub travel_class: Option<String>,
}

impl FlightQuery {
    pub fn new(origin_iata: impl Into<String>, dest_iata: impl Into<String>, depart_date: NaiveDate) -> Self {
        Self {
            origin_iata: origin_iata.into(),
            dest_iata: dest_iata.into(),
            depart_date,
            return_date: None,
            adults: 1,
            currency: "USD".to_string(),
            max_results: 20,
            max_price: None,
            non_stop: None,
            travel_class: None,
        }
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("originLocationCode", self.origin_iata.clone()),
            ("destinationLocationCode", self.dest_iata.clone()),
            ("departureDate", self.depart_date.format("%Y-%m-%d").to_string()),
            ("adults", self.adults.to_string()),
            ("currencyCode", self.currency.clone()),
            ("max", self.max_results.to_string()),
        ];
        if let Some(date) = self.return_date {
            params.push(("returnDate", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(non_stop) = self.non_stop {
            params.push(("nonStop", non_stop.to_string()));
        }
        if let Some(class) = self.travel_class.as_deref().filter(|c| !c.is_empty()) {
            params.push(("travelClass", class.to_string()));
        }
        params
    }
}

/// Keep offers within `max_price`. Offers without a readable price are kept.
fn within_budget(offers: Vec<FlightOffer>, max_price: Option<f64>) -> Vec<FlightOffer> {
    let Some(max) = max_price else {
        return offers;
    };
    offers
        .into_iter()
        .filter(|offer| offer.grand_total().is_none_or(|total| total <= max))
        .collect()
}

impl AmadeusClient {
    /// Raw flight offers for `query`
    #[instrument(skip(self), fields(origin = %query.origin_iata, dest = %query.dest_iata))]
    pub async fn search_flights(&self, query: &FlightQuery) -> Result<Vec<FlightOffer>> {
        let envelope: DataEnvelope<FlightOffer> =
            self.get(FLIGHT_OFFERS_PATH, &query.params()).await?;
        let received = envelope.data.len();
        let offers = within_budget(envelope.data, query.max_price);
        info!("Received {received} flight offers, {} within budget", offers.len());
        Ok(offers)
    }
}

#[cfg(test)]
mod tests {
    use super::super::models::FlightPrice;
    use super::super::test_support::{client_for, mock_token};
    use super::*;
    use mockito::Matcher;

    fn date(d: &str) -> NaiveDate {
        NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()
    }

    fn offer(grand_total: Option<&str>) -> FlightOffer {
        FlightOffer {
            price: Some(FlightPrice {
                grand_total: grand_total.map(String::from),
                ..FlightPrice::default()
            }),
            ..FlightOffer::default()
        }
    }

    #[test]
    fn test_optional_params_only_when_set() {
        let query = FlightQuery::new("LHE", "ROM", date("2025-09-12"));
        let keys: Vec<_> = query.params().iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            ["originLocationCode", "destinationLocationCode", "departureDate", "adults", "currencyCode", "max"]
        );

        let query = FlightQuery {
            return_date: Some(date("2025-09-17")),
            non_stop: Some(false),
            travel_class: Some("ECONOMY".into()),
            ..query
        };
        let params = query.params();
        assert!(params.contains(&("returnDate", "2025-09-17".to_string())));
        assert!(params.contains(&("nonStop", "false".to_string())));
        assert!(params.contains(&("travelClass", "ECONOMY".to_string())));
    }

    #[test]
    fn test_budget_filter_keeps_unpriced_offers() {
        let offers = vec![offer(Some("500.00")), offer(Some("1500.00")), offer(None), offer(Some("n/a"))];
        let kept = within_budget(offers, Some(1000.0));
        assert_eq!(kept.len(), 3);
        assert!(kept.iter().all(|o| o.grand_total().is_none_or(|t| t <= 1000.0)));
    }

    #[tokio::test]
    async fn test_search_flights_sends_query() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server, 1).await;
        let search = server
            .mock("GET", FLIGHT_OFFERS_PATH)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("originLocationCode".into(), "LHE".into()),
                Matcher::UrlEncoded("destinationLocationCode".into(), "FCO".into()),
                Matcher::UrlEncoded("departureDate".into(), "2025-09-12".into()),
                Matcher::UrlEncoded("returnDate".into(), "2025-09-17".into()),
                Matcher::UrlEncoded("max".into(), "20".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"data":[{"id":"1","price":{"grandTotal":"933.00","currency":"USD"}},
                           {"id":"2","price":{"grandTotal":"2400.00","currency":"USD"}}]}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server.url());
        let query = FlightQuery {
            return_date: Some(date("2025-09-17")),
            max_price: Some(2000.0),
            ..FlightQuery::new("LHE", "FCO", date("2025-09-12"))
        };
        let offers = client.search_flights(&query).await.unwrap();

        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].id.as_deref(), Some("1"));
        search.assert_async().await;
    }
}
