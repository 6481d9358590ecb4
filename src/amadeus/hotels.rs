//! Hotel search in two steps: Hotel List by city for ids, then Hotel
//! Search v3 for offers on those ids.

use chrono::NaiveDate;
use tracing::{info, instrument};

use super::AmadeusClient;
use super::models::{DataEnvelope, HotelListItem, HotelOffersItem};
use crate::Result;

const HOTELS_BY_CITY_PATH: &str = "/v1/reference-data/locations/hotels/by-city";
const HOTEL_OFFERS_PATH: &str = "/v3/shopping/hotel-offers";

#[derive(Debug, Clone, PartialEq)]
pub struct HotelQuery {
    /// IATA city code, e.g. `ROM`
    pub city_code: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adults: u32,
    pub currency: String,
    /// Number of hotel ids passed to the offers search
    pub max_hotels: usize,
}

impl HotelQuery {
    pub fn new(city_code: impl Into<String>, check_in: NaiveDate, check_out: NaiveDate) -> Self {
        Self {
            city_code: city_code.into(),
            check_in,
            check_out,
            adults: 1,
            currency: "USD".to_string(),
            max_hotels: 25,
        }
    }
}

impl AmadeusClient {
    /// Static hotel records for a city
    pub async fn list_hotels_by_city(&self, city_code: &str) -> Result<Vec<HotelListItem>> {
        let envelope: DataEnvelope<HotelListItem> = self
            .get(HOTELS_BY_CITY_PATH, &[("cityCode", city_code.to_string())])
            .await?;
        Ok(envelope.data)
    }

    /// Best-rate offers for the given hotel ids. No ids, no request.
    pub async fn search_hotel_offers_by_ids(
        &self,
        hotel_ids: &[String],
        check_in: NaiveDate,
        check_out: NaiveDate,
        adults: u32,
        currency: &str,
    ) -> Result<Vec<HotelOffersItem>> {
        if hotel_ids.is_empty() {
            return Ok(Vec::new());
        }

        let params = [
            ("hotelIds", hotel_ids.join(",")),
            ("adults", adults.to_string()),
            ("checkInDate", check_in.format("%Y-%m-%d").to_string()),
            ("checkOutDate", check_out.format("%Y-%m-%d").to_string()),
            ("currency", currency.to_string()),
            ("bestRateOnly", "true".to_string()),
        ];
        let envelope: DataEnvelope<HotelOffersItem> = self.get(HOTEL_OFFERS_PATH, &params).await?;
        Ok(envelope.data)
    }

    /// Offers for the first `max_hotels` hotels in the city, together with
    /// the full hotel list for enrichment.
    #[instrument(skip(self), fields(city = %query.city_code))]
    pub async fn search_hotels(
        &self,
        query: &HotelQuery,
    ) -> Result<(Vec<HotelOffersItem>, Vec<HotelListItem>)> {
        let hotel_list = self.list_hotels_by_city(&query.city_code).await?;
        let ids: Vec<String> = hotel_list
            .iter()
            .filter_map(HotelListItem::id)
            .take(query.max_hotels)
            .map(String::from)
            .collect();

        let offers = self
            .search_hotel_offers_by_ids(&ids, query.check_in, query.check_out, query.adults, &query.currency)
            .await?;
        info!("{} hotels listed, {} with offers", hotel_list.len(), offers.len());
        Ok((offers, hotel_list))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{client_for, mock_token};
    use super::*;
    use mockito::Matcher;

    fn date(d: &str) -> NaiveDate {
        NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_no_ids_means_no_request() {
        let client = client_for("http://127.0.0.1:9");
        let offers = client
            .search_hotel_offers_by_ids(&[], date("2025-09-12"), date("2025-09-17"), 1, "USD")
            .await
            .unwrap();
        assert!(offers.is_empty());
    }

    #[tokio::test]
    async fn test_search_hotels_limits_ids() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server, 1).await;
        server
            .mock("GET", HOTELS_BY_CITY_PATH)
            .match_query(Matcher::UrlEncoded("cityCode".into(), "ROM".into()))
            .with_status(200)
            .with_body(
                r#"{"data":[{"hotelId":"RTROM001","name":"A"},{"hotel":{"hotelId":"RTROM002"}},
                           {"name":"no id"},{"hotelId":"RTROM003"}]}"#,
            )
            .create_async()
            .await;
        let offers = server
            .mock("GET", HOTEL_OFFERS_PATH)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("hotelIds".into(), "RTROM001,RTROM002".into()),
                Matcher::UrlEncoded("checkInDate".into(), "2025-09-12".into()),
                Matcher::UrlEncoded("checkOutDate".into(), "2025-09-17".into()),
                Matcher::UrlEncoded("bestRateOnly".into(), "true".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"data":[{"hotel":{"hotelId":"RTROM001"},"offers":[{"price":{"total":"800.00"}}]}]}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let query = HotelQuery {
            max_hotels: 2,
            ..HotelQuery::new("ROM", date("2025-09-12"), date("2025-09-17"))
        };
        let (found, list) = client.search_hotels(&query).await.unwrap();

        assert_eq!(list.len(), 4);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].offers[0].total(), Some(800.0));
        offers.assert_async().await;
    }
}
