//! Trip request model, the raw form/LLM draft it is built from, and the
//! lenient parsing helpers both share.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{Result, TravelBuddyError};

/// Longest trip, in days including both ends, a request may span
pub const MAX_TRIP_DAYS: i64 = 90;

/// A validated trip request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    /// City name or IATA code, `None` when the user left it blank
    pub origin: Option<String>,
    /// City name or IATA code
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Total budget for the whole trip
    pub budget: Option<f64>,
    pub preferences: Vec<String>,
}

impl TripRequest {
    /// Preferences joined for prompts, with a neutral default
    #[must_use]
    pub fn preferences_text(&self) -> String {
        if self.preferences.is_empty() {
            "general sightseeing".to_string()
        } else {
            self.preferences.join(", ")
        }
    }
}

/// Unvalidated trip fields as they arrive from the web form or the LLM.
///
/// Every field is optional and deliberately forgiving: budgets may be numbers
/// or strings such as `"$2,000"`, preferences may be a single string or a list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TripDraft {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(deserialize_with = "lenient_amount")]
    pub budget: Option<f64>,
    #[serde(deserialize_with = "one_or_many")]
    pub preferences: Vec<String>,
}

impl TripDraft {
    /// True when the draft names a destination
    #[must_use]
    pub fn has_destination(&self) -> bool {
        self.destination
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty())
    }

    /// Validate and normalise into a [`TripRequest`]
    pub fn into_request(self, today: NaiveDate) -> Result<TripRequest> {
        let destination = self
            .destination
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .ok_or_else(|| TravelBuddyError::validation("Destination is required"))?;

        let start_date = self
            .start_date
            .as_deref()
            .ok_or_else(|| TravelBuddyError::validation("Start date is required"))
            .and_then(|s| parse_trip_date(s, today))?;
        let end_date = self
            .end_date
            .as_deref()
            .ok_or_else(|| TravelBuddyError::validation("End date is required"))
            .and_then(|s| parse_trip_date(s, today))?;

        let span_days = (end_date - start_date).num_days().abs() + 1;
        if span_days > MAX_TRIP_DAYS {
            return Err(TravelBuddyError::validation(format!(
                "Trip spans {span_days} days, at most {MAX_TRIP_DAYS} are supported"
            )));
        }

        let origin = self
            .origin
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty());

        Ok(TripRequest {
            origin,
            destination,
            start_date,
            end_date,
            budget: self.budget.filter(|b| *b > 0.0),
            preferences: normalize_preferences(self.preferences),
        })
    }
}

/// Trim entries and drop blanks
pub fn normalize_preferences<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse a trip date leniently.
///
/// Accepts ISO dates (`2025-09-12`), ISO date-times, US numeric dates
/// (`09/12/2025`) and written dates with or without ordinals and year
/// (`September 12th`, `Sep 12, 2025`, `12 September 2025`). A missing year
/// is taken from `today`.
pub fn parse_trip_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TravelBuddyError::validation("Date cannot be empty"));
    }

    if let Some(prefix) = trimmed.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return Ok(date);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%m/%d/%Y") {
        return Ok(date);
    }

    let cleaned = strip_ordinals(&trimmed.replace(',', " "));
    const WITH_YEAR: [&str; 4] = ["%B %d %Y", "%b %d %Y", "%d %B %Y", "%d %b %Y"];
    for format in WITH_YEAR {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, format) {
            return Ok(date);
        }
    }

    let with_year = format!("{cleaned} {}", today.year());
    for format in WITH_YEAR {
        if let Ok(date) = NaiveDate::parse_from_str(&with_year, format) {
            return Ok(date);
        }
    }

    Err(TravelBuddyError::validation(format!(
        "Unrecognised date '{trimmed}'. Use YYYY-MM-DD."
    )))
}

/// `12th` -> `12`, collapsing whitespace on the way
fn strip_ordinals(input: &str) -> String {
    input
        .split_whitespace()
        .map(|token| {
            let lower = token.to_ascii_lowercase();
            let digits = token.chars().take_while(char::is_ascii_digit).count();
            let suffix = &lower[digits..];
            if digits > 0 && matches!(suffix, "st" | "nd" | "rd" | "th") {
                &token[..digits]
            } else {
                token
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(s)) => normalize_preferences(s.split(',')),
        Some(Value::Array(items)) => normalize_preferences(items.iter().map(|item| match item {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })),
        Some(other) => normalize_preferences([other.to_string()]),
    })
}

fn lenient_amount<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            // "$2,000" -> "2000", "-500 USD" -> "-500"
            let mut digits = String::new();
            for c in s.chars() {
                if c.is_ascii_digit() || c == '.' || (c == '-' && digits.is_empty()) {
                    digits.push(c);
                }
            }
            digits.parse::<f64>().ok()
        }
        _ => None,
    })
}
