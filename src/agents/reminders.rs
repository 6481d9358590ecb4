use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{info, instrument};

use super::{TripAgent, require_trip};
use crate::Result;
use crate::models::{MAX_TRIP_DAYS, Reminder, TripState};

/// Hours before departure and message of the fixed pre-trip reminders
const PRE_TRIP: [(i64, &str); 5] = [
    (7 * 24, "Review passport/visa & travel insurance."),
    (3 * 24, "Start packing essentials (IDs, adapters, chargers)."),
    (24, "Online check-in opens—pick seats and download boarding pass."),
    (6, "Confirm airport ride / ride-hailing availability."),
    (3, "Leave for airport (international flight buffer)."),
];

fn at(date: NaiveDate, hour: u32) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN))
}

/// Reminder schedule for a trip.
///
/// Pre-trip reminders count back from 09:00 on the start date. Every trip day
/// then gets a 09:00 plan reminder from `itinerary` (or a free day), and a
/// 19:00 dinner reminder when there are preferences. Reversed dates are
/// swapped and at most [`MAX_TRIP_DAYS`] days are covered.
#[must_use]
pub fn build_reminders(
    start: NaiveDate,
    end: NaiveDate,
    itinerary: &[String],
    preferences: &[String],
) -> Vec<Reminder> {
    let (start, end) = if end < start { (end, start) } else { (start, end) };
    let departure = at(start, 9);

    let mut reminders: Vec<Reminder> = PRE_TRIP
        .iter()
        .filter_map(|(hours, message)| {
            Some(Reminder {
                when: departure.checked_sub_signed(Duration::hours(*hours))?,
                message: (*message).to_string(),
            })
        })
        .collect();

    let days = start
        .iter_days()
        .take_while(|d| *d <= end)
        .take(MAX_TRIP_DAYS as usize);
    for (i, day) in days.enumerate() {
        let message = itinerary.get(i).map_or_else(
            || "Free day / explore locally.".to_string(),
            |plan| format!("Today's plan: {plan}"),
        );
        reminders.push(Reminder {
            when: at(day, 9),
            message,
        });

        if !preferences.is_empty() {
            reminders.push(Reminder {
                when: at(day, 19),
                message: format!("Dinner idea near you (preferences: {}).", preferences.join(", ")),
            });
        }
    }
    reminders
}

/// Schedules reminders around the trip dates. No network.
#[derive(Debug, Default)]
pub struct ReminderAgent;

#[async_trait]
impl TripAgent for ReminderAgent {
    fn name(&self) -> &'static str {
        "reminders"
    }

    #[instrument(name = "reminders", skip_all)]
    async fn run(&self, state: &mut TripState) -> Result<()> {
        let trip = require_trip(state)?;
        let reminders = build_reminders(trip.start_date, trip.end_date, &state.itinerary, &trip.preferences);
        info!(count = reminders.len(), "Reminders scheduled");
        state.reminders = reminders;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn when(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn test_pre_trip_offsets() {
        let reminders = build_reminders(date(2025, 9, 12), date(2025, 9, 12), &[], &[]);
        let times: Vec<_> = reminders.iter().take(5).map(|r| r.when).collect();
        assert_eq!(
            times,
            vec![
                when("2025-09-05T09:00:00"),
                when("2025-09-09T09:00:00"),
                when("2025-09-11T09:00:00"),
                when("2025-09-12T03:00:00"),
                when("2025-09-12T06:00:00"),
            ]
        );
        assert_eq!(reminders.len(), 6);
        assert_eq!(reminders[5].message, "Free day / explore locally.");
    }

    #[test]
    fn test_daily_plans_and_dinners() {
        let itinerary = vec!["Colosseum".to_string(), "Vatican".to_string()];
        let preferences = vec!["history".to_string(), "food".to_string()];
        let reminders = build_reminders(date(2025, 9, 12), date(2025, 9, 14), &itinerary, &preferences);

        // 5 fixed + 3 days x (plan + dinner)
        assert_eq!(reminders.len(), 11);
        assert_eq!(reminders[5].message, "Today's plan: Colosseum");
        assert_eq!(reminders[5].when, when("2025-09-12T09:00:00"));
        assert_eq!(reminders[6].message, "Dinner idea near you (preferences: history, food).");
        assert_eq!(reminders[6].when, when("2025-09-12T19:00:00"));
        assert_eq!(reminders[7].message, "Today's plan: Vatican");
        assert_eq!(reminders[9].message, "Free day / explore locally.");
        assert_eq!(reminders[9].when, when("2025-09-14T09:00:00"));
    }

    #[test]
    fn test_reversed_dates_are_swapped() {
        let forward = build_reminders(date(2025, 9, 12), date(2025, 9, 15), &[], &[]);
        let reversed = build_reminders(date(2025, 9, 15), date(2025, 9, 12), &[], &[]);
        assert_eq!(forward, reversed);
        assert_eq!(forward.len(), 9);
    }

    #[test]
    fn test_long_range_is_capped() {
        let preferences = vec!["food".to_string()];
        let reminders = build_reminders(date(2025, 1, 1), date(9999, 12, 31), &[], &preferences);
        assert_eq!(reminders.len(), 5 + 2 * MAX_TRIP_DAYS as usize);
    }

    #[test]
    fn test_earliest_date_skips_unrepresentable_pre_trip_times() {
        let reminders = build_reminders(NaiveDate::MIN, NaiveDate::MIN, &[], &[]);
        // only the 6 h and 3 h offsets stay on the same day
        let messages: Vec<&str> = reminders.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Confirm airport ride / ride-hailing availability.",
                "Leave for airport (international flight buffer).",
                "Free day / explore locally.",
            ]
        );
    }

    #[tokio::test]
    async fn test_agent_requires_trip() {
        let mut state = TripState::default();
        assert!(ReminderAgent.run(&mut state).await.is_err());
        assert!(state.reminders.is_empty());
    }
}
