//! src/deal_checker/search_plan.rs
use chrono::{Duration, NaiveDate};

/// Destination list used when a subscription does not name its own
/// destinations (none do yet).
pub const DEFAULT_EUROPEAN_AIRPORTS: [&str; 20] = [
    "LHR", "CDG", "AMS", "FRA", "MUC", "MAD", "BCN", "FCO", "DUB", "ZRH", "CPH", "OSL", "ARN",
    "HEL", "VIE", "BRU", "LIS", "ATH", "PRG", "BUD",
];

/// The NYC metro code fans out to its three major airports.
pub const NYC_AREA_AIRPORTS: [&str; 3] = ["JFK", "EWR", "LGA"];

/// One flight-search API call the checker would make if it were live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSearch {
    pub engine: &'static str,
    pub departure_id: String,
    pub arrival_id: String,
    pub outbound_date: NaiveDate,
    pub return_date: NaiveDate,
    pub currency: &'static str,
    /// "1" is a round trip in the Google Flights engine.
    pub trip_type: &'static str,
}

/// Enumerate the cartesian product of origins, destinations, departure offsets
/// and trip lengths, capped at `call_limit` entries. Departures start tomorrow
/// and range over `1..departure_window_days` days out.
pub fn plan_searches(
    origin: &str,
    min_days: i64,
    max_days: i64,
    today: NaiveDate,
    departure_window_days: u32,
    call_limit: usize,
) -> Vec<PlannedSearch> {
    let origins: Vec<&str> = if origin == "NYC" {
        NYC_AREA_AIRPORTS.to_vec()
    } else {
        vec![origin]
    };

    let mut plan = Vec::new();
    for departure_id in &origins {
        for arrival_id in DEFAULT_EUROPEAN_AIRPORTS {
            for offset in 1..i64::from(departure_window_days) {
                let outbound_date = today + Duration::days(offset);
                for trip_length in min_days..=max_days {
                    if plan.len() >= call_limit {
                        return plan;
                    }
                    plan.push(PlannedSearch {
                        engine: "google_flights",
                        departure_id: departure_id.to_string(),
                        arrival_id: arrival_id.to_string(),
                        outbound_date,
                        return_date: outbound_date + Duration::days(trip_length),
                        currency: "USD",
                        trip_type: "1",
                    });
                }
            }
        }
    }
    plan
}
