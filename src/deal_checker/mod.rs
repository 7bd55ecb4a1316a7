//! src/deal_checker/mod.rs
//!
//! The batch job behind the `check_deals` binary: read every subscription,
//! enumerate the flight searches a live integration would run (dry run only),
//! fabricate placeholder deals and email the ones within budget.
mod search_plan;

pub use search_plan::{DEFAULT_EUROPEAN_AIRPORTS, NYC_AREA_AIRPORTS, PlannedSearch, plan_searches};

use crate::configuration::DealCheckerSettings;
use crate::domain::SubscriberEmail;
use crate::email_client::EmailClient;
use anyhow::Context;
use chrono::{Duration, NaiveDate, Utc};
use sqlx::SqlitePool;

/// A stored subscription row, as read back from the database.
#[derive(Debug, sqlx::FromRow)]
pub struct Subscription {
    pub email: String,
    pub max_price: i64,
    pub min_days: i64,
    pub max_days: i64,
    pub origin_airport: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightDeal {
    pub origin: String,
    pub destination: String,
    pub price: i64,
    pub departure_date: NaiveDate,
    pub return_date: NaiveDate,
    pub trip_length: i64,
    pub booking_url: String,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub subscriptions_processed: usize,
    pub planned_api_calls: usize,
    pub emails_sent: usize,
}

/// Process every subscription in turn. A failure on one row (bad stored email,
/// delivery error) is logged and does not stop the run.
#[tracing::instrument(name = "Checking flight deals for all subscriptions", skip_all)]
pub async fn run_checks(
    pool: &SqlitePool,
    email_client: &EmailClient,
    settings: &DealCheckerSettings,
) -> Result<CheckSummary, anyhow::Error> {
    let subscriptions = fetch_all_subscriptions(pool)
        .await
        .context("Failed to read subscriptions from the database.")?;
    tracing::info!(count = subscriptions.len(), "Loaded subscriptions.");

    let mut summary = CheckSummary::default();
    if subscriptions.is_empty() {
        tracing::info!("No active subscriptions found. Nothing to check.");
        return Ok(summary);
    }

    let today = Utc::now().date_naive();
    for subscription in subscriptions {
        summary.subscriptions_processed += 1;
        let recipient = match SubscriberEmail::parse(subscription.email.clone()) {
            Ok(email) => email,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping row with an invalid stored email.");
                continue;
            }
        };

        summary.planned_api_calls +=
            log_dry_run_plan(&subscription, today, settings, recipient.as_ref());

        let deals: Vec<FlightDeal> = fabricate_deals(&subscription, today)
            .into_iter()
            .filter(|deal| deal.price <= subscription.max_price)
            .collect();
        tracing::info!(
            subscriber_email = %recipient,
            deals = deals.len(),
            "Fabricated placeholder deals within budget."
        );
        if deals.is_empty() {
            continue;
        }

        match send_deals_email(email_client, &recipient, &subscription, &deals).await {
            Ok(()) => summary.emails_sent += 1,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    subscriber_email = %recipient,
                    "Failed to send deals email."
                );
            }
        }
    }

    tracing::info!(
        subscriptions = summary.subscriptions_processed,
        planned_api_calls = summary.planned_api_calls,
        emails_sent = summary.emails_sent,
        "Finished processing all subscriptions."
    );
    Ok(summary)
}

#[tracing::instrument(name = "Reading all subscriptions", skip(pool))]
async fn fetch_all_subscriptions(pool: &SqlitePool) -> Result<Vec<Subscription>, sqlx::Error> {
    sqlx::query_as::<_, Subscription>(
        "SELECT email, max_price, min_days, max_days, origin_airport FROM subscriptions",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to execute query: {:?}", e);
        e
    })
}

/// Log each search the live integration would run, without calling anything.
/// Returns the number of planned calls.
fn log_dry_run_plan(
    subscription: &Subscription,
    today: NaiveDate,
    settings: &DealCheckerSettings,
    subscriber_email: &str,
) -> usize {
    let plan = plan_searches(
        &subscription.origin_airport,
        subscription.min_days,
        subscription.max_days,
        today,
        settings.departure_window_days,
        settings.dry_run_call_limit,
    );
    for (call, search) in plan.iter().enumerate() {
        tracing::info!(
            call = call + 1,
            engine = search.engine,
            departure_id = %search.departure_id,
            arrival_id = %search.arrival_id,
            outbound_date = %search.outbound_date,
            return_date = %search.return_date,
            currency = search.currency,
            trip_type = search.trip_type,
            "Dry run: would query the flight search API."
        );
    }
    if plan.len() >= settings.dry_run_call_limit {
        tracing::info!(
            limit = settings.dry_run_call_limit,
            subscriber_email,
            "Dry run call limit reached."
        );
    }
    plan.len()
}

/// Two synthetic deals per subscription, stand-ins for real search results:
/// one inside the price cap, one 50 dollars over it to exercise the filter.
pub fn fabricate_deals(subscription: &Subscription, today: NaiveDate) -> Vec<FlightDeal> {
    let first_departure = today + Duration::days(45);
    let second_departure = today + Duration::days(75);
    vec![
        FlightDeal {
            origin: subscription.origin_airport.clone(),
            destination: "LHR".to_string(),
            price: subscription.max_price - 30,
            departure_date: first_departure,
            return_date: first_departure + Duration::days(subscription.min_days),
            trip_length: subscription.min_days,
            booking_url: "https://www.google.com/flights".to_string(),
        },
        FlightDeal {
            origin: subscription.origin_airport.clone(),
            destination: "AMS".to_string(),
            price: subscription.max_price + 50,
            departure_date: second_departure,
            return_date: second_departure + Duration::days(subscription.max_days),
            trip_length: subscription.max_days,
            booking_url: "https://www.google.com/flights".to_string(),
        },
    ]
}

#[tracing::instrument(
    name = "Sending a deals email",
    skip(email_client, subscription, deals)
)]
async fn send_deals_email(
    email_client: &EmailClient,
    recipient: &SubscriberEmail,
    subscription: &Subscription,
    deals: &[FlightDeal],
) -> Result<(), reqwest::Error> {
    let mut deals_html = String::from("<ul>");
    let mut deals_text = String::new();
    for deal in deals {
        deals_html.push_str(&format!(
            "<li><strong>From:</strong> {origin} -> <strong>To:</strong> {destination}<br>\
<strong>Price:</strong> ${price}<br>\
<strong>Dates:</strong> {departure} to {return_date} ({trip_length} days)<br>\
<a href=\"{url}\">View Deal</a></li>",
            origin = deal.origin,
            destination = deal.destination,
            price = deal.price,
            departure = deal.departure_date,
            return_date = deal.return_date,
            trip_length = deal.trip_length,
            url = deal.booking_url,
        ));
        deals_text.push_str(&format!(
            "- {origin} -> {destination}: ${price}, {departure} to {return_date} ({trip_length} days)\n  {url}\n",
            origin = deal.origin,
            destination = deal.destination,
            price = deal.price,
            departure = deal.departure_date,
            return_date = deal.return_date,
            trip_length = deal.trip_length,
            url = deal.booking_url,
        ));
    }
    deals_html.push_str("</ul>");

    let html_body = format!(
        "<p>Hello {email},</p>\
<p>Here are the latest flight deals matching your criteria \
(Max Price: ${max_price}, Trip Length: {min_days}-{max_days} days, Origin: {origin}):</p>\
{deals_html}\
<p><small>Note: prices and availability change rapidly.</small></p>\
<p>Happy Travels!<br>- The WingingFlights Team</p>",
        email = recipient,
        max_price = subscription.max_price,
        min_days = subscription.min_days,
        max_days = subscription.max_days,
        origin = subscription.origin_airport,
    );
    let text_body = format!(
        "Hello {email},\n\n\
Flight deals matching your criteria (max ${max_price}, {min_days}-{max_days} days, from {origin}):\n\
{deals_text}\n\
Happy Travels!\n- The WingingFlights Team",
        email = recipient,
        max_price = subscription.max_price,
        min_days = subscription.min_days,
        max_days = subscription.max_days,
        origin = subscription.origin_airport,
    );

    email_client
        .send_email(
            recipient,
            "WingingFlights Deals Matching Your Criteria!",
            &html_body,
            &text_body,
        )
        .await
}
