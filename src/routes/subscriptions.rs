//! src/routes/subscriptions.rs
use crate::domain::{
    AirportCode, MaxPrice, NewSubscription, SearchCriteria, SubscriberEmail, TripLengthRange,
};
use crate::email_client::EmailClient;
use crate::routes::error_chain_fmt;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, web};
use anyhow::Context;
use chrono::Utc;
use sqlx::SqlitePool;

#[derive(serde::Deserialize, Debug)]
pub struct SubscribePayload {
    email: String,
    max_price: i64,
    min_days: i64,
    max_days: i64,
    origin_airport: String,
}

impl TryFrom<SubscribePayload> for NewSubscription {
    type Error = String;

    fn try_from(payload: SubscribePayload) -> Result<Self, Self::Error> {
        let email = SubscriberEmail::parse(payload.email)?;
        let max_price = MaxPrice::parse(payload.max_price)?;
        let trip_length = TripLengthRange::parse(payload.min_days, payload.max_days)?;
        let origin = AirportCode::parse(payload.origin_airport)?;
        Ok(NewSubscription {
            email,
            criteria: SearchCriteria {
                max_price,
                trip_length,
                origin,
            },
        })
    }
}

#[derive(thiserror::Error)]
pub enum SubscribeError {
    #[error("{0}")]
    ValidationError(String),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for SubscribeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SubscribeError {
    fn status_code(&self) -> StatusCode {
        match self {
            SubscribeError::ValidationError(_) => StatusCode::BAD_REQUEST,
            SubscribeError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}

#[tracing::instrument(
    name = "Adding a new subscription",
    skip(payload, pool, email_client),
    fields(
        subscriber_email = %payload.email,
        origin_airport = %payload.origin_airport
    )
)]
pub async fn subscribe(
    payload: web::Json<SubscribePayload>,
    pool: web::Data<SqlitePool>,
    email_client: web::Data<EmailClient>,
) -> Result<HttpResponse, SubscribeError> {
    let new_subscription: NewSubscription = payload
        .into_inner()
        .try_into()
        .map_err(SubscribeError::ValidationError)?;
    upsert_subscription(&pool, &new_subscription)
        .await
        .context("Failed to store the subscription criteria.")?;

    // Delivery problems are reported in the response body but never fail the
    // request; the criteria are already saved at this point.
    let mut message = format!("Successfully subscribed {}.", new_subscription.email);
    match send_confirmation_email(&email_client, &new_subscription).await {
        Ok(()) => message.push_str(" Check your inbox for confirmation."),
        Err(e) => {
            tracing::warn!(
                error = %e,
                subscriber_email = %new_subscription.email,
                "Failed to send confirmation email."
            );
            message.push_str(" (Confirmation email failed to send.)");
        }
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": message })))
}

#[tracing::instrument(
    name = "Saving subscription criteria in the database",
    skip(pool, new_subscription)
)]
async fn upsert_subscription(
    pool: &SqlitePool,
    new_subscription: &NewSubscription,
) -> Result<(), sqlx::Error> {
    let criteria = &new_subscription.criteria;
    // Last write wins: a resubmission replaces the whole row, timestamp included.
    sqlx::query(
        r#"
INSERT INTO subscriptions (email, max_price, min_days, max_days, origin_airport, subscribed_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
ON CONFLICT (email) DO UPDATE SET
    max_price = excluded.max_price,
    min_days = excluded.min_days,
    max_days = excluded.max_days,
    origin_airport = excluded.origin_airport,
    subscribed_at = excluded.subscribed_at
"#,
    )
    .bind(new_subscription.email.as_ref())
    .bind(criteria.max_price.dollars())
    .bind(criteria.trip_length.min_days())
    .bind(criteria.trip_length.max_days())
    .bind(criteria.origin.as_ref())
    .bind(Utc::now())
    .execute(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to execute query: {:?}", e);
        e
    })?;
    Ok(())
}

#[tracing::instrument(
    name = "Sending a confirmation email",
    skip(email_client, new_subscription)
)]
async fn send_confirmation_email(
    email_client: &EmailClient,
    new_subscription: &NewSubscription,
) -> Result<(), reqwest::Error> {
    let criteria = &new_subscription.criteria;
    let html_body = format!(
        "<p>Hello {email},</p>\
<p>Thanks for subscribing to WingingFlights! This email confirms the criteria we have saved:</p>\
<ul>\
<li><strong>Max Price:</strong> ${max_price}</li>\
<li><strong>Min Trip Days:</strong> {min_days}</li>\
<li><strong>Max Trip Days:</strong> {max_days}</li>\
<li><strong>Departure Airport:</strong> {origin}</li>\
</ul>\
<p>You will receive emails whenever deals matching these criteria are found. \
Need to change your criteria? Simply submit the form again with updated values.</p>\
<p>Happy Travels!<br>- The WingingFlights Team</p>",
        email = new_subscription.email,
        max_price = criteria.max_price.dollars(),
        min_days = criteria.trip_length.min_days(),
        max_days = criteria.trip_length.max_days(),
        origin = criteria.origin,
    );
    let text_body = format!(
        "Hello {email},\n\n\
Thanks for subscribing to WingingFlights! Your saved criteria:\n\
- Max price: ${max_price}\n\
- Trip length: {min_days} to {max_days} days\n\
- Departure airport: {origin}\n\n\
Submit the form again at any time to update them.\n\n\
Happy Travels!\n- The WingingFlights Team",
        email = new_subscription.email,
        max_price = criteria.max_price.dollars(),
        min_days = criteria.trip_length.min_days(),
        max_days = criteria.trip_length.max_days(),
        origin = criteria.origin,
    );
    email_client
        .send_email(
            &new_subscription.email,
            "WingingFlights Subscription Confirmed!",
            &html_body,
            &text_body,
        )
        .await
}
