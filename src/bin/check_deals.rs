//! src/bin/check_deals.rs
//!
//! One-shot batch job, intended to be run periodically (e.g. from cron).
use wingingflights::configuration::get_configuration;
use wingingflights::deal_checker::run_checks;
use wingingflights::email_client::EmailClient;
use wingingflights::startup::get_connection_pool;
use wingingflights::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = get_subscriber("check_deals".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let configuration = get_configuration().expect("Failed to read configuration file.");
    let connection_pool = get_connection_pool(&configuration.database).await?;
    sqlx::migrate!("./migrations").run(&connection_pool).await?;

    let sender_email = configuration
        .email_client
        .sender()
        .expect("Failed to parse the sender email address.");
    let email_client = EmailClient::new(
        configuration.email_client.base_url.clone(),
        sender_email,
        configuration.email_client.authorization_token.clone(),
        configuration.email_client.timeout(),
    );

    run_checks(&connection_pool, &email_client, &configuration.deal_checker).await?;
    Ok(())
}
