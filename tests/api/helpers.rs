//! tests/api/helpers.rs
use sqlx::SqlitePool;
use std::sync::LazyLock;
use uuid::Uuid;
use wiremock::MockServer;
use wingingflights::configuration::{DealCheckerSettings, get_configuration};
use wingingflights::startup::{Application, get_connection_pool};
use wingingflights::telemetry::{get_subscriber, init_subscriber};

static TRACING: LazyLock<()> = LazyLock::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber("test".into(), "debug".into(), std::io::sink);
        init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub address: String,
    pub db_pool: SqlitePool,
    pub email_server: MockServer,
    api_client: reqwest::Client,
}

impl TestApp {
    pub async fn post_subscribe(&self, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(format!("{}/subscribe", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_health_check(&self) -> reqwest::Response {
        self.api_client
            .get(format!("{}/health_check", self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_home_html(&self) -> String {
        self.api_client
            .get(format!("{}/", self.address))
            .send()
            .await
            .expect("Failed to execute request.")
            .text()
            .await
            .unwrap()
    }
}

#[allow(clippy::let_underscore_future)]
pub async fn spawn_app() -> TestApp {
    LazyLock::force(&TRACING);
    let email_server = MockServer::start().await;

    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration.");
        // One throwaway database file per test.
        c.database.database_path = std::env::temp_dir()
            .join(format!("wingingflights-test-{}.db", Uuid::new_v4()))
            .to_str()
            .unwrap()
            .to_string();
        c.application.port = 0;
        c.email_client.base_url = email_server.uri();
        c
    };

    let app = Application::build(&configuration)
        .await
        .expect("Failed to build application server.");
    let address = format!("http://127.0.0.1:{}", app.port());

    let db_pool = get_connection_pool(&configuration.database)
        .await
        .expect("Failed to connect to the test database.");

    let _ = tokio::spawn(app.run_until_stopped());

    let api_client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        address,
        db_pool,
        email_server,
        api_client,
    }
}

pub fn valid_subscription_body() -> serde_json::Value {
    serde_json::json!({
        "email": "ursula_le_guin@gmail.com",
        "max_price": 400,
        "min_days": 5,
        "max_days": 12,
        "origin_airport": "SFO"
    })
}

pub fn deal_checker_settings() -> DealCheckerSettings {
    DealCheckerSettings {
        dry_run_call_limit: 10,
        departure_window_days: 3,
    }
}

pub async fn insert_subscription(
    pool: &SqlitePool,
    email: &str,
    max_price: i64,
    min_days: i64,
    max_days: i64,
    origin_airport: &str,
) {
    sqlx::query(
        "INSERT INTO subscriptions (email, max_price, min_days, max_days, origin_airport, subscribed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(email)
    .bind(max_price)
    .bind(min_days)
    .bind(max_days)
    .bind(origin_airport)
    .bind(chrono::Utc::now())
    .execute(pool)
    .await
    .expect("Failed to insert test subscription.");
}
