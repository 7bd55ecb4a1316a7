use crate::helpers::{deal_checker_settings, insert_subscription, spawn_app};
use secrecy::Secret;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, ResponseTemplate};
use wingingflights::deal_checker::run_checks;
use wingingflights::domain::SubscriberEmail;
use wingingflights::email_client::EmailClient;

fn email_client(base_url: String) -> EmailClient {
    EmailClient::new(
        base_url,
        SubscriberEmail::parse("deals@wingingflights.com".to_string()).unwrap(),
        Secret::new("token".to_string()),
        std::time::Duration::from_millis(500),
    )
}

#[tokio::test]
async fn run_checks_without_subscriptions_sends_no_emails() {
    // Arrange
    let test_app = spawn_app().await;
    let email_client = email_client(test_app.email_server.uri());

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test_app.email_server)
        .await;

    // Act
    let summary = run_checks(&test_app.db_pool, &email_client, &deal_checker_settings())
        .await
        .expect("run_checks failed.");

    // Assert
    assert_eq!(summary.subscriptions_processed, 0);
    assert_eq!(summary.planned_api_calls, 0);
    assert_eq!(summary.emails_sent, 0);
}

#[tokio::test]
async fn run_checks_sends_one_deals_email_per_subscription() {
    let test_app = spawn_app().await;
    let email_client = email_client(test_app.email_server.uri());

    insert_subscription(&test_app.db_pool, "a@example.com", 400, 5, 12, "SFO").await;
    insert_subscription(&test_app.db_pool, "b@example.com", 650, 3, 7, "BOS").await;

    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&test_app.email_server)
        .await;

    let summary = run_checks(&test_app.db_pool, &email_client, &deal_checker_settings())
        .await
        .expect("run_checks failed.");

    assert_eq!(summary.subscriptions_processed, 2);
    assert_eq!(summary.emails_sent, 2);
}

#[tokio::test]
async fn the_deals_email_only_lists_deals_within_budget() {
    let test_app = spawn_app().await;
    let email_client = email_client(test_app.email_server.uri());

    insert_subscription(&test_app.db_pool, "a@example.com", 400, 5, 12, "SFO").await;

    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&test_app.email_server)
        .await;

    run_checks(&test_app.db_pool, &email_client, &deal_checker_settings())
        .await
        .expect("run_checks failed.");

    let email_request = &test_app.email_server.received_requests().await.unwrap()[0];
    let body: serde_json::Value = serde_json::from_slice(&email_request.body).unwrap();
    assert_eq!(body["To"].as_str().unwrap(), "a@example.com");
    let html = body["HtmlBody"].as_str().unwrap();
    // The LHR deal is priced 30 under the cap, the AMS one 50 over it.
    assert!(html.contains("LHR"));
    assert!(html.contains("$370"));
    assert!(!html.contains("AMS"));
}

#[tokio::test]
async fn the_dry_run_is_capped_at_the_configured_call_limit() {
    let test_app = spawn_app().await;
    let email_client = email_client(test_app.email_server.uri());

    // 20 destinations x 2 offsets x 8 lengths would be 320 calls uncapped.
    insert_subscription(&test_app.db_pool, "a@example.com", 400, 5, 12, "SFO").await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .mount(&test_app.email_server)
        .await;

    let settings = deal_checker_settings();
    let summary = run_checks(&test_app.db_pool, &email_client, &settings)
        .await
        .expect("run_checks failed.");

    assert_eq!(summary.planned_api_calls, settings.dry_run_call_limit);
}

#[tokio::test]
async fn a_row_with_an_invalid_stored_email_is_skipped() {
    let test_app = spawn_app().await;
    let email_client = email_client(test_app.email_server.uri());

    insert_subscription(&test_app.db_pool, "not-an-email", 400, 5, 12, "SFO").await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test_app.email_server)
        .await;

    let summary = run_checks(&test_app.db_pool, &email_client, &deal_checker_settings())
        .await
        .expect("run_checks failed.");

    assert_eq!(summary.subscriptions_processed, 1);
    assert_eq!(summary.planned_api_calls, 0);
    assert_eq!(summary.emails_sent, 0);
}

#[tokio::test]
async fn a_delivery_failure_does_not_abort_the_run() {
    let test_app = spawn_app().await;
    let email_client = email_client(test_app.email_server.uri());

    insert_subscription(&test_app.db_pool, "a@example.com", 400, 5, 12, "SFO").await;
    insert_subscription(&test_app.db_pool, "b@example.com", 650, 3, 7, "BOS").await;

    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&test_app.email_server)
        .await;

    let summary = run_checks(&test_app.db_pool, &email_client, &deal_checker_settings())
        .await
        .expect("run_checks failed.");

    assert_eq!(summary.subscriptions_processed, 2);
    assert_eq!(summary.emails_sent, 0);
}
