use crate::helpers::spawn_app;

#[tokio::test]
async fn health_check_works() {
    // Arrange
    let test_app = spawn_app().await;

    // Act
    let response = test_app.get_health_check().await;

    // Assert
    assert!(response.status().is_success());
    assert_eq!(Some(0), response.content_length());
}

#[tokio::test]
async fn the_home_page_serves_the_subscription_form() {
    let test_app = spawn_app().await;

    let html = test_app.get_home_html().await;

    assert!(html.contains("flight-form"));
    assert!(html.contains("origin_airport"));
}
