//! Login, logout, and per-session state.

use reqwest::StatusCode;
use taxi_integration_tests::{PASSWORD, TestApp, location};

#[tokio::test]
async fn test_login_redirects_to_next() {
    let app = TestApp::spawn().await;
    app.add_driver("driver1", None).await;

    let response = app
        .post_form(
            "/accounts/login/",
            &[
                ("username", "driver1"),
                ("password", PASSWORD),
                ("next", "/cars/?page=2"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/cars/?page=2");

    let (status, body) = app.get_page("/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"data-template="taxi/index.html""#));
    assert!(body.contains(r#"<span class="nav-user">driver1</span>"#));
}

#[tokio::test]
async fn test_login_ignores_offsite_next() {
    let app = TestApp::spawn().await;
    app.add_driver("driver1", None).await;

    let response = app
        .post_form(
            "/accounts/login/",
            &[
                ("username", "driver1"),
                ("password", PASSWORD),
                ("next", "//evil.example.com/"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_wrong_password_rerenders_form() {
    let app = TestApp::spawn().await;
    app.add_driver("driver1", None).await;

    let response = app.login("driver1", "not-the-password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response.text().await.expect("body");
    assert!(body.contains("Please enter a correct username and password."));
    assert!(body.contains(r#"value="driver1""#));

    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_unknown_and_malformed_usernames_fail_alike() {
    let app = TestApp::spawn().await;

    for username in ["nobody", "not a username!"] {
        let response = app.login(username, PASSWORD).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{username}");
    }
}

#[tokio::test]
async fn test_logged_in_driver_skips_login_page() {
    let app = TestApp::spawn().await;
    app.login_as("driver1").await;

    let response = app.get("/accounts/login/?next=/drivers/").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/drivers/");
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::spawn().await;
    app.login_as("driver1").await;
    assert_eq!(app.get("/").await.status(), StatusCode::OK);

    let response = app.post_form("/accounts/logout/", &[]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/accounts/login/");

    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_visit_counter_is_per_session() {
    let mut app = TestApp::spawn().await;
    app.login_as("driver1").await;

    for expected in 1..=3 {
        let (_, body) = app.get_page("/").await;
        assert!(
            body.contains(&format!(r#"<span id="num-visits">{expected}</span>"#)),
            "visit {expected}"
        );
    }

    // Other pages leave the counter alone
    app.get_page("/drivers/").await;
    let (_, body) = app.get_page("/").await;
    assert!(body.contains(r#"<span id="num-visits">4</span>"#));

    // A fresh browser starts over
    app.reset_client();
    let response = app.login("driver1", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let (_, body) = app.get_page("/").await;
    assert!(body.contains(r#"<span id="num-visits">1</span>"#));
}

#[tokio::test]
async fn test_index_counts_records() {
    let app = TestApp::spawn().await;
    let toyota = app.add_manufacturer("Toyota", "Japan").await;
    app.add_manufacturer("Ford", "USA").await;
    app.add_car("Corolla", toyota.id).await;
    app.login_as("driver1").await;
    app.add_driver("driver2", None).await;

    let (status, body) = app.get_page("/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"<span id="num-manufacturers">2</span>"#));
    assert!(body.contains(r#"<span id="num-cars">1</span>"#));
    assert!(body.contains(r#"<span id="num-drivers">2</span>"#));
}
