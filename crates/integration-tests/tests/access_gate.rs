//! Anonymous requests are redirected to the login page.

use reqwest::StatusCode;
use taxi_integration_tests::{TestApp, location};
use taxi_web::db::TaxiStore as _;

#[tokio::test]
async fn test_protected_pages_redirect_to_login() {
    let app = TestApp::spawn().await;

    for (path, encoded) in [
        ("/", "%2F"),
        ("/manufacturers/", "%2Fmanufacturers%2F"),
        ("/cars/", "%2Fcars%2F"),
        ("/drivers/", "%2Fdrivers%2F"),
        ("/drivers/create/", "%2Fdrivers%2Fcreate%2F"),
        ("/cars/1/", "%2Fcars%2F1%2F"),
    ] {
        let response = app.get(path).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(
            location(&response),
            format!("/accounts/login/?next={encoded}"),
            "{path}"
        );
    }
}

#[tokio::test]
async fn test_redirect_keeps_query_string() {
    let app = TestApp::spawn().await;

    let response = app.get("/drivers/?page=2").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/accounts/login/?next=%2Fdrivers%2F%3Fpage%3D2"
    );
}

#[tokio::test]
async fn test_anonymous_post_is_rejected() {
    let app = TestApp::spawn().await;
    let manufacturer = app.add_manufacturer("Toyota", "Japan").await;

    let response = app
        .post_form(&format!("/manufacturers/{}/delete/", manufacturer.id), &[])
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/accounts/login/"));

    let counts = app.store().counts().await.expect("counts");
    assert_eq!(counts.manufacturers, 1);
}

#[tokio::test]
async fn test_login_page_and_health_are_public() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get_page("/accounts/login/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"data-template="registration/login.html""#));

    let (status, body) = app.get_page("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");

    let (status, _) = app.get_page("/health/ready").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_security_and_request_id_headers() {
    let app = TestApp::spawn().await;

    let response = app.get("/accounts/login/").await;
    let headers = response.headers();
    assert_eq!(
        headers.get("x-content-type-options").map(|v| v.as_bytes()),
        Some(&b"nosniff"[..])
    );
    assert!(headers.contains_key("content-security-policy"));
    assert!(headers.contains_key("x-request-id"));
}
