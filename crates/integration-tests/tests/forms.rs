//! Create, delete, and detail pages.

use reqwest::StatusCode;
use taxi_core::PageRequest;
use taxi_integration_tests::{PASSWORD, TestApp, count, location};
use taxi_web::db::{CarFilter, TaxiStore as _};

#[tokio::test]
async fn test_create_manufacturer() {
    let app = TestApp::spawn().await;
    app.login_as("driver1").await;

    let (status, body) = app.get_page("/manufacturers/create/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"data-template="taxi/manufacturer_form.html""#));

    let response = app
        .post_form(
            "/manufacturers/create/",
            &[("name", "  Toyota "), ("country", "Japan")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/manufacturers/");

    let (_, body) = app.get_page("/manufacturers/").await;
    assert_eq!(count(&body, r#"class="manufacturer-row""#), 1);
    assert!(body.contains("<td>Toyota</td>"));
}

#[tokio::test]
async fn test_invalid_manufacturer_rerenders_form() {
    let app = TestApp::spawn().await;
    app.login_as("driver1").await;

    let response = app
        .post_form("/manufacturers/create/", &[("name", "   "), ("country", "Japan")])
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.text().await.expect("body");
    assert!(body.contains(r#"class="field-error""#));
    assert!(body.contains(r#"value="Japan""#));

    assert_eq!(app.store().counts().await.expect("counts").manufacturers, 0);
}

#[tokio::test]
async fn test_delete_manufacturer_removes_its_cars() {
    let app = TestApp::spawn().await;
    let toyota = app.add_manufacturer("Toyota", "Japan").await;
    let ford = app.add_manufacturer("Ford", "USA").await;
    app.add_car("Corolla", toyota.id).await;
    app.add_car("Camry", toyota.id).await;
    app.add_car("Focus", ford.id).await;
    app.login_as("driver1").await;

    let response = app
        .post_form(&format!("/manufacturers/{}/delete/", toyota.id), &[])
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/manufacturers/");

    let counts = app.store().counts().await.expect("counts");
    assert_eq!((counts.manufacturers, counts.cars), (1, 1));

    let cars = app
        .store()
        .list_cars(&CarFilter::default(), PageRequest::default())
        .await
        .expect("cars");
    let models: Vec<&str> = cars.items().iter().map(|car| car.model.as_str()).collect();
    assert_eq!(models, ["Focus"]);
}

#[tokio::test]
async fn test_delete_unknown_manufacturer_is_not_found() {
    let app = TestApp::spawn().await;
    app.login_as("driver1").await;

    let response = app.post_form("/manufacturers/999/delete/", &[]).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.post_form("/manufacturers/abc/delete/", &[]).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_car() {
    let app = TestApp::spawn().await;
    let toyota = app.add_manufacturer("Toyota", "Japan").await;
    app.login_as("driver1").await;

    let (status, body) = app.get_page("/cars/create/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"data-template="taxi/car_form.html""#));
    assert!(body.contains("Toyota"));

    let manufacturer_id = toyota.id.to_string();
    let response = app
        .post_form(
            "/cars/create/",
            &[("model", "Corolla"), ("manufacturer_id", &manufacturer_id)],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/cars/");

    let (_, body) = app.get_page("/cars/").await;
    assert!(body.contains("Corolla</a> (Toyota)"));
}

#[tokio::test]
async fn test_create_car_with_unknown_manufacturer() {
    let app = TestApp::spawn().await;
    app.login_as("driver1").await;

    let response = app
        .post_form(
            "/cars/create/",
            &[("model", "Corolla"), ("manufacturer_id", "42")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.text().await.expect("body");
    assert!(body.contains("select a valid manufacturer"));
    assert_eq!(app.store().counts().await.expect("counts").cars, 0);
}

#[tokio::test]
async fn test_car_detail() {
    let app = TestApp::spawn().await;
    let toyota = app.add_manufacturer("Toyota", "Japan").await;
    let car = app.add_car("Corolla", toyota.id).await;
    app.login_as("driver1").await;

    let (status, body) = app.get_page(&format!("/cars/{}/", car.id)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"data-template="taxi/car_detail.html""#));
    assert!(body.contains("<h1>Corolla</h1>"));
    assert!(body.contains("Toyota (Japan)"));

    let (status, _) = app.get_page("/cars/999/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_driver_and_log_in_as_them() {
    let mut app = TestApp::spawn().await;
    app.login_as("driver1").await;

    let response = app
        .post_form(
            "/drivers/create/",
            &[
                ("username", "newdriver"),
                ("first_name", "New"),
                ("last_name", "Driver"),
                ("license_number", "XYZ98765"),
                ("password", PASSWORD),
                ("password_confirm", PASSWORD),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let detail = location(&response).to_owned();
    assert!(detail.starts_with("/drivers/"));

    let (status, body) = app.get_page(&detail).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"data-template="taxi/driver_detail.html""#));
    assert!(body.contains("<h1>newdriver</h1>"));
    assert!(body.contains(r#"<dd class="license-number">XYZ98765</dd>"#));

    app.reset_client();
    let response = app.login("newdriver", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_driver_without_license_shows_dash() {
    let app = TestApp::spawn().await;
    let driver = app.login_as("driver1").await;

    let (_, body) = app.get_page(&format!("/drivers/{}/", driver.id)).await;
    assert!(body.contains(r#"<dd class="license-number">-</dd>"#));
}

#[tokio::test]
async fn test_duplicate_driver_is_conflict() {
    let app = TestApp::spawn().await;
    app.add_driver("taken", Some("ABC12345")).await;
    app.login_as("driver1").await;

    for (username, license, message) in [
        ("taken", "", "username already exists"),
        ("fresh", "ABC12345", "license number already exists"),
    ] {
        let response = app
            .post_form(
                "/drivers/create/",
                &[
                    ("username", username),
                    ("license_number", license),
                    ("password", PASSWORD),
                    ("password_confirm", PASSWORD),
                ],
            )
            .await;
        assert_eq!(response.status(), StatusCode::CONFLICT, "{username}");
        let body = response.text().await.expect("body");
        assert!(body.contains(message), "{username}");
    }

    assert_eq!(app.store().counts().await.expect("counts").drivers, 2);
}

#[tokio::test]
async fn test_invalid_driver_form() {
    let app = TestApp::spawn().await;
    app.login_as("driver1").await;

    for form in [
        [("username", "bad name!"), ("license_number", ""), ("password", PASSWORD), ("password_confirm", PASSWORD)],
        [("username", "ok"), ("license_number", "abc12345"), ("password", PASSWORD), ("password_confirm", PASSWORD)],
        [("username", "ok"), ("license_number", ""), ("password", "short"), ("password_confirm", "short")],
        [("username", "ok"), ("license_number", ""), ("password", PASSWORD), ("password_confirm", "different-123")],
    ] {
        let response = app.post_form("/drivers/create/", &form).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{form:?}");
        let body = response.text().await.expect("body");
        assert!(body.contains(r#"class="field-error""#), "{form:?}");
        assert!(!body.contains(PASSWORD), "passwords are not echoed back");
    }

    assert_eq!(app.store().counts().await.expect("counts").drivers, 1);
}

#[tokio::test]
async fn test_overlong_driver_name_is_rejected() {
    let app = TestApp::spawn().await;
    app.login_as("driver1").await;

    let long = "x".repeat(200);
    for field in ["first_name", "last_name"] {
        let form = [
            ("username", "driver9"),
            (field, long.as_str()),
            ("license_number", ""),
            ("password", PASSWORD),
            ("password_confirm", PASSWORD),
        ];
        let response = app.post_form("/drivers/create/", &form).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{field}");
        let body = response.text().await.expect("body");
        assert!(body.contains("must be at most 150 characters"), "{field}");
    }

    assert_eq!(app.store().counts().await.expect("counts").drivers, 1);
}
