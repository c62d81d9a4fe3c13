//! Integration tests for the taxi service.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p taxi-integration-tests
//! ```
//!
//! Each test spawns the full router (sessions, auth gate, templates) on an
//! ephemeral port, backed by in-memory stores, and talks to it over HTTP
//! with a cookie-keeping `reqwest` client. No database is needed.
//!
//! # Test Categories
//!
//! - `access_gate` - Anonymous requests are sent to the login page
//! - `auth_flow` - Login, logout, and the visit counter
//! - `list_views` - Templates, context, pagination, and search
//! - `forms` - Create, delete, and detail pages

use reqwest::{Client, Response, StatusCode, header::LOCATION, redirect::Policy};
use tokio::net::TcpListener;
use tower_sessions::MemoryStore;

use taxi_core::{LicenseNumber, ManufacturerId, TextField, Username};
use taxi_web::config::{ListingConfig, WebConfig};
use taxi_web::db::{InMemoryStore, TaxiStore};
use taxi_web::middleware::create_session_layer;
use taxi_web::models::{Car, Driver, Manufacturer, NewCar, NewDriver, NewManufacturer};
use taxi_web::services::auth::AuthService;
use taxi_web::{AppState, build_router};

/// Password given to every driver created through [`TestApp::add_driver`].
pub const PASSWORD: &str = "test-password-123";

/// A running application and a client with its own cookie jar.
pub struct TestApp {
    base_url: String,
    client: Client,
    state: AppState,
}

impl TestApp {
    /// Spawn the application with default listing settings.
    pub async fn spawn() -> Self {
        Self::spawn_with(ListingConfig::default()).await
    }

    /// Spawn the application with the given listing settings.
    pub async fn spawn_with(listing: ListingConfig) -> Self {
        let mut config = WebConfig::from_lookup(|key| match key {
            "TAXI_STORE" => Some("memory".to_owned()),
            _ => None,
        })
        .expect("Failed to build test configuration");
        config.listing = listing;

        let state = AppState::new(config.clone(), InMemoryStore::new());
        let session_layer = create_session_layer(MemoryStore::default(), &config);
        let app = build_router(state.clone(), session_layer);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Test server error");
        });

        Self {
            base_url: format!("http://{addr}"),
            client: new_client(),
            state,
        }
    }

    /// The store behind the running application.
    pub fn store(&self) -> &dyn TaxiStore {
        self.state.store()
    }

    /// Forget all cookies, as a new browser would.
    pub fn reset_client(&mut self) {
        self.client = new_client();
    }

    /// Absolute URL for a path on the test server.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET a path without following redirects.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// GET a path and return the status and body.
    pub async fn get_page(&self, path: &str) -> (StatusCode, String) {
        let response = self.get(path).await;
        let status = response.status();
        let body = response.text().await.expect("Failed to read body");
        (status, body)
    }

    /// POST an urlencoded form without following redirects.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request failed")
    }

    /// Submit the login form.
    pub async fn login(&self, username: &str, password: &str) -> Response {
        self.post_form(
            "/accounts/login/",
            &[("username", username), ("password", password)],
        )
        .await
    }

    /// Create a driver and log in as them.
    pub async fn login_as(&self, username: &str) -> Driver {
        let driver = self.add_driver(username, None).await;
        let response = self.login(username, PASSWORD).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "login failed");
        driver
    }

    /// Insert a manufacturer directly into the store.
    pub async fn add_manufacturer(&self, name: &str, country: &str) -> Manufacturer {
        let new = NewManufacturer {
            name: TextField::parse(name).expect("invalid manufacturer name"),
            country: TextField::parse(country).expect("invalid country"),
        };
        self.store()
            .create_manufacturer(&new)
            .await
            .expect("Failed to create manufacturer")
    }

    /// Insert a car directly into the store.
    pub async fn add_car(&self, model: &str, manufacturer_id: ManufacturerId) -> Car {
        let new = NewCar {
            model: TextField::parse(model).expect("invalid model"),
            manufacturer_id,
        };
        self.store()
            .create_car(&new)
            .await
            .expect("Failed to create car")
    }

    /// Register a driver with [`PASSWORD`].
    pub async fn add_driver(&self, username: &str, license_number: Option<&str>) -> Driver {
        let new = NewDriver {
            username: Username::parse(username).expect("invalid username"),
            first_name: String::new(),
            last_name: String::new(),
            license_number: license_number
                .map(|value| LicenseNumber::parse(value).expect("invalid license number")),
        };
        AuthService::new(self.store())
            .register_driver(&new, PASSWORD)
            .await
            .expect("Failed to register driver")
    }
}

/// The `Location` header of a redirect response.
pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("response has no Location header")
}

/// Count occurrences of `needle` in `haystack`.
pub fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

fn new_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}
