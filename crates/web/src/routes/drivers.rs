//! Driver route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use taxi_core::{DriverId, LicenseNumber, PersonName, Username};

use crate::config::ListingConfig;
use crate::db::{DriverFilter, RepositoryError, TaxiStore};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentDriver, Driver, NewDriver};
use crate::routes::listing::{ListQuery, PageView};
use crate::routes::{RouteName, driver_detail_path, parse_id};
use crate::services::auth::{self, AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Driver row for templates.
#[derive(Debug, Clone)]
pub struct DriverView {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub license_number: String,
    pub date_joined: String,
    pub detail_url: String,
    /// Whether this is the logged-in driver.
    pub is_current: bool,
}

impl From<Driver> for DriverView {
    fn from(driver: Driver) -> Self {
        Self {
            id: driver.id.as_i32(),
            display_name: driver.display_name(),
            detail_url: driver_detail_path(driver.id),
            license_number: driver
                .license_number
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            date_joined: driver.date_joined.format("%Y-%m-%d").to_string(),
            username: driver.username.into_inner(),
            first_name: driver.first_name,
            last_name: driver.last_name,
            is_current: false,
        }
    }
}

/// Driver list page template.
#[derive(Template, WebTemplate)]
#[template(path = "taxi/driver_list.html")]
pub struct DriverListTemplate {
    pub current_driver: CurrentDriver,
    pub current_path: &'static str,
    pub driver_list: Vec<DriverView>,
    pub page: PageView,
    pub search_username: String,
}

/// Driver detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "taxi/driver_detail.html")]
pub struct DriverDetailTemplate {
    pub current_driver: CurrentDriver,
    pub current_path: &'static str,
    pub driver: DriverView,
}

/// Driver create form template.
#[derive(Template, WebTemplate)]
#[template(path = "taxi/driver_form.html")]
pub struct DriverFormTemplate {
    pub current_driver: CurrentDriver,
    pub current_path: &'static str,
    pub form: DriverForm,
    pub errors: DriverFormErrors,
}

// =============================================================================
// Form Types
// =============================================================================

/// Driver form data.
///
/// Passwords are never echoed back into the re-rendered form.
#[derive(Clone, Default, Deserialize)]
pub struct DriverForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub license_number: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
}

impl std::fmt::Debug for DriverForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverForm")
            .field("username", &self.username)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("license_number", &self.license_number)
            .field("password", &"[REDACTED]")
            .field("password_confirm", &"[REDACTED]")
            .finish()
    }
}

/// Per-field validation messages, plus a form-level message for conflicts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverFormErrors {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub license_number: Option<String>,
    pub password: Option<String>,
    pub form: Option<String>,
}

impl DriverFormErrors {
    fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl DriverForm {
    /// Validate the submitted fields.
    ///
    /// A blank license number means "none".
    ///
    /// # Errors
    ///
    /// Returns the per-field messages if any field is invalid.
    pub fn validate(&self) -> Result<NewDriver, DriverFormErrors> {
        let mut errors = DriverFormErrors::default();

        let username = Username::parse(self.username.trim())
            .map_err(|e| errors.username = Some(e.to_string()))
            .ok();

        let first_name = PersonName::parse(&self.first_name)
            .map_err(|e| errors.first_name = Some(e.to_string()))
            .ok();
        let last_name = PersonName::parse(&self.last_name)
            .map_err(|e| errors.last_name = Some(e.to_string()))
            .ok();

        let license = self.license_number.trim();
        let license_number = if license.is_empty() {
            None
        } else {
            LicenseNumber::parse(license)
                .map_err(|e| errors.license_number = Some(e.to_string()))
                .ok()
        };

        if let Err(e) = auth::validate_password(&self.password) {
            errors.password = Some(match e {
                AuthError::WeakPassword(msg) => msg,
                other => other.to_string(),
            });
        } else if self.password != self.password_confirm {
            errors.password = Some("passwords do not match".to_owned());
        }

        match (username, first_name, last_name) {
            (Some(username), Some(first_name), Some(last_name)) if errors.is_empty() => {
                Ok(NewDriver {
                    username,
                    first_name: first_name.into_inner(),
                    last_name: last_name.into_inner(),
                    license_number,
                })
            }
            _ => Err(errors),
        }
    }

    /// Copy of the form with passwords cleared, for re-rendering.
    #[must_use]
    pub fn without_passwords(self) -> Self {
        Self {
            password: String::new(),
            password_confirm: String::new(),
            ..self
        }
    }
}

// =============================================================================
// View Builders
// =============================================================================

/// Build the driver list view model.
///
/// `?username=` narrows the list using the configured search mode.
///
/// # Errors
///
/// Returns `RepositoryError` if the store query fails.
pub async fn build_driver_list(
    store: &dyn TaxiStore,
    listing: &ListingConfig,
    current_driver: CurrentDriver,
    query: &ListQuery,
) -> Result<DriverListTemplate, RepositoryError> {
    let filter = DriverFilter::new(query.username.as_deref(), listing.driver_search);
    let page = store
        .list_drivers(&filter, query.page_request(listing))
        .await?;
    let page_view = PageView::new(&page, &[("username", filter.username.as_deref())]);

    Ok(DriverListTemplate {
        current_path: RouteName::DriverList.path(),
        driver_list: page
            .into_items()
            .into_iter()
            .map(|driver| DriverView {
                is_current: driver.id == current_driver.id,
                ..DriverView::from(driver)
            })
            .collect(),
        current_driver,
        page: page_view,
        search_username: filter.username.unwrap_or_default(),
    })
}

fn form_page(
    current_driver: CurrentDriver,
    form: DriverForm,
    errors: DriverFormErrors,
    status: StatusCode,
) -> Result<Response, AppError> {
    let template = DriverFormTemplate {
        current_driver,
        current_path: RouteName::DriverList.path(),
        form: form.without_passwords(),
        errors,
    };
    Ok((status, Html(template.render()?)).into_response())
}

// =============================================================================
// Handlers
// =============================================================================

/// Driver list page handler.
#[instrument(skip(driver, state))]
pub async fn list(
    RequireAuth(driver): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<DriverListTemplate, AppError> {
    Ok(build_driver_list(state.store(), state.listing(), driver, &query).await?)
}

/// Driver detail page handler.
#[instrument(skip(driver, state))]
pub async fn detail(
    RequireAuth(driver): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<DriverDetailTemplate, AppError> {
    let id: DriverId = parse_id(&id, "driver")?;
    let found = state
        .store()
        .get_driver(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("driver {id}")))?;

    Ok(DriverDetailTemplate {
        current_path: RouteName::DriverList.path(),
        driver: DriverView {
            is_current: found.id == driver.id,
            ..DriverView::from(found)
        },
        current_driver: driver,
    })
}

/// New driver form handler.
#[instrument(skip(driver))]
pub async fn new_form(RequireAuth(driver): RequireAuth) -> DriverFormTemplate {
    DriverFormTemplate {
        current_driver: driver,
        current_path: RouteName::DriverList.path(),
        form: DriverForm::default(),
        errors: DriverFormErrors::default(),
    }
}

/// Create driver handler.
#[instrument(skip(driver, state, form))]
pub async fn create(
    RequireAuth(driver): RequireAuth,
    State(state): State<AppState>,
    Form(form): Form<DriverForm>,
) -> Result<Response, AppError> {
    let new = match form.validate() {
        Ok(new) => new,
        Err(errors) => {
            return form_page(driver, form, errors, StatusCode::UNPROCESSABLE_ENTITY);
        }
    };

    let auth = AuthService::new(state.store());
    let result = auth.register_driver(&new, &form.password).await;
    match result {
        Ok(created) => Ok(Redirect::to(&driver_detail_path(created.id)).into_response()),
        Err(AuthError::AlreadyExists(message)) => {
            let errors = DriverFormErrors {
                form: Some(message),
                ..DriverFormErrors::default()
            };
            form_page(driver, form, errors, StatusCode::CONFLICT)
        }
        Err(AuthError::WeakPassword(message)) => {
            let errors = DriverFormErrors {
                password: Some(message),
                ..DriverFormErrors::default()
            };
            form_page(driver, form, errors, StatusCode::UNPROCESSABLE_ENTITY)
        }
        Err(e) => Err(e.into()),
    }
}
