//! Car route handlers.

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

use taxi_core::{CarId, ManufacturerId, TextField};

use crate::config::ListingConfig;
use crate::db::{CarFilter, RepositoryError, TaxiStore};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{Car, CurrentDriver, Manufacturer, NewCar};
use crate::routes::listing::{ListQuery, PageView};
use crate::routes::{RouteName, car_detail_path, parse_id};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Car row for templates.
#[derive(Debug, Clone)]
pub struct CarView {
    pub id: i32,
    pub model: String,
    pub manufacturer_name: String,
    pub manufacturer_country: String,
    pub detail_url: String,
}

impl From<Car> for CarView {
    fn from(car: Car) -> Self {
        Self {
            id: car.id.as_i32(),
            detail_url: car_detail_path(car.id),
            model: car.model,
            manufacturer_name: car.manufacturer.name,
            manufacturer_country: car.manufacturer.country,
        }
    }
}

/// Manufacturer choice in the car form.
#[derive(Debug, Clone)]
pub struct ManufacturerOption {
    pub id: i32,
    pub label: String,
    pub selected: bool,
}

/// Car list page template.
#[derive(Template, WebTemplate)]
#[template(path = "taxi/car_list.html")]
pub struct CarListTemplate {
    pub current_driver: CurrentDriver,
    pub current_path: &'static str,
    pub car_list: Vec<CarView>,
    pub page: PageView,
    pub search_model: String,
}

/// Car detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "taxi/car_detail.html")]
pub struct CarDetailTemplate {
    pub current_driver: CurrentDriver,
    pub current_path: &'static str,
    pub car: CarView,
}

/// Car create form template.
#[derive(Template, WebTemplate)]
#[template(path = "taxi/car_form.html")]
pub struct CarFormTemplate {
    pub current_driver: CurrentDriver,
    pub current_path: &'static str,
    pub form: CarForm,
    pub manufacturers: Vec<ManufacturerOption>,
    pub errors: CarFormErrors,
}

// =============================================================================
// Form Types
// =============================================================================

/// Car form data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CarForm {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub manufacturer_id: String,
}

/// Per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarFormErrors {
    pub model: Option<String>,
    pub manufacturer_id: Option<String>,
}

impl CarFormErrors {
    const UNKNOWN_MANUFACTURER: &'static str = "select a valid manufacturer";
}

impl CarForm {
    /// Validate the submitted fields.
    ///
    /// The manufacturer is only checked for shape here; the store rejects
    /// IDs that do not exist.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages if any field is invalid.
    pub fn validate(&self) -> Result<NewCar, CarFormErrors> {
        let model = TextField::parse(&self.model);
        let manufacturer_id = self
            .manufacturer_id
            .trim()
            .parse::<i32>()
            .map(ManufacturerId::new);

        match (model, manufacturer_id) {
            (Ok(model), Ok(manufacturer_id)) => Ok(NewCar {
                model,
                manufacturer_id,
            }),
            (model, manufacturer_id) => Err(CarFormErrors {
                model: model.err().map(|e| e.to_string()),
                manufacturer_id: manufacturer_id
                    .err()
                    .map(|_| CarFormErrors::UNKNOWN_MANUFACTURER.to_owned()),
            }),
        }
    }
}

fn manufacturer_options(manufacturers: Vec<Manufacturer>, selected: &str) -> Vec<ManufacturerOption> {
    manufacturers
        .into_iter()
        .map(|m| ManufacturerOption {
            id: m.id.as_i32(),
            selected: m.id.to_string() == selected.trim(),
            label: format!("{} ({})", m.name, m.country),
        })
        .collect()
}

// =============================================================================
// View Builders
// =============================================================================

/// Build the car list view model.
///
/// # Errors
///
/// Returns `RepositoryError` if the store query fails.
pub async fn build_car_list(
    store: &dyn TaxiStore,
    listing: &ListingConfig,
    current_driver: CurrentDriver,
    query: &ListQuery,
) -> Result<CarListTemplate, RepositoryError> {
    let filter = CarFilter::new(query.model.as_deref());
    let page = store.list_cars(&filter, query.page_request(listing)).await?;
    let page_view = PageView::new(&page, &[("model", filter.model.as_deref())]);

    Ok(CarListTemplate {
        current_driver,
        current_path: RouteName::CarList.path(),
        car_list: page.into_items().into_iter().map(Into::into).collect(),
        page: page_view,
        search_model: filter.model.unwrap_or_default(),
    })
}

/// Build the car form view model.
async fn build_car_form(
    store: &dyn TaxiStore,
    current_driver: CurrentDriver,
    form: CarForm,
    errors: CarFormErrors,
) -> Result<CarFormTemplate, RepositoryError> {
    let manufacturers = manufacturer_options(store.all_manufacturers().await?, &form.manufacturer_id);

    Ok(CarFormTemplate {
        current_driver,
        current_path: RouteName::CarList.path(),
        form,
        manufacturers,
        errors,
    })
}

// =============================================================================
// Handlers
// =============================================================================

/// Car list page handler.
#[instrument(skip(driver, state))]
pub async fn list(
    RequireAuth(driver): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<CarListTemplate, AppError> {
    Ok(build_car_list(state.store(), state.listing(), driver, &query).await?)
}

/// Car detail page handler.
#[instrument(skip(driver, state))]
pub async fn detail(
    RequireAuth(driver): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<CarDetailTemplate, AppError> {
    let id: CarId = parse_id(&id, "car")?;
    let car = state
        .store()
        .get_car(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("car {id}")))?;

    Ok(CarDetailTemplate {
        current_driver: driver,
        current_path: RouteName::CarList.path(),
        car: car.into(),
    })
}

/// New car form handler.
#[instrument(skip(driver, state))]
pub async fn new_form(
    RequireAuth(driver): RequireAuth,
    State(state): State<AppState>,
) -> Result<CarFormTemplate, AppError> {
    Ok(build_car_form(
        state.store(),
        driver,
        CarForm::default(),
        CarFormErrors::default(),
    )
    .await?)
}

/// Create car handler.
#[instrument(skip(driver, state, form))]
pub async fn create(
    RequireAuth(driver): RequireAuth,
    State(state): State<AppState>,
    Form(form): Form<CarForm>,
) -> Result<Response, AppError> {
    let errors = match form.validate() {
        Ok(new) => match state.store().create_car(&new).await {
            Ok(car) => {
                tracing::info!(car_id = %car.id, model = %car.model, "Car created");
                return Ok(Redirect::to(RouteName::CarList.path()).into_response());
            }
            Err(RepositoryError::NotFound) => CarFormErrors {
                manufacturer_id: Some(CarFormErrors::UNKNOWN_MANUFACTURER.to_owned()),
                ..CarFormErrors::default()
            },
            Err(e) => return Err(e.into()),
        },
        Err(errors) => errors,
    };

    let template = build_car_form(state.store(), driver, form, errors).await?;
    Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(template.render()?)).into_response())
}
