//! Manufacturer route handlers.

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

use taxi_core::{ManufacturerId, TextField};

use crate::config::ListingConfig;
use crate::db::{ManufacturerFilter, RepositoryError, TaxiStore};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentDriver, Manufacturer, NewManufacturer};
use crate::routes::listing::{ListQuery, PageView};
use crate::routes::{RouteName, manufacturer_delete_path, parse_id};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Manufacturer row for templates.
#[derive(Debug, Clone)]
pub struct ManufacturerView {
    pub id: i32,
    pub name: String,
    pub country: String,
    pub delete_url: String,
}

impl From<Manufacturer> for ManufacturerView {
    fn from(m: Manufacturer) -> Self {
        Self {
            id: m.id.as_i32(),
            delete_url: manufacturer_delete_path(m.id),
            name: m.name,
            country: m.country,
        }
    }
}

/// Manufacturer list page template.
#[derive(Template, WebTemplate)]
#[template(path = "taxi/manufacturer_list.html")]
pub struct ManufacturerListTemplate {
    pub current_driver: CurrentDriver,
    pub current_path: &'static str,
    pub manufacturer_list: Vec<ManufacturerView>,
    pub page: PageView,
    pub search_name: String,
}

/// Manufacturer create form template.
#[derive(Template, WebTemplate)]
#[template(path = "taxi/manufacturer_form.html")]
pub struct ManufacturerFormTemplate {
    pub current_driver: CurrentDriver,
    pub current_path: &'static str,
    pub form: ManufacturerForm,
    pub errors: ManufacturerFormErrors,
}

// =============================================================================
// Form Types
// =============================================================================

/// Manufacturer form data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManufacturerForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
}

/// Per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManufacturerFormErrors {
    pub name: Option<String>,
    pub country: Option<String>,
}

impl ManufacturerForm {
    /// Validate the submitted fields.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages if any field is invalid.
    pub fn validate(&self) -> Result<NewManufacturer, ManufacturerFormErrors> {
        let name = TextField::parse(&self.name);
        let country = TextField::parse(&self.country);

        match (name, country) {
            (Ok(name), Ok(country)) => Ok(NewManufacturer { name, country }),
            (name, country) => Err(ManufacturerFormErrors {
                name: name.err().map(|e| e.to_string()),
                country: country.err().map(|e| e.to_string()),
            }),
        }
    }
}

// =============================================================================
// View Builders
// =============================================================================

/// Build the manufacturer list view model.
///
/// # Errors
///
/// Returns `RepositoryError` if the store query fails.
pub async fn build_manufacturer_list(
    store: &dyn TaxiStore,
    listing: &ListingConfig,
    current_driver: CurrentDriver,
    query: &ListQuery,
) -> Result<ManufacturerListTemplate, RepositoryError> {
    let filter = ManufacturerFilter::new(query.name.as_deref());
    let page = store
        .list_manufacturers(&filter, query.page_request(listing))
        .await?;
    let page_view = PageView::new(&page, &[("name", filter.name.as_deref())]);

    Ok(ManufacturerListTemplate {
        current_driver,
        current_path: RouteName::ManufacturerList.path(),
        manufacturer_list: page.into_items().into_iter().map(Into::into).collect(),
        page: page_view,
        search_name: filter.name.unwrap_or_default(),
    })
}

// =============================================================================
// Handlers
// =============================================================================

/// Manufacturer list page handler.
#[instrument(skip(driver, state))]
pub async fn list(
    RequireAuth(driver): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<ManufacturerListTemplate, AppError> {
    Ok(build_manufacturer_list(state.store(), state.listing(), driver, &query).await?)
}

/// New manufacturer form handler.
#[instrument(skip(driver))]
pub async fn new_form(RequireAuth(driver): RequireAuth) -> ManufacturerFormTemplate {
    ManufacturerFormTemplate {
        current_driver: driver,
        current_path: RouteName::ManufacturerList.path(),
        form: ManufacturerForm::default(),
        errors: ManufacturerFormErrors::default(),
    }
}

/// Create manufacturer handler.
#[instrument(skip(driver, state, form))]
pub async fn create(
    RequireAuth(driver): RequireAuth,
    State(state): State<AppState>,
    Form(form): Form<ManufacturerForm>,
) -> Result<Response, AppError> {
    let new = match form.validate() {
        Ok(new) => new,
        Err(errors) => {
            let template = ManufacturerFormTemplate {
                current_driver: driver,
                current_path: RouteName::ManufacturerList.path(),
                form,
                errors,
            };
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(template.render()?)).into_response());
        }
    };

    let manufacturer = state.store().create_manufacturer(&new).await?;
    tracing::info!(manufacturer_id = %manufacturer.id, name = %manufacturer.name, "Manufacturer created");

    Ok(Redirect::to(RouteName::ManufacturerList.path()).into_response())
}

/// Delete manufacturer handler (cars cascade).
#[instrument(skip(_driver, state))]
pub async fn delete(
    RequireAuth(_driver): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let id: ManufacturerId = parse_id(&id, "manufacturer")?;

    if !state.store().delete_manufacturer(id).await? {
        return Err(AppError::NotFound(format!("manufacturer {id}")));
    }
    tracing::info!(manufacturer_id = %id, "Manufacturer deleted");

    Ok(Redirect::to(RouteName::ManufacturerList.path()))
}
