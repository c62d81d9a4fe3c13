//! Index page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::{RepositoryError, TaxiStore};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentDriver, session_keys};
use crate::routes::RouteName;
use crate::state::AppState;

/// Index page template.
#[derive(Template, WebTemplate)]
#[template(path = "taxi/index.html")]
pub struct IndexTemplate {
    pub current_driver: CurrentDriver,
    pub current_path: &'static str,
    pub num_drivers: u64,
    pub num_cars: u64,
    pub num_manufacturers: u64,
    pub num_visits: u64,
}

/// Build the index view model.
///
/// # Errors
///
/// Returns `RepositoryError` if the counts cannot be read.
pub async fn build_index(
    store: &dyn TaxiStore,
    current_driver: CurrentDriver,
    num_visits: u64,
) -> Result<IndexTemplate, RepositoryError> {
    let counts = store.counts().await?;

    Ok(IndexTemplate {
        current_driver,
        current_path: RouteName::Index.path(),
        num_drivers: counts.drivers,
        num_cars: counts.cars,
        num_manufacturers: counts.manufacturers,
        num_visits,
    })
}

/// Index page handler.
///
/// Counts this visit in the session before rendering.
#[instrument(skip(driver, state, session), fields(driver = %driver.username))]
pub async fn index(
    RequireAuth(driver): RequireAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<IndexTemplate, AppError> {
    let num_visits = session
        .get::<u64>(session_keys::NUM_VISITS)
        .await?
        .unwrap_or(0)
        .saturating_add(1);
    session.insert(session_keys::NUM_VISITS, num_visits).await?;

    Ok(build_index(state.store(), driver, num_visits).await?)
}
