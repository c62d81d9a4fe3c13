//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a logged-in driver in route handlers.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentDriver, session_keys};
use crate::routes::RouteName;

/// Extractor that requires an authenticated driver.
///
/// If nobody is logged in, the request is redirected to the login page with
/// the original path in `?next=`.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(driver): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", driver.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentDriver);

/// Error returned when authentication is required but nobody is logged in.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the login page, returning to `next` afterwards.
    RedirectToLogin { next: String },
    /// No session layer installed.
    Unauthorized,
}

impl AuthRejection {
    /// The login URL this rejection redirects to.
    #[must_use]
    pub fn login_url(next: &str) -> String {
        format!(
            "{}?next={}",
            RouteName::Login.path(),
            urlencoding::encode(next)
        )
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { next } => Redirect::to(&Self::login_url(&next)).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let driver: CurrentDriver = session
            .get(session_keys::CURRENT_DRIVER)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| {
                let next = parts
                    .uri
                    .path_and_query()
                    .map_or_else(|| parts.uri.path().to_owned(), ToString::to_string);
                AuthRejection::RedirectToLogin { next }
            })?;

        Ok(Self(driver))
    }
}

/// Extractor that optionally gets the current driver.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is logged in.
pub struct OptionalAuth(pub Option<CurrentDriver>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let driver = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentDriver>(session_keys::CURRENT_DRIVER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(driver))
    }
}

/// Helper to set the current driver in the session.
///
/// Cycles the session ID first so a pre-login session cannot be fixated.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_driver(
    session: &Session,
    driver: &CurrentDriver,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_DRIVER, driver).await
}

/// Helper to clear all session data (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_driver(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

/// Pick the post-login redirect target.
///
/// Only same-site relative paths are honoured: the value must start with a
/// single `/` and contain no backslashes or control characters. Anything
/// else falls back to the index page.
#[must_use]
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path
        }
        _ => RouteName::Index.path(),
    }
}
