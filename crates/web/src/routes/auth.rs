//! Authentication route handlers.
//!
//! Username/password login against Argon2id hashes stored with each driver.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_driver, safe_next, set_current_driver};
use crate::models::CurrentDriver;
use crate::routes::RouteName;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("next", &self.next)
            .finish()
    }
}

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "registration/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub username: String,
    pub next: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the login page.
///
/// Drivers who are already logged in go straight to `next`.
#[instrument(skip(current))]
pub async fn login_page(
    OptionalAuth(current): OptionalAuth,
    Query(query): Query<LoginQuery>,
) -> Response {
    let next = safe_next(query.next.as_deref()).to_owned();

    if current.is_some() {
        return Redirect::to(&next).into_response();
    }

    LoginTemplate {
        error: None,
        username: String::new(),
        next,
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let next = safe_next(form.next.as_deref()).to_owned();
    let auth = AuthService::new(state.store());

    let driver = match auth.login(&form.username, &form.password).await {
        Ok(driver) => driver,
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!("Login failed: invalid credentials");
            let template = LoginTemplate {
                error: Some("Please enter a correct username and password.".to_string()),
                username: form.username.trim().to_owned(),
                next,
            };
            return Ok((StatusCode::UNAUTHORIZED, Html(template.render()?)).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    set_current_driver(&session, &CurrentDriver::from(&driver)).await?;
    set_sentry_user(&driver.id, driver.username.as_str());
    tracing::info!(driver_id = %driver.id, "Driver logged in");

    Ok(Redirect::to(&next).into_response())
}

/// Handle logout.
///
/// Destroys the whole session, visit counter included.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_current_driver(&session).await {
        tracing::error!("Failed to flush session: {}", e);
    }
    clear_sentry_user();

    Redirect::to(RouteName::Login.path())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_form_debug_redacts_password() {
        let form = LoginForm {
            username: "driver1".to_owned(),
            password: "hunter22".to_owned(),
            next: None,
        };
        let debug_output = format!("{form:?}");
        assert!(debug_output.contains("driver1"));
        assert!(!debug_output.contains("hunter22"));
    }

    #[test]
    fn test_login_template_renders_error_and_next() {
        let html = LoginTemplate {
            error: Some("Please enter a correct username and password.".to_string()),
            username: "driver1".to_owned(),
            next: "/drivers/".to_owned(),
        }
        .render()
        .unwrap_or_default();

        assert!(html.contains(r#"data-template="registration/login.html""#));
        assert!(html.contains("Please enter a correct username and password."));
        assert!(html.contains(r#"name="next""#));
        assert!(html.contains(r#"value="driver1""#));
    }
}
