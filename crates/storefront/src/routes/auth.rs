//! Authentication route handlers.
//!
//! Thin shell over the hosted identity service: credentials are verified
//! remotely and the only thing stored locally is the verified user ID in the
//! session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::state::AppState;

// =============================================================================
// Form and Query Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Query parameters for error/notice display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub notice: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub notice: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Map a notice code from the query string to display text.
fn notice_message(code: &str) -> &'static str {
    match code {
        "login-required" => "Please log in to proceed with the payment.",
        _ => "Please log in to continue.",
    }
}

/// Map an error code from the query string to display text.
fn error_message(code: &str) -> &'static str {
    match code {
        "invalid-credentials" => "Invalid email or password.",
        _ => "Something went wrong. Please try again.",
    }
}

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query.error.as_deref().map(error_message).map(String::from),
        notice: query.notice.as_deref().map(notice_message).map(String::from),
    }
}

/// Verify credentials against the identity service and establish a session.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    match state.identity().verify(&form.email, &form.password).await {
        Ok(Some(verified)) => {
            let user = CurrentUser { uid: verified.uid };
            if let Err(e) = set_current_user(&session, &user).await {
                tracing::error!("Failed to store identity in session: {e}");
                return Redirect::to("/auth/login?error=session").into_response();
            }
            set_sentry_user(&user.uid);
            Redirect::to("/cart").into_response()
        }
        Ok(None) => Redirect::to("/auth/login?error=invalid-credentials").into_response(),
        Err(e) => {
            tracing::error!("Identity service verification failed: {e}");
            Redirect::to("/auth/login?error=unavailable").into_response()
        }
    }
}

/// Clear the session identity.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session identity: {e}");
    }
    clear_sentry_user();
    Redirect::to("/").into_response()
}
