//! Authentication route handlers.
//!
//! Login, sign-up and logout against the vendor service's user endpoints.
//! Failures redirect back to the form with the message in `?error=`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;

use street_bite_core::Role;

use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::{NavView, local_path, with_message};
use crate::services::auth::{AuthGate, MIN_PASSWORD_LENGTH, sign_up};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub return_to: Option<String>,
}

/// Sign-up form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub role: Option<String>,
}

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
    pub return_to: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub nav: NavView,
    pub error: Option<String>,
    pub success: Option<String>,
    pub return_to: Option<String>,
}

/// Sign-up page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub nav: NavView,
    pub error: Option<String>,
    pub min_password_length: usize,
}

// =============================================================================
// Login
// =============================================================================

/// Display the login page. Signed-in users go home.
pub async fn login_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    LoginTemplate {
        nav: NavView::default(),
        error: query.error,
        success: query.success,
        return_to: local_path(query.return_to.as_deref()).map(str::to_string),
    }
    .into_response()
}

/// Handle login form submission.
///
/// A rejected login leaves the session as it was.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let mut gate = AuthGate::load(session, state.api().clone()).await?;

    match gate.login(&form.email, SecretString::from(form.password)).await {
        Ok(_) => {
            let target = local_path(form.return_to.as_deref()).unwrap_or("/");
            Ok(Redirect::to(target).into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            Ok(Redirect::to(&with_message("/auth/login", "error", &e.user_message())).into_response())
        }
    }
}

// =============================================================================
// Sign-up
// =============================================================================

/// Display the sign-up page.
pub async fn register_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    RegisterTemplate {
        nav: NavView::default(),
        error: query.error,
        min_password_length: MIN_PASSWORD_LENGTH,
    }
    .into_response()
}

/// Handle sign-up form submission.
///
/// The new account is not signed in; the user is sent to the login page.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let role = match form.role.as_deref() {
        Some("vendor") => Role::Vendor,
        _ => Role::User,
    };

    let outcome = match sign_up(&form.name, &form.email, &form.password, &form.password_confirm, role) {
        Ok(data) => {
            let gate = AuthGate::load(session, state.api().clone()).await?;
            gate.register(&data).await.map(|_| ())
        }
        Err(e) => Err(e),
    };

    Ok(match outcome {
        Ok(()) => Redirect::to(&with_message(
            "/auth/login",
            "success",
            "Account created. Please sign in.",
        ))
        .into_response(),
        Err(e) => {
            tracing::info!(error = %e, "Sign-up rejected");
            Redirect::to(&with_message("/auth/register", "error", &e.user_message())).into_response()
        }
    })
}

// =============================================================================
// Logout
// =============================================================================

/// Sign out and go home.
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    let mut gate = AuthGate::load(session, state.api().clone()).await?;
    gate.logout().await?;
    Ok(Redirect::to("/"))
}
