//! Authentication extractors and token verification.
//!
//! A request counts as signed in when the session holds both a user and a
//! bearer token.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use street_bite_core::User;

use crate::models::session_keys;
use crate::services::auth::AuthGate;
use crate::state::AppState;

/// Confirm a restored token with the vendor service before handlers run.
///
/// Runs inside the session layer. A token the service rejects is cleared,
/// so the request is handled as signed out.
pub async fn verify_session_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(session) = request.extensions().get::<Session>().cloned() {
        let verified = match AuthGate::load(session, state.api().clone()).await {
            Ok(mut gate) => gate.verify().await,
            Err(e) => Err(e),
        };
        if let Err(e) = verified {
            tracing::warn!(error = %e, "Could not verify stored token");
        }
    }

    next.run(request).await
}

/// Extractor that requires a signed-in user.
///
/// Page requests are redirected to the login page; `/api/` requests get 401.
///
/// ```rust,ignore
/// async fn profile(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hi, {}!", user.first_name())
/// }
/// ```
pub struct RequireAuth(pub User);

/// Rejection for [`RequireAuth`].
#[derive(Debug, PartialEq, Eq)]
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl AuthRejection {
    fn for_path(path: &str) -> Self {
        if path.starts_with("/api/") {
            Self::Unauthorized
        } else {
            Self::RedirectToLogin
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>() else {
            return Err(AuthRejection::Unauthorized);
        };

        signed_in_user(session)
            .await
            .map(Self)
            .ok_or_else(|| AuthRejection::for_path(parts.uri.path()))
    }
}

/// Extractor that optionally gets the signed-in user.
pub struct OptionalAuth(pub Option<User>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => signed_in_user(session).await,
            None => None,
        };

        Ok(Self(user))
    }
}

async fn signed_in_user(session: &Session) -> Option<User> {
    let has_token = session
        .get::<String>(session_keys::AUTH_TOKEN)
        .await
        .ok()
        .flatten()
        .is_some();
    if !has_token {
        return None;
    }

    session
        .get::<User>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}
