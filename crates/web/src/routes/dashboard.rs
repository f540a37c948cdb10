//! Vendor dashboard: carts registered by the signed-in user.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use street_bite_core::UserId;

use crate::api::{ApiError, VendorSummary};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::{NavView, with_message};
use crate::services::auth::AuthGate;
use crate::state::AppState;

pub struct CartView {
    pub business_name: String,
    pub description: String,
    pub address: String,
    pub menu_image: Option<String>,
}

impl From<VendorSummary> for CartView {
    fn from(summary: VendorSummary) -> Self {
        Self {
            address: summary.full_address(),
            business_name: summary.business_name,
            description: summary.description,
            menu_image: summary.menu_image,
        }
    }
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub nav: NavView,
    pub carts: Vec<CartView>,
    pub error: Option<String>,
}

/// Display the carts owned by `id`.
///
/// Only the owner may look; other ids redirect to the caller's own dashboard.
#[instrument(skip(state, user, session))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Path(id): Path<String>,
) -> Result<Response> {
    let owner = UserId::new(id);
    if owner != user.id {
        return Ok(Redirect::to(&format!("/dashboard/{}", user.id)).into_response());
    }

    let mut gate = AuthGate::load(session, state.api().clone()).await?;
    let Some(token) = gate.token().cloned() else {
        return Ok(Redirect::to("/auth/login").into_response());
    };

    let (carts, error) = match state.api().vendors_by_owner(&token, &owner).await {
        Ok(found) => (found.into_iter().map(CartView::from).collect(), None),
        Err(ApiError::Unauthorized(_)) => {
            gate.token_rejected().await?;
            return Ok(Redirect::to(&with_message(
                "/auth/login",
                "error",
                "Your session has expired. Please sign in again.",
            ))
            .into_response());
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load carts");
            (Vec::new(), Some(e.user_message()))
        }
    };

    Ok(DashboardTemplate {
        nav: NavView::new(Some(&user)),
        carts,
        error,
    }
    .into_response())
}
