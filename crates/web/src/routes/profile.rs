//! Profile page: account details and saved vendors.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use street_bite_core::{User, Vendor};

use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::{NavView, VendorCard};
use crate::state::AppState;

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub nav: NavView,
    pub name: String,
    pub email: String,
    pub role: &'static str,
    pub saved: Vec<VendorCard>,
    /// Saved ids the listing no longer contains.
    pub missing: usize,
    pub error: Option<String>,
    pub return_to: &'static str,
}

/// Display the signed-in user's profile.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn profile(State(state): State<AppState>, RequireAuth(user): RequireAuth) -> impl IntoResponse {
    let (saved, missing, error) = match state.api().list_vendors().await {
        Ok(vendors) => {
            let saved = saved_vendors(&user, &vendors);
            let missing = user.saved_vendors.len().saturating_sub(saved.len());
            (saved, missing, None)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load saved vendors");
            (Vec::new(), 0, Some(e.user_message()))
        }
    };

    ProfileTemplate {
        nav: NavView::new(Some(&user)),
        name: user.name.clone(),
        email: user.email.to_string(),
        role: user.role.as_str(),
        saved,
        missing,
        error,
        return_to: "/profile",
    }
}

/// Saved vendors in the order they were saved.
fn saved_vendors(user: &User, vendors: &[Vendor]) -> Vec<VendorCard> {
    user.saved_vendors
        .iter()
        .filter_map(|id| vendors.iter().find(|v| &v.id == id))
        .map(|v| VendorCard::new(v, None, &user.saved_vendors))
        .collect()
}
