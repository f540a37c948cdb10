//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use street_bite_core::discovery::{FEATURED_LIMIT, FEATURED_MIN_RATING};
use street_bite_core::{DistanceBand, Favorites, featured};

use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::{NavView, VendorCard};
use crate::services::favorites::FavoritesStore;
use crate::state::AppState;

/// Quick links under the hero search box.
pub struct QuickFilter {
    pub label: &'static str,
    pub href: &'static str,
}

const QUICK_FILTERS: [QuickFilter; 3] = [
    QuickFilter {
        label: "Open now",
        href: "/discover?open_now=on",
    },
    QuickFilter {
        label: "Tacos",
        href: "/discover?cuisine=Mexican",
    },
    QuickFilter {
        label: "Within a mile",
        href: "/discover?distance=1",
    },
];

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub nav: NavView,
    pub featured: Vec<VendorCard>,
    pub quick_filters: &'static [QuickFilter],
    pub default_band: &'static str,
    pub error: Option<String>,
    pub return_to: &'static str,
}

/// Display the home page with featured vendors.
///
/// A vendor service outage degrades to an empty list with a notice.
#[instrument(skip(state, user, session))]
pub async fn home(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> impl IntoResponse {
    let saved = FavoritesStore::new(session).all().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to read saved vendors");
        Favorites::default()
    });
    let (featured, error) = match state.api().list_vendors().await {
        Ok(vendors) => (
            featured(&vendors, FEATURED_MIN_RATING, FEATURED_LIMIT)
                .into_iter()
                .map(|v| VendorCard::new(v, None, &saved))
                .collect(),
            None,
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load featured vendors");
            (Vec::new(), Some(e.user_message()))
        }
    };

    HomeTemplate {
        nav: NavView::new(user.as_ref()),
        featured,
        quick_filters: &QUICK_FILTERS,
        default_band: DistanceBand::default().value(),
        error,
        return_to: "/",
    }
}
