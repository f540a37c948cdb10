//! Favorite toggle.

use axum::{
    Form,
    extract::Path,
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;

use street_bite_core::VendorId;

use crate::error::{Result, add_breadcrumb};
use crate::routes::local_path;
use crate::services::favorites::FavoritesStore;

#[derive(Debug, Default, Deserialize)]
pub struct ToggleForm {
    pub return_to: Option<String>,
}

/// Save or unsave a vendor, then go back to the page the button was on.
///
/// Signed-out visitors are sent back unchanged.
pub async fn toggle(
    session: Session,
    Path(id): Path<String>,
    headers: HeaderMap,
    Form(form): Form<ToggleForm>,
) -> Result<impl IntoResponse> {
    let id = VendorId::new(id);
    if let Some(saved) = FavoritesStore::new(session).toggle(&id).await? {
        let action = if saved { "Saved vendor" } else { "Removed saved vendor" };
        let data = [("vendor_id", id.as_str())];
        add_breadcrumb("favorites", action, Some(data.as_slice()));
    }

    Ok(Redirect::to(&back_to(form.return_to.as_deref(), &headers)))
}

/// The form's `return_to`, else the referer's path, else home.
fn back_to(return_to: Option<&str>, headers: &HeaderMap) -> String {
    if let Some(path) = local_path(return_to) {
        return path.to_string();
    }

    headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .and_then(|r| url::Url::parse(r).ok())
        .map(|u| match u.query() {
            Some(q) => format!("{}?{q}", u.path()),
            None => u.path().to_string(),
        })
        .unwrap_or_else(|| "/".to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_back_to_prefers_form_field() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::REFERER,
            HeaderValue::from_static("https://streetbite.example/discover?search=taco"),
        );
        assert_eq!(back_to(Some("/vendor/v1"), &headers), "/vendor/v1");
        assert_eq!(back_to(None, &headers), "/discover?search=taco");
        assert_eq!(back_to(Some("https://evil.example"), &headers), "/discover?search=taco");
        assert_eq!(back_to(None, &HeaderMap::new()), "/");
    }
}
