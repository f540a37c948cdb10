//! Vendor discovery: search, filters, distance ordering and the map panel.
//!
//! The page is a plain GET form. Browser geolocation arrives as query
//! parameters written by `static/js/location.js`:
//!
//! - `lat`, `lng`: a fix, remembered in the session;
//! - `geo=denied|unavailable|timeout|unsupported`: why there is no fix.
//!
//! Without either the page renders in a pending state and the script asks
//! the browser.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{RawQuery, State},
    response::IntoResponse,
};
use tower_sessions::Session;
use tracing::instrument;
use url::form_urlencoded;

use street_bite_core::discovery::available_cuisines;
use street_bite_core::map::{DEFAULT_ZOOM, MAX_ZOOM, MIN_ZOOM};
use street_bite_core::{
    Coordinate, CuisineSet, CuisineType, DistanceBand, FilterOptions, MapMarker, MapViewport,
    discover as discover_vendors,
};

use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::{StoredLocation, session_keys};
use crate::routes::{NavView, VendorCard};
use crate::services::favorites::FavoritesStore;
use crate::services::geolocation::{BrowserLocation, GeolocationState, Locator, resolve};
use crate::state::AppState;

/// What the page reported instead of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoReport {
    Denied,
    Unavailable,
    Timeout,
    Unsupported,
}

impl GeoReport {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "denied" => Some(Self::Denied),
            "unavailable" => Some(Self::Unavailable),
            "timeout" => Some(Self::Timeout),
            "unsupported" => Some(Self::Unsupported),
            _ => None,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Denied => "denied",
            Self::Unavailable => "unavailable",
            Self::Timeout => "timeout",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Parsed `/discover` query string.
///
/// Parsed by hand because `cuisine` repeats. Unknown bands, cuisines and
/// out-of-range coordinates are ignored rather than rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoverQuery {
    pub filters: FilterOptions,
    pub position: Option<Coordinate>,
    pub report: Option<GeoReport>,
    pub zoom: Option<u8>,
}

impl DiscoverQuery {
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let mut query = Self::default();
        let mut lat = None;
        let mut lng = None;

        for (key, value) in form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            match key.as_ref() {
                "search" => query.filters.search = value.trim().to_string(),
                "distance" => {
                    if let Ok(band) = value.parse::<DistanceBand>() {
                        query.filters.distance = band;
                    }
                }
                "cuisine" => {
                    if let Ok(cuisine) = value.parse::<CuisineType>() {
                        query.filters.cuisine_types.insert(cuisine);
                    }
                }
                "open_now" => query.filters.open_now = matches!(value.as_ref(), "on" | "true" | "1"),
                "lat" => lat = value.parse::<f64>().ok(),
                "lng" => lng = value.parse::<f64>().ok(),
                "geo" => query.report = GeoReport::parse(&value),
                "zoom" => {
                    query.zoom = value
                        .parse::<u8>()
                        .ok()
                        .map(|z| z.clamp(MIN_ZOOM, MAX_ZOOM));
                }
                _ => {}
            }
        }

        query.position = lat
            .zip(lng)
            .map(|(lat, lng)| Coordinate::new(lat, lng))
            .filter(|c| c.is_finite() && (-90.0..=90.0).contains(&c.lat) && (-180.0..=180.0).contains(&c.lng));
        query
    }

    /// Query string for the same filters at another zoom level.
    ///
    /// The position is left out; the session remembers it.
    #[must_use]
    pub fn to_query_string(&self, zoom: u8) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());
        if !self.filters.search.is_empty() {
            out.append_pair("search", &self.filters.search);
        }
        out.append_pair("distance", self.filters.distance.value());
        for cuisine in self.filters.cuisine_types.iter() {
            out.append_pair("cuisine", cuisine.as_str());
        }
        if self.filters.open_now {
            out.append_pair("open_now", "on");
        }
        if let Some(report) = self.report {
            out.append_pair("geo", report.as_str());
        }
        out.append_pair("zoom", &zoom.to_string());
        out.finish()
    }
}

/// One `<option>` or checkbox.
pub struct ChoiceView {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// A positioned map pin.
pub struct MarkerView {
    pub id: String,
    pub name: String,
    pub top: String,
    pub left: String,
}

/// Discovery page template.
#[derive(Template, WebTemplate)]
#[template(path = "discover.html")]
pub struct DiscoverTemplate {
    pub nav: NavView,
    pub search: String,
    pub bands: Vec<ChoiceView>,
    pub cuisines: Vec<ChoiceView>,
    pub open_now: bool,
    pub report: Option<&'static str>,
    pub vendors: Vec<VendorCard>,
    pub markers: Vec<MarkerView>,
    pub location_label: Option<String>,
    pub geo_error: Option<String>,
    /// The script should ask the browser for a position.
    pub locate: bool,
    pub high_accuracy: bool,
    pub timeout_ms: u128,
    pub maximum_age_ms: u128,
    pub zoom: u8,
    pub zoom_in_url: Option<String>,
    pub zoom_out_url: Option<String>,
    pub error: Option<String>,
    pub return_to: String,
}

/// Display the filtered vendor list and map.
#[instrument(skip(state, user, session, raw))]
pub async fn discover(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    RawQuery(raw): RawQuery,
) -> Result<impl IntoResponse> {
    let query = DiscoverQuery::parse(raw.as_deref());
    let options = state.geolocation();

    let geo = match (query.position, query.report) {
        (Some(position), _) => {
            session
                .insert(session_keys::LAST_LOCATION, StoredLocation::now(position))
                .await?;
            resolve(Some(&BrowserLocation::new(Some(position), None)), options).await
        }
        (None, Some(GeoReport::Timeout)) => GeolocationState::timed_out(),
        (None, report) => {
            let browser = match report {
                Some(GeoReport::Denied) => BrowserLocation::denied(),
                Some(GeoReport::Unavailable) => BrowserLocation::unavailable(),
                _ => {
                    let remembered = session
                        .get::<StoredLocation>(session_keys::LAST_LOCATION)
                        .await?;
                    BrowserLocation::new(None, remembered)
                }
            };
            match Locator::choose(browser, state.locator(), options) {
                Some(locator) => resolve(Some(&locator), options).await,
                // Nothing known yet: let the page ask the browser first.
                None if report.is_none() => GeolocationState::pending(),
                None => resolve::<Locator>(None, options).await,
            }
        }
    };

    let (all, error) = match state.api().list_vendors().await {
        Ok(vendors) => (vendors, None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load vendors for discovery");
            (std::sync::Arc::default(), Some(e.user_message()))
        }
    };

    let saved = FavoritesStore::new(session).all().await?;
    let found = discover_vendors(&all, &query.filters, geo.location);
    tracing::debug!(
        total = all.len(),
        shown = found.len(),
        located = geo.location.is_some(),
        "Discovery results"
    );

    let viewport = MapViewport::new(geo.location).with_zoom(query.zoom.unwrap_or(DEFAULT_ZOOM));
    let markers = found
        .iter()
        .map(|d| {
            let marker = MapMarker::from(d.vendor);
            let point = viewport.project(&marker);
            MarkerView {
                id: marker.id.to_string(),
                name: marker.name,
                top: format!("{:.2}", point.top),
                left: format!("{:.2}", point.left),
            }
        })
        .collect();

    let vendors = found
        .iter()
        .map(|d| VendorCard::new(d.vendor, d.distance, &saved))
        .collect();

    let zoom = viewport.zoom();
    let mut zoomed_in = viewport;
    zoomed_in.zoom_in();
    let mut zoomed_out = viewport;
    zoomed_out.zoom_out();

    Ok(DiscoverTemplate {
        nav: NavView::new(user.as_ref()),
        search: query.filters.search.clone(),
        bands: band_choices(query.filters.distance),
        cuisines: cuisine_choices(&available_cuisines(&all), &query.filters.cuisine_types),
        open_now: query.filters.open_now,
        report: query.report.map(GeoReport::as_str),
        vendors,
        markers,
        location_label: geo
            .location
            .map(|c| format!("{:.4}, {:.4}", c.lat, c.lng)),
        geo_error: geo.error,
        locate: geo.loading,
        high_accuracy: options.enable_high_accuracy,
        timeout_ms: options.timeout.as_millis(),
        maximum_age_ms: options.maximum_age.as_millis(),
        zoom,
        zoom_in_url: (zoomed_in.zoom() != zoom)
            .then(|| format!("/discover?{}", query.to_query_string(zoomed_in.zoom()))),
        zoom_out_url: (zoomed_out.zoom() != zoom)
            .then(|| format!("/discover?{}", query.to_query_string(zoomed_out.zoom()))),
        error,
        return_to: format!("/discover?{}", query.to_query_string(zoom)),
    })
}

fn band_choices(selected: DistanceBand) -> Vec<ChoiceView> {
    DistanceBand::ALL
        .into_iter()
        .map(|band| ChoiceView {
            value: band.value(),
            label: band.label(),
            selected: band == selected,
        })
        .collect()
}

/// Cuisines on offer, plus any selected cuisine no vendor currently serves
/// so the selection stays visible.
fn cuisine_choices(available: &CuisineSet, selected: &CuisineSet) -> Vec<ChoiceView> {
    let mut shown = available.clone();
    for cuisine in selected.iter() {
        shown.insert(cuisine);
    }
    shown
        .iter()
        .map(|cuisine| ChoiceView {
            value: cuisine.as_str(),
            label: cuisine.as_str(),
            selected: selected.contains(cuisine),
        })
        .collect()
}
