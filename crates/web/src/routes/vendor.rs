//! Vendor detail page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use chrono::Datelike;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use street_bite_core::{Day, MenuItem, Review, Vendor, VendorId};

use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::NavView;
use crate::services::favorites::FavoritesStore;
use crate::state::AppState;

/// Menu filter.
#[derive(Debug, Deserialize)]
pub struct MenuQuery {
    pub category: Option<String>,
}

/// Menu tab; "All Items" has no category.
pub struct CategoryTab {
    pub label: String,
    pub href: String,
    pub selected: bool,
}

pub struct MenuItemView {
    pub name: String,
    pub price: String,
    pub description: String,
    pub popular: bool,
    pub dietary: Vec<String>,
    pub image: Option<String>,
}

impl From<&MenuItem> for MenuItemView {
    fn from(item: &MenuItem) -> Self {
        Self {
            name: item.name.clone(),
            price: item.price.to_string(),
            description: item.description.clone(),
            popular: item.popular,
            dietary: item.dietary.clone(),
            image: item.image.clone(),
        }
    }
}

pub struct ReviewView {
    pub user_name: String,
    pub rating: f64,
    pub comment: String,
    pub date: String,
}

impl From<&Review> for ReviewView {
    fn from(review: &Review) -> Self {
        Self {
            user_name: review.user_name.clone(),
            rating: review.rating,
            comment: review.comment.clone(),
            date: review.date.clone(),
        }
    }
}

pub struct ScheduleView {
    pub day: String,
    pub hours: String,
    pub today: bool,
}

/// Vendor detail template.
#[derive(Template, WebTemplate)]
#[template(path = "vendor/show.html")]
pub struct VendorTemplate {
    pub nav: NavView,
    pub id: String,
    pub business_name: String,
    pub cuisine: String,
    pub description: String,
    pub images: Vec<String>,
    pub rating: f64,
    pub rating_label: String,
    pub review_count: u32,
    pub is_open: bool,
    pub address: Option<String>,
    pub phone: String,
    pub email: String,
    pub payment_methods: Vec<String>,
    pub tabs: Vec<CategoryTab>,
    pub items: Vec<MenuItemView>,
    pub reviews: Vec<ReviewView>,
    pub schedule: Vec<ScheduleView>,
    pub signed_in: bool,
    pub is_favorite: bool,
    pub return_to: String,
}

/// Display one vendor.
///
/// # Errors
///
/// 404 when no listed vendor has this id.
#[instrument(skip(state, user, session))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Path(id): Path<String>,
    Query(query): Query<MenuQuery>,
) -> Result<impl IntoResponse> {
    let vendor = state.api().vendor(&VendorId::new(id)).await?;
    let is_favorite = FavoritesStore::new(session).is_favorite(&vendor.id).await?;
    let category = query
        .category
        .as_deref()
        .filter(|c| vendor.menu_categories().contains(c));

    let return_to = match category {
        Some(c) => format!("/vendor/{}?category={}", vendor.id, urlencoding::encode(c)),
        None => format!("/vendor/{}", vendor.id),
    };

    Ok(VendorTemplate {
        nav: NavView::new(user.as_ref()),
        id: vendor.id.to_string(),
        business_name: vendor.business_name.clone(),
        cuisine: vendor.cuisine_type.to_string(),
        description: vendor.description.clone(),
        images: vendor.gallery().into_iter().map(str::to_string).collect(),
        rating: vendor.ratings.average,
        rating_label: format!("{:.1}", vendor.ratings.average),
        review_count: vendor.ratings.count,
        is_open: vendor.is_open,
        address: vendor.primary_location().map(|l| l.address.clone()),
        phone: vendor.contact_info.phone.clone(),
        email: vendor.contact_info.email.clone(),
        payment_methods: vendor.payment_methods.iter().map(ToString::to_string).collect(),
        tabs: category_tabs(&vendor, category),
        items: vendor
            .menu_in_category(category)
            .into_iter()
            .map(MenuItemView::from)
            .collect(),
        reviews: vendor.reviews.iter().map(ReviewView::from).collect(),
        schedule: schedule(&vendor, Day::from(chrono::Local::now().weekday())),
        signed_in: user.is_some(),
        is_favorite,
        return_to,
    })
}

fn category_tabs(vendor: &Vendor, selected: Option<&str>) -> Vec<CategoryTab> {
    let base = format!("/vendor/{}", vendor.id);
    std::iter::once(CategoryTab {
        label: "All Items".to_string(),
        href: base.clone(),
        selected: selected.is_none(),
    })
    .chain(vendor.menu_categories().into_iter().map(|c| CategoryTab {
        label: c.to_string(),
        href: format!("{base}?category={}", urlencoding::encode(c)),
        selected: selected == Some(c),
    }))
    .collect()
}

fn schedule(vendor: &Vendor, today: Day) -> Vec<ScheduleView> {
    vendor
        .primary_location()
        .map(|location| {
            location
                .schedules
                .iter()
                .map(|s| ScheduleView {
                    day: s.day.to_string(),
                    hours: format!("{} - {}", s.open, s.close),
                    today: s.day == today,
                })
                .collect()
        })
        .unwrap_or_default()
}
