//! Vendor listings as served by the vendor service.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::types::{LocationId, MenuItemId, Price, ReviewId, UserId, VendorId};

/// Highest possible average rating.
pub const MAX_RATING: f64 = 5.0;

/// Reasons a vendor record is rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum VendorError {
    #[error("vendor {0} has no locations")]
    NoLocations(VendorId),
    #[error("vendor {id} has average rating {average} outside 0..=5")]
    RatingOutOfRange { id: VendorId, average: f64 },
    #[error("menu item {item} of vendor {id} has no category")]
    UncategorizedMenuItem { id: VendorId, item: MenuItemId },
}

/// Kind of food a vendor serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CuisineType {
    Mexican,
    Japanese,
    Greek,
    French,
    Thai,
    Indian,
    Italian,
    American,
    Chinese,
    Other,
}

impl CuisineType {
    /// Every cuisine, in menu order.
    pub const ALL: [Self; 10] = [
        Self::Mexican,
        Self::Japanese,
        Self::Greek,
        Self::French,
        Self::Thai,
        Self::Indian,
        Self::Italian,
        Self::American,
        Self::Chinese,
        Self::Other,
    ];

    /// Display name, which is also the wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mexican => "Mexican",
            Self::Japanese => "Japanese",
            Self::Greek => "Greek",
            Self::French => "French",
            Self::Thai => "Thai",
            Self::Indian => "Indian",
            Self::Italian => "Italian",
            Self::American => "American",
            Self::Chinese => "Chinese",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for CuisineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a [`CuisineType`] from a string.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown cuisine type: {0}")]
pub struct UnknownCuisine(pub String);

impl FromStr for CuisineType {
    type Err = UnknownCuisine;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCuisine(s.to_owned()))
    }
}

/// Day of the week used in opening schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<chrono::Weekday> for Day {
    fn from(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Opening hours for one day, as `HH:MM` strings from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub day: Day,
    pub open: String,
    pub close: String,
}

/// A place where the vendor parks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub coordinates: Coordinate,
    pub address: String,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
}

impl Location {
    /// Schedule entry for `day`, if the vendor opens that day.
    #[must_use]
    pub fn schedule_for(&self, day: Day) -> Option<&Schedule> {
        self.schedules.iter().find(|s| s.day == day)
    }
}

/// A dish on the menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub popular: bool,
    #[serde(default)]
    pub dietary: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// How customers can pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Card,
    Mobile,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cash => "Cash",
            Self::Card => "Card",
            Self::Mobile => "Mobile Pay",
        })
    }
}

/// Aggregate rating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Rating {
    pub average: f64,
    pub count: u32,
}

/// A customer review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub user_name: String,
    pub rating: f64,
    pub comment: String,
    pub date: String,
}

/// Vendor contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContactInfo {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

/// A street-food business listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    #[serde(alias = "_id")]
    pub id: VendorId,
    #[serde(default)]
    pub name: String,
    pub business_name: String,
    #[serde(default)]
    pub description: String,
    pub cuisine_type: CuisineType,
    #[serde(default)]
    pub contact_info: ContactInfo,
    pub locations: Vec<Location>,
    #[serde(default)]
    pub menu: Vec<MenuItem>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub payment_methods: Vec<PaymentMethod>,
    #[serde(default)]
    pub ratings: Rating,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub is_open: bool,
}

impl Vendor {
    /// Check the listing invariants.
    ///
    /// # Errors
    ///
    /// Returns a [`VendorError`] when the vendor has no locations, its
    /// average rating is outside `0..=5`, or a menu item has a blank category.
    pub fn validate(&self) -> Result<(), VendorError> {
        if self.locations.is_empty() {
            return Err(VendorError::NoLocations(self.id.clone()));
        }
        let average = self.ratings.average;
        if !(0.0..=MAX_RATING).contains(&average) {
            return Err(VendorError::RatingOutOfRange {
                id: self.id.clone(),
                average,
            });
        }
        if let Some(item) = self.menu.iter().find(|i| i.category.trim().is_empty()) {
            return Err(VendorError::UncategorizedMenuItem {
                id: self.id.clone(),
                item: item.id.clone(),
            });
        }
        Ok(())
    }

    /// The primary location, used for distance and map placement.
    #[must_use]
    pub fn primary_location(&self) -> Option<&Location> {
        self.locations.first()
    }

    /// Coordinates of the primary location.
    #[must_use]
    pub fn position(&self) -> Option<Coordinate> {
        self.primary_location().map(|l| l.coordinates)
    }

    /// Menu categories in first-seen order, without duplicates.
    #[must_use]
    pub fn menu_categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for item in &self.menu {
            if !categories.contains(&item.category.as_str()) {
                categories.push(&item.category);
            }
        }
        categories
    }

    /// Menu items in `category`; `None` means all items.
    #[must_use]
    pub fn menu_in_category(&self, category: Option<&str>) -> Vec<&MenuItem> {
        self.menu
            .iter()
            .filter(|item| category.is_none_or(|c| item.category == c))
            .collect()
    }

    /// Main image followed by every menu item image.
    #[must_use]
    pub fn gallery(&self) -> Vec<&str> {
        self.images
            .first()
            .map(String::as_str)
            .into_iter()
            .chain(self.menu.iter().filter_map(|i| i.image.as_deref()))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Small vendors for tests across the crate.

    use super::*;

    pub fn vendor(id: &str, cuisine: CuisineType, at: Coordinate) -> Vendor {
        Vendor {
            id: VendorId::new(id),
            name: format!("{id} owner"),
            business_name: format!("{id} Kitchen"),
            description: String::new(),
            cuisine_type: cuisine,
            contact_info: ContactInfo::default(),
            locations: vec![Location {
                id: LocationId::new(format!("{id}-loc")),
                coordinates: at,
                address: "1 Main St".to_owned(),
                schedules: Vec::new(),
            }],
            menu: Vec::new(),
            images: Vec::new(),
            payment_methods: vec![PaymentMethod::Cash],
            ratings: Rating {
                average: 4.0,
                count: 10,
            },
            reviews: Vec::new(),
            is_open: true,
        }
    }

    pub fn menu_item(id: &str, category: &str, cents: u32) -> MenuItem {
        MenuItem {
            id: MenuItemId::new(id),
            name: id.to_owned(),
            price: Price::from_cents(cents),
            description: String::new(),
            category: category.to_owned(),
            popular: false,
            dietary: Vec::new(),
            image: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::fixtures::{menu_item, vendor};
    use super::*;

    const BACKEND_VENDOR: &str = r#"{
        "id": "v1",
        "name": "Maria Lopez",
        "businessName": "Taco Loco",
        "description": "Authentic street tacos",
        "cuisineType": "Mexican",
        "contactInfo": {"phone": "555-0100", "email": "maria@example.com"},
        "locations": [{
            "id": "l1",
            "coordinates": {"lat": 40.7128, "lng": -74.006},
            "address": "Broadway & 4th",
            "schedules": [{"day": "Monday", "open": "11:00", "close": "20:00"}]
        }],
        "menu": [
            {"id": "m1", "name": "Al Pastor", "price": 3.5, "description": "", "category": "Tacos", "popular": true},
            {"id": "m2", "name": "Horchata", "price": 2, "description": "", "category": "Drinks", "dietary": ["vegetarian"]}
        ],
        "images": ["https://img.example.com/taco.jpg"],
        "paymentMethods": ["Cash", "Card"],
        "ratings": {"average": 4.7, "count": 128},
        "reviews": [{"id": "r1", "userId": "u1", "userName": "Sarah", "rating": 5, "comment": "Great", "date": "2024-05-01"}],
        "isOpen": true
    }"#;

    #[test]
    fn test_deserialize_backend_vendor() {
        let vendor: Vendor = serde_json::from_str(BACKEND_VENDOR).unwrap();
        assert_eq!(vendor.business_name, "Taco Loco");
        assert_eq!(vendor.cuisine_type, CuisineType::Mexican);
        assert_eq!(vendor.menu.len(), 2);
        assert!(vendor.menu.first().unwrap().popular);
        assert_eq!(vendor.payment_methods, vec![PaymentMethod::Cash, PaymentMethod::Card]);
        assert!(vendor.validate().is_ok());
        assert_eq!(
            vendor.primary_location().unwrap().schedule_for(Day::Monday).unwrap().open,
            "11:00"
        );
    }

    #[test]
    fn test_validate_rejects_empty_locations() {
        let mut v = vendor("v1", CuisineType::Thai, Coordinate::new(0.0, 0.0));
        v.locations.clear();
        assert!(matches!(v.validate(), Err(VendorError::NoLocations(_))));
    }

    #[test]
    fn test_validate_rejects_rating_out_of_range() {
        let mut v = vendor("v1", CuisineType::Thai, Coordinate::new(0.0, 0.0));
        v.ratings.average = 5.1;
        assert!(matches!(v.validate(), Err(VendorError::RatingOutOfRange { .. })));
        v.ratings.average = f64::NAN;
        assert!(v.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_category() {
        let mut v = vendor("v1", CuisineType::Thai, Coordinate::new(0.0, 0.0));
        v.menu.push(menu_item("m1", "  ", 500));
        assert!(matches!(
            v.validate(),
            Err(VendorError::UncategorizedMenuItem { .. })
        ));
    }

    #[test]
    fn test_menu_categories_first_seen_order() {
        let mut v = vendor("v1", CuisineType::Thai, Coordinate::new(0.0, 0.0));
        v.menu = vec![
            menu_item("m1", "Noodles", 900),
            menu_item("m2", "Drinks", 300),
            menu_item("m3", "Noodles", 1100),
        ];
        assert_eq!(v.menu_categories(), vec!["Noodles", "Drinks"]);
        assert_eq!(v.menu_in_category(Some("Noodles")).len(), 2);
        assert_eq!(v.menu_in_category(None).len(), 3);
        assert!(v.menu_in_category(Some("Desserts")).is_empty());
    }

    #[test]
    fn test_cuisine_from_str_case_insensitive() {
        assert_eq!("thai".parse::<CuisineType>().unwrap(), CuisineType::Thai);
        assert_eq!(" Mexican ".parse::<CuisineType>().unwrap(), CuisineType::Mexican);
        assert!("Martian".parse::<CuisineType>().is_err());
    }

    #[test]
    fn test_day_from_weekday() {
        assert_eq!(Day::from(chrono::Weekday::Sat), Day::Saturday);
        assert_eq!(Day::Sunday.to_string(), "Sunday");
    }
}
