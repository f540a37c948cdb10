//! Vendor discovery: search, filter and distance ordering.
//!
//! [`discover`] derives the displayed vendor list from the full collection,
//! the current [`FilterOptions`] and an optional reference coordinate. It
//! never mutates vendors and returns the same sequence for the same inputs.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geo::{Coordinate, distance_miles};
use crate::vendor::{CuisineType, Vendor};

/// Rating a vendor needs to be featured on the home page.
pub const FEATURED_MIN_RATING: f64 = 4.6;

/// Number of vendors featured on the home page.
pub const FEATURED_LIMIT: usize = 4;

/// Maximum-distance choices offered by the distance filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DistanceBand {
    HalfMile,
    OneMile,
    ThreeMiles,
    FiveMiles,
    #[default]
    TenMiles,
}

impl DistanceBand {
    /// Bands in ascending order.
    pub const ALL: [Self; 5] = [
        Self::HalfMile,
        Self::OneMile,
        Self::ThreeMiles,
        Self::FiveMiles,
        Self::TenMiles,
    ];

    /// The band's radius in miles.
    #[must_use]
    pub const fn miles(&self) -> f64 {
        match self {
            Self::HalfMile => 0.5,
            Self::OneMile => 1.0,
            Self::ThreeMiles => 3.0,
            Self::FiveMiles => 5.0,
            Self::TenMiles => 10.0,
        }
    }

    /// Form value, e.g. `"0.5"`.
    #[must_use]
    pub const fn value(&self) -> &'static str {
        match self {
            Self::HalfMile => "0.5",
            Self::OneMile => "1",
            Self::ThreeMiles => "3",
            Self::FiveMiles => "5",
            Self::TenMiles => "10",
        }
    }

    /// Human label, e.g. `"1 mile"`.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::HalfMile => "0.5 miles",
            Self::OneMile => "1 mile",
            Self::ThreeMiles => "3 miles",
            Self::FiveMiles => "5 miles",
            Self::TenMiles => "10 miles",
        }
    }

    /// Whether `distance` falls inside the band. NaN never does.
    #[must_use]
    pub fn contains(&self, distance: f64) -> bool {
        distance <= self.miles()
    }
}

impl fmt::Display for DistanceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error parsing a [`DistanceBand`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported distance band: {0}")]
pub struct ParseBandError(pub String);

impl FromStr for DistanceBand {
    type Err = ParseBandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(band) = Self::ALL.into_iter().find(|b| b.value() == s) {
            return Ok(band);
        }
        // Accept numeric spellings such as "1.0" or "3.00".
        let miles: f64 = s.parse().map_err(|_| ParseBandError(s.to_owned()))?;
        Self::ALL
            .into_iter()
            .find(|b| (b.miles() - miles).abs() < f64::EPSILON)
            .ok_or_else(|| ParseBandError(s.to_owned()))
    }
}

/// Selected cuisines, without duplicates, in selection order.
///
/// An empty set places no restriction on cuisine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CuisineSet(Vec<CuisineType>);

impl CuisineSet {
    /// An empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Add `cuisine` if missing. Returns whether it was added.
    pub fn insert(&mut self, cuisine: CuisineType) -> bool {
        if self.contains(cuisine) {
            return false;
        }
        self.0.push(cuisine);
        true
    }

    /// Checkbox semantics: add if absent, remove if present.
    pub fn toggle(&mut self, cuisine: CuisineType) {
        if self.contains(cuisine) {
            self.0.retain(|c| *c != cuisine);
        } else {
            self.0.push(cuisine);
        }
    }

    #[must_use]
    pub fn contains(&self, cuisine: CuisineType) -> bool {
        self.0.contains(&cuisine)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = CuisineType> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<CuisineType> for CuisineSet {
    fn from_iter<I: IntoIterator<Item = CuisineType>>(iter: I) -> Self {
        let mut set = Self::new();
        for cuisine in iter {
            set.insert(cuisine);
        }
        set
    }
}

/// Current discovery filters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterOptions {
    pub search: String,
    pub distance: DistanceBand,
    pub cuisine_types: CuisineSet,
    pub open_now: bool,
}

impl FilterOptions {
    fn matches_cuisine(&self, vendor: &Vendor) -> bool {
        self.cuisine_types.is_empty() || self.cuisine_types.contains(vendor.cuisine_type)
    }

    fn matches_open(&self, vendor: &Vendor) -> bool {
        !self.open_now || vendor.is_open
    }
}

/// `needle` is already trimmed and lowercased; empty matches everything.
fn matches_search(needle: &str, vendor: &Vendor) -> bool {
    needle.is_empty()
        || vendor.business_name.to_lowercase().contains(needle)
        || vendor.cuisine_type.as_str().to_lowercase().contains(needle)
        || vendor.description.to_lowercase().contains(needle)
}

/// A vendor that passed the filters, with its distance from the reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Discovered<'a> {
    pub vendor: &'a Vendor,
    /// Miles from the reference coordinate, when one was given.
    pub distance: Option<f64>,
}

/// Filter and order `vendors` for display.
///
/// All active predicates must hold:
/// - non-empty search text matches business name, cuisine or description,
///   case-insensitively;
/// - with a reference coordinate, the distance to the vendor's primary
///   location is within the selected band (skipped without a reference);
/// - a non-empty cuisine set contains the vendor's cuisine;
/// - `open_now` requires the vendor to be open.
///
/// With a reference the result is stably sorted by ascending distance,
/// otherwise the input order is kept.
#[must_use]
pub fn discover<'a>(
    vendors: &'a [Vendor],
    options: &FilterOptions,
    reference: Option<Coordinate>,
) -> Vec<Discovered<'a>> {
    let needle = options.search.trim().to_lowercase();

    let mut found: Vec<Discovered<'a>> = vendors
        .iter()
        .filter(|v| matches_search(&needle, v))
        .filter(|v| options.matches_cuisine(v))
        .filter(|v| options.matches_open(v))
        .filter_map(|vendor| match reference {
            None => Some(Discovered {
                vendor,
                distance: None,
            }),
            Some(origin) => {
                let distance = vendor.position().map(|p| distance_miles(origin, p))?;
                options.distance.contains(distance).then_some(Discovered {
                    vendor,
                    distance: Some(distance),
                })
            }
        })
        .collect();

    if reference.is_some() {
        // Every distance here passed `contains`, so none is NaN.
        found.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(core::cmp::Ordering::Equal)
        });
    }

    found
}

/// Highly rated vendors for the home page, in collection order.
#[must_use]
pub fn featured(vendors: &[Vendor], min_rating: f64, limit: usize) -> Vec<&Vendor> {
    vendors
        .iter()
        .filter(|v| v.ratings.average >= min_rating)
        .take(limit)
        .collect()
}

/// Distinct cuisines present in `vendors`, in first-seen order.
#[must_use]
pub fn available_cuisines(vendors: &[Vendor]) -> CuisineSet {
    vendors.iter().map(|v| v.cuisine_type).collect()
}
