//! Street Bite Core - domain library.
//!
//! Everything the web front end needs that does not touch the network:
//! vendor records, the discovery filter/sort engine, the registration
//! wizard, favorites and the map projection.
//!
//! # Architecture
//!
//! No I/O, no HTTP clients, no clocks except where passed in. The `web`
//! crate owns sessions, the vendor service client and geolocation.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails and users
//! - [`geo`] - Coordinates and haversine distance
//! - [`vendor`] - Vendor listings, menus, schedules and reviews
//! - [`discovery`] - Search, cuisine, distance and open-now filtering
//! - [`registration`] - Four-step vendor registration wizard
//! - [`favorites`] - Saved vendor set
//! - [`map`] - Marker placement on the map panel

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod discovery;
pub mod favorites;
pub mod geo;
pub mod map;
pub mod registration;
pub mod types;
pub mod vendor;

pub use discovery::{CuisineSet, Discovered, DistanceBand, FilterOptions, discover, featured};
pub use favorites::Favorites;
pub use geo::{Coordinate, distance_miles};
pub use map::{MapMarker, MapViewport, PanelPoint};
pub use registration::{Back, DraftField, MenuImage, RegistrationDraft, RegistrationWizard, WizardError, WizardStep};
pub use types::*;
pub use vendor::{CuisineType, Day, Location, MenuItem, Review, Vendor, VendorError};
