//! Placing vendor markers on the map panel.
//!
//! The discover page draws markers over a static panel centered on the
//! reference location. Positions are percentages of the panel so the page
//! needs no map tiles.

use serde::Serialize;

use crate::geo::Coordinate;
use crate::types::VendorId;
use crate::vendor::Vendor;

pub const DEFAULT_ZOOM: u8 = 15;
pub const MIN_ZOOM: u8 = 10;
pub const MAX_ZOOM: u8 = 20;

/// Markers never leave this band of the panel, in percent.
const EDGE_MIN: f64 = 10.0;
const EDGE_MAX: f64 = 90.0;

/// Percent per degree at the default zoom.
const BASE_SCALE: f64 = 2000.0;

/// One vendor pin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub id: VendorId,
    pub name: String,
    pub position: Option<Coordinate>,
}

impl From<&Vendor> for MapMarker {
    fn from(vendor: &Vendor) -> Self {
        Self {
            id: vendor.id.clone(),
            name: vendor.business_name.clone(),
            position: vendor.position(),
        }
    }
}

/// Offset of a marker from the top-left of the panel, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PanelPoint {
    pub top: f64,
    pub left: f64,
}

impl PanelPoint {
    pub const CENTER: Self = Self {
        top: 50.0,
        left: 50.0,
    };
}

/// The visible map: a center and a zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapViewport {
    pub center: Option<Coordinate>,
    zoom: u8,
}

impl Default for MapViewport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl MapViewport {
    #[must_use]
    pub const fn new(center: Option<Coordinate>) -> Self {
        Self {
            center,
            zoom: DEFAULT_ZOOM,
        }
    }

    /// Start at `zoom`, clamped to the supported range.
    #[must_use]
    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self
    }

    #[must_use]
    pub const fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + 1).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.zoom.saturating_sub(1).max(MIN_ZOOM);
    }

    /// Where `marker` sits on the panel.
    ///
    /// North is up. Without a center, or for a marker with no usable
    /// position, the marker sits in the middle.
    #[must_use]
    pub fn project(&self, marker: &MapMarker) -> PanelPoint {
        let (Some(center), Some(position)) = (self.center, marker.position) else {
            return PanelPoint::CENTER;
        };
        if !center.is_finite() || !position.is_finite() {
            return PanelPoint::CENTER;
        }

        let scale = BASE_SCALE * f64::from(self.zoom) / f64::from(DEFAULT_ZOOM);
        let top = 50.0 - (position.lat - center.lat) * scale;
        let left = 50.0 + (position.lng - center.lng) * scale;

        PanelPoint {
            top: top.clamp(EDGE_MIN, EDGE_MAX),
            left: left.clamp(EDGE_MIN, EDGE_MAX),
        }
    }
}
