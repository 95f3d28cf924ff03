//! The map being assembled: base view, tile layer, markers and controls.
//!
//! Builders never touch a global map; they receive a [`RenderSurface`] and
//! push elements onto it. [`MapSurface`] is the in-memory implementation that
//! the exporters read back.

use serde::Serialize;

use crate::style::MarkerStyle;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Initial camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapView {
    pub center: LatLng,
    pub zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileLayer {
    pub url_template: String,
    pub max_zoom: u8,
    pub attribution: String,
}

/// HTML shown when a marker is clicked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircleMarker {
    pub position: LatLng,
    pub style: MarkerStyle,
    pub popup: Popup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ControlPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlPosition::TopLeft => "topleft",
            ControlPosition::TopRight => "topright",
            ControlPosition::BottomLeft => "bottomleft",
            ControlPosition::BottomRight => "bottomright",
        }
    }
}

/// Fixed overlay holding prebuilt HTML, anchored to a corner of the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendControl {
    pub position: ControlPosition,
    pub css_class: String,
    pub html: String,
}

pub trait RenderSurface {
    fn add_marker(&mut self, marker: CircleMarker);
    fn add_control(&mut self, control: LegendControl);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSurface {
    pub view: MapView,
    pub tiles: TileLayer,
    markers: Vec<CircleMarker>,
    controls: Vec<LegendControl>,
}

impl MapSurface {
    pub fn new(view: MapView, tiles: TileLayer) -> Self {
        Self {
            view,
            tiles,
            markers: Vec::new(),
            controls: Vec::new(),
        }
    }

    pub fn markers(&self) -> &[CircleMarker] {
        &self.markers
    }

    pub fn controls(&self) -> &[LegendControl] {
        &self.controls
    }
}

impl RenderSurface for MapSurface {
    fn add_marker(&mut self, marker: CircleMarker) {
        self.markers.push(marker);
    }

    fn add_control(&mut self, control: LegendControl) {
        self.controls.push(control);
    }
}
