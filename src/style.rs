//! Depth and magnitude to visual encoding.
//!
//! The tier table is shared by the marker pass and the legend so both always
//! agree on which color a depth maps to.

use serde::Serialize;

/// One row of the depth threshold table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DepthTier {
    /// Depths strictly above this boundary (km) get `color`.
    pub boundary: f64,
    pub color: &'static str,
}

/// Depth tiers in descending boundary order. The last row is the floor:
/// its boundary is only used for the legend, any depth not above 10 km
/// falls into it.
pub const DEPTH_TIERS: [DepthTier; 6] = [
    DepthTier { boundary: 90.0, color: "#d73027" },
    DepthTier { boundary: 70.0, color: "#fc8d59" },
    DepthTier { boundary: 50.0, color: "#fee08b" },
    DepthTier { boundary: 30.0, color: "#d9ef8b" },
    DepthTier { boundary: 10.0, color: "#91cf60" },
    DepthTier { boundary: -10.0, color: "#1a9850" },
];

/// Marker radius per unit of magnitude.
pub const RADIUS_SCALE: f64 = 4.0;

pub const STROKE_COLOR: &str = "#000";
pub const STROKE_WEIGHT: f64 = 0.5;
pub const STROKE_OPACITY: f64 = 1.0;
pub const FILL_OPACITY: f64 = 0.7;

/// Color for an event at `depth` km. Total over all reals, NaN included
/// (it compares false everywhere and lands in the floor tier).
pub fn depth_color(depth: f64) -> &'static str {
    let (tiers, floor) = DEPTH_TIERS.split_at(DEPTH_TIERS.len() - 1);
    tiers
        .iter()
        .find(|tier| depth > tier.boundary)
        .unwrap_or(&floor[0])
        .color
}

/// Marker radius for `magnitude`. Not clamped: zero or negative magnitudes
/// give zero or negative radii and the renderer decides what to do with them.
pub fn magnitude_radius(magnitude: f64) -> f64 {
    magnitude * RADIUS_SCALE
}

/// Paint parameters for one circle marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    pub radius: f64,
    pub fill_color: &'static str,
    #[serde(rename = "color")]
    pub stroke_color: &'static str,
    #[serde(rename = "weight")]
    pub stroke_weight: f64,
    pub opacity: f64,
    pub fill_opacity: f64,
}

impl MarkerStyle {
    pub fn for_event(depth: f64, magnitude: f64) -> Self {
        Self {
            radius: magnitude_radius(magnitude),
            fill_color: depth_color(depth),
            stroke_color: STROKE_COLOR,
            stroke_weight: STROKE_WEIGHT,
            opacity: STROKE_OPACITY,
            fill_opacity: FILL_OPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_strictly_decreasing() {
        for pair in DEPTH_TIERS.windows(2) {
            assert!(pair[0].boundary > pair[1].boundary);
        }
    }

    #[test]
    fn boundary_is_exclusive() {
        assert_eq!(depth_color(90.0001), "#d73027");
        assert_eq!(depth_color(90.0), "#fc8d59");
        assert_eq!(depth_color(70.0), "#fee08b");
        assert_eq!(depth_color(10.0001), "#91cf60");
        assert_eq!(depth_color(10.0), "#1a9850");
    }

    #[test]
    fn negative_and_nan_depths_are_shallow() {
        assert_eq!(depth_color(-5.0), "#1a9850");
        assert_eq!(depth_color(-500.0), "#1a9850");
        assert_eq!(depth_color(f64::NAN), "#1a9850");
    }

    #[test]
    fn every_depth_maps_into_palette() {
        let palette: Vec<&str> = DEPTH_TIERS.iter().map(|t| t.color).collect();
        let mut d = -50.0;
        while d < 700.0 {
            assert!(palette.contains(&depth_color(d)), "depth {}", d);
            d += 2.5;
        }
    }

    #[test]
    fn radius_is_linear() {
        assert_eq!(magnitude_radius(5.2), 20.8);
        assert_eq!(magnitude_radius(4.5), 18.0);
        assert_eq!(magnitude_radius(0.0), 0.0);
        assert_eq!(magnitude_radius(-1.0), -4.0);
    }

    #[test]
    fn style_serializes_with_leaflet_keys() {
        let style = MarkerStyle::for_event(12.0, 4.5);
        let v = serde_json::to_value(&style).unwrap();
        assert_eq!(v["radius"], 18.0);
        assert_eq!(v["fillColor"], "#91cf60");
        assert_eq!(v["color"], "#000");
        assert_eq!(v["weight"], 0.5);
        assert_eq!(v["fillOpacity"], 0.7);
    }
}
