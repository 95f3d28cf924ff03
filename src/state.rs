use std::path::PathBuf;
use thiserror::Error;

use crate::quake::MalformedPolicy;
use crate::surface::{LatLng, MapView, TileLayer};

pub const FEED_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_week.geojson";
pub const CENTER: LatLng = LatLng { lat: 37.09, lng: -95.71 };
pub const ZOOM: u8 = 5;
pub const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_MAX_ZOOM: u8 = 18;
pub const TILE_ATTRIBUTION: &str = "© OpenStreetMap contributors";

#[derive(Debug, Clone)]
pub struct Config {
    pub feed_url: String,
    pub center: LatLng,
    pub zoom: u8,
    pub tile_url: String,
    pub tile_max_zoom: u8,
    pub tile_attribution: String,
    /// HTML output; the GeoJSON sidecar uses the same stem.
    pub output_path: PathBuf,
    pub write_geojson: bool,
    pub malformed: MalformedPolicy,
    pub http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: FEED_URL.to_string(),
            center: CENTER,
            zoom: ZOOM,
            tile_url: TILE_URL.to_string(),
            tile_max_zoom: TILE_MAX_ZOOM,
            tile_attribution: TILE_ATTRIBUTION.to_string(),
            output_path: PathBuf::from("quakemap.html"),
            write_geojson: false,
            malformed: MalformedPolicy::Skip,
            http_timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset or unparsable keys keep defaults.
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let num = |key: &str| get(key).and_then(|v| v.trim().parse::<f64>().ok());
        Self {
            feed_url: get("QUAKE_FEED_URL").unwrap_or(d.feed_url),
            center: LatLng {
                lat: num("QUAKE_CENTER_LAT").unwrap_or(d.center.lat),
                lng: num("QUAKE_CENTER_LON").unwrap_or(d.center.lng),
            },
            zoom: get("QUAKE_ZOOM").and_then(|v| v.parse().ok()).unwrap_or(d.zoom),
            tile_url: get("QUAKE_TILE_URL").unwrap_or(d.tile_url),
            tile_max_zoom: d.tile_max_zoom,
            tile_attribution: d.tile_attribution,
            output_path: get("QUAKE_OUTPUT").map(PathBuf::from).unwrap_or(d.output_path),
            write_geojson: get("QUAKE_GEOJSON")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(d.write_geojson),
            malformed: get("QUAKE_MALFORMED")
                .and_then(|v| MalformedPolicy::parse(&v))
                .unwrap_or(d.malformed),
            http_timeout_secs: get("QUAKE_HTTP_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(d.http_timeout_secs),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = url::Url::parse(&self.feed_url)
            .map_err(|e| ConfigError::FeedUrl(format!("{}: {}", self.feed_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::FeedUrl(format!(
                "{}: unsupported scheme {}",
                self.feed_url,
                url.scheme()
            )));
        }
        if self.zoom > self.tile_max_zoom {
            return Err(ConfigError::Zoom {
                zoom: self.zoom,
                max: self.tile_max_zoom,
            });
        }
        let lat_ok = (-90.0..=90.0).contains(&self.center.lat);
        let lng_ok = (-180.0..=180.0).contains(&self.center.lng);
        if !lat_ok || !lng_ok {
            return Err(ConfigError::Center(self.center));
        }
        Ok(())
    }

    pub fn view(&self) -> MapView {
        MapView {
            center: self.center,
            zoom: self.zoom,
        }
    }

    pub fn tile_layer(&self) -> TileLayer {
        TileLayer {
            url_template: self.tile_url.clone(),
            max_zoom: self.tile_max_zoom,
            attribution: self.tile_attribution.clone(),
        }
    }

    pub fn geojson_path(&self) -> PathBuf {
        self.output_path.with_extension("geojson")
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid feed url {0}")]
    FeedUrl(String),
    #[error("zoom {zoom} exceeds tile max {max}")]
    Zoom { zoom: u8, max: u8 },
    #[error("center ({}, {}) out of range", .0.lat, .0.lng)]
    Center(LatLng),
}
