use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::logging::{log, obj, v_num, v_str, Domain, Level};

/// Placeholder used when the feed carries a null or missing `place`.
pub const UNKNOWN_PLACE: &str = "Unknown location";

// Wire schema of the summary feed. Features are kept as loose JSON so a wrong
// type in one feature is reported by `from_feature` instead of failing the
// whole document at decode time.

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct Feature {
    /// GeoJSON allows string or numeric ids; numbers are kept as their text.
    pub id: Option<String>,
    pub geometry: Value,
    pub properties: Value,
}

impl From<Value> for Feature {
    fn from(value: Value) -> Self {
        let Value::Object(mut map) = value else {
            return Feature::default();
        };
        let id = match map.remove("id") {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        Feature {
            id,
            geometry: map.remove("geometry").unwrap_or(Value::Null),
            properties: map.remove("properties").unwrap_or(Value::Null),
        }
    }
}

/// One validated earthquake event.
#[derive(Debug, Clone, PartialEq)]
pub struct EarthquakeRecord {
    pub longitude: f64,
    pub latitude: f64,
    /// Kilometres below the surface.
    pub depth: f64,
    pub magnitude: f64,
    pub place: String,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("malformed record: no geometry")]
    MissingGeometry,
    #[error("malformed record: expected 3 finite coordinates, found {found} usable")]
    BadCoordinates { found: usize },
    #[error("malformed record: missing magnitude")]
    MissingMagnitude,
}

fn finite(v: &Value) -> Option<f64> {
    v.as_f64().filter(|x| x.is_finite())
}

impl EarthquakeRecord {
    pub fn from_feature(feature: &Feature) -> Result<Self, RecordError> {
        let geometry = feature
            .geometry
            .as_object()
            .ok_or(RecordError::MissingGeometry)?;
        let coords: Vec<f64> = geometry
            .get("coordinates")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().take(3).map_while(finite).collect())
            .unwrap_or_default();
        let &[longitude, latitude, depth] = coords.as_slice() else {
            return Err(RecordError::BadCoordinates { found: coords.len() });
        };
        let magnitude = feature
            .properties
            .get("mag")
            .and_then(finite)
            .ok_or(RecordError::MissingMagnitude)?;
        let place = feature
            .properties
            .get("place")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_PLACE)
            .to_string();

        Ok(Self {
            longitude,
            latitude,
            depth,
            magnitude,
            place,
        })
    }
}

/// What to do when a feature fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Drop the feature, log it and keep going.
    #[default]
    Skip,
    /// Abort on the first malformed feature.
    Fail,
}

impl MalformedPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Some(MalformedPolicy::Skip),
            "fail" => Some(MalformedPolicy::Fail),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParsedFeed {
    pub records: Vec<EarthquakeRecord>,
    pub skipped: usize,
}

/// Error for a feature rejected under [`MalformedPolicy::Fail`].
#[derive(Debug, Clone, PartialEq, Error)]
#[error("feature {index} ({}): {cause}", .feature_id.as_deref().unwrap_or("no id"))]
pub struct BatchError {
    pub index: usize,
    pub feature_id: Option<String>,
    pub cause: RecordError,
}

/// Validate every feature, preserving feed order.
pub fn parse_collection(
    collection: &FeatureCollection,
    policy: MalformedPolicy,
) -> Result<ParsedFeed, BatchError> {
    let mut parsed = ParsedFeed {
        records: Vec::with_capacity(collection.features.len()),
        skipped: 0,
    };
    for (index, feature) in collection.features.iter().enumerate() {
        match EarthquakeRecord::from_feature(feature) {
            Ok(record) => parsed.records.push(record),
            Err(cause) => {
                let feature_id = feature.id.clone();
                if policy == MalformedPolicy::Fail {
                    return Err(BatchError { index, feature_id, cause });
                }
                log(
                    Level::Warn,
                    Domain::Parse,
                    "record_skipped",
                    obj(&[
                        ("index", v_num(index as f64)),
                        ("feature_id", v_str(feature_id.as_deref().unwrap_or(""))),
                        ("reason", v_str(&cause.to_string())),
                    ]),
                );
                parsed.skipped += 1;
            }
        }
    }
    Ok(parsed)
}
