//! Fetch, validate and draw: the single pass that fills a map.

use thiserror::Error;

use crate::feed::{FeedError, FeedSource};
use crate::legend::build_legend;
use crate::logging::{log, obj, v_str, Domain, Level, ProfileScope};
use crate::markers::build_markers;
use crate::quake::{parse_collection, BatchError, MalformedPolicy};
use crate::state::Config;
use crate::surface::MapSurface;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error("rejected feed: {0}")]
    Malformed(#[from] BatchError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStats {
    pub features: usize,
    pub markers: usize,
    pub skipped: usize,
    pub sha256: String,
}

/// Base map with view, tiles and the legend. Needs no feed data.
pub fn base_surface(cfg: &Config) -> MapSurface {
    let mut surface = MapSurface::new(cfg.view(), cfg.tile_layer());
    build_legend(&mut surface);
    surface
}

/// Fetch once and add one marker per valid feature. Nothing is added to the
/// surface unless the whole feed was accepted under `policy`.
pub async fn populate(
    surface: &mut MapSurface,
    feed: &(dyn FeedSource + Send + Sync),
    policy: MalformedPolicy,
) -> Result<BuildStats, BuildError> {
    let payload = feed.fetch().await?;
    let parsed = {
        let _scope = ProfileScope::new("parse_feed");
        parse_collection(&payload.collection, policy)?
    };
    if parsed.skipped > 0 {
        log(
            Level::Warn,
            Domain::Parse,
            "features_skipped",
            obj(&[
                ("skipped", serde_json::json!(parsed.skipped)),
                ("sha256", v_str(&payload.sha256)),
            ]),
        );
    }
    let markers = build_markers(&parsed.records, surface);
    Ok(BuildStats {
        features: payload.collection.features.len(),
        markers,
        skipped: parsed.skipped,
        sha256: payload.sha256,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::StaticFeed;

    #[test]
    fn legend_present_before_any_fetch() {
        let surface = base_surface(&Config::default());
        assert_eq!(surface.controls().len(), 1);
        assert!(surface.markers().is_empty());
    }

    #[tokio::test]
    async fn decode_failure_leaves_surface_untouched() {
        let mut surface = base_surface(&Config::default());
        let feed = StaticFeed::new("not json");
        let err = populate(&mut surface, &feed, MalformedPolicy::Skip)
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::Feed(FeedError::Decode(_))));
        assert!(surface.markers().is_empty());
        assert_eq!(surface.controls().len(), 1);
    }
}
