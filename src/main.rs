use anyhow::Result;
use serde_json::json;

use quakemap::export::write_outputs;
use quakemap::feed::HttpFeed;
use quakemap::logging::{log, log_build_summary, obj, v_str, Domain, Level};
use quakemap::pipeline::{base_surface, populate};
use quakemap::state::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    cfg.validate()?;
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("feed_url", v_str(&cfg.feed_url)),
            ("zoom", json!(cfg.zoom)),
            ("output", v_str(&cfg.output_path.to_string_lossy())),
            ("malformed", v_str(&format!("{:?}", cfg.malformed).to_lowercase())),
        ]),
    );

    let mut surface = base_surface(&cfg);
    let feed = HttpFeed::new(cfg.feed_url.clone(), cfg.http_timeout_secs);
    let result = populate(&mut surface, &feed, cfg.malformed).await;

    // The page is written either way; on failure it shows the base map and legend.
    let geojson_path = cfg.write_geojson.then(|| cfg.geojson_path());
    write_outputs(&surface, &cfg.output_path, geojson_path.as_deref())?;

    match result {
        Ok(stats) => {
            log_build_summary(
                stats.features,
                stats.markers,
                stats.skipped,
                &cfg.output_path.to_string_lossy(),
            );
            Ok(())
        }
        Err(err) => {
            log(
                Level::Error,
                Domain::Feed,
                "build_failed",
                obj(&[("msg", v_str(&err.to_string())), ("url", v_str(feed.url()))]),
            );
            Err(err.into())
        }
    }
}
