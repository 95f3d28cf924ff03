//! Turns a populated [`MapSurface`] into files a browser or GIS tool can open.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::{log, obj, v_str, Domain, Level};
use crate::surface::MapSurface;

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";

const PAGE_STYLE: &str = "html, body, #map { height: 100%; margin: 0; }
.info { padding: 6px 8px; background: rgba(255,255,255,0.8); border-radius: 5px; \
box-shadow: 0 0 15px rgba(0,0,0,0.2); font: 14px/16px Arial, Helvetica, sans-serif; }
.legend { line-height: 18px; color: #555; }
.legend i { width: 18px; height: 18px; float: left; margin-right: 8px; opacity: 0.7; }";

// Leaflet glue: replays the surface contents captured in MAP_DATA.
const PAGE_SCRIPT: &str = "const map = L.map('map').setView(MAP_DATA.view.center, MAP_DATA.view.zoom);
L.tileLayer(MAP_DATA.tiles.urlTemplate, {
    maxZoom: MAP_DATA.tiles.maxZoom,
    attribution: MAP_DATA.tiles.attribution
}).addTo(map);
for (const m of MAP_DATA.markers) {
    L.circleMarker(m.position, m.style).bindPopup(m.popup).addTo(map);
}
for (const c of MAP_DATA.controls) {
    const control = L.control({ position: c.position });
    control.onAdd = function () {
        const div = L.DomUtil.create('div', c.cssClass);
        div.innerHTML = c.html;
        return div;
    };
    control.addTo(map);
}";

/// Plain JSON view of the surface consumed by the page script.
fn page_data(surface: &MapSurface) -> Value {
    let markers: Vec<Value> = surface
        .markers()
        .iter()
        .map(|m| {
            json!({
                "position": [m.position.lat, m.position.lng],
                "style": m.style,
                "popup": m.popup.html,
            })
        })
        .collect();
    json!({
        "view": {
            "center": [surface.view.center.lat, surface.view.center.lng],
            "zoom": surface.view.zoom,
        },
        "tiles": surface.tiles,
        "markers": markers,
        "controls": surface.controls(),
    })
}

/// Standalone Leaflet page reproducing the surface.
pub fn to_html(surface: &MapSurface) -> String {
    // "</" inside a script block would end it early.
    let data = page_data(surface).to_string().replace("</", "<\\/");
    format!(
        "<!DOCTYPE html>
<html>
<head>
<meta charset=\"utf-8\">
<title>Earthquakes</title>
<link rel=\"stylesheet\" href=\"{css}\">
<style>
{style}
</style>
</head>
<body>
<div id=\"map\"></div>
<script src=\"{js}\"></script>
<script>
const MAP_DATA = {data};
{script}
</script>
</body>
</html>
",
        css = LEAFLET_CSS,
        style = PAGE_STYLE,
        js = LEAFLET_JS,
        data = data,
        script = PAGE_SCRIPT,
    )
}

/// Markers as GeoJSON points with their paint attached as properties.
pub fn to_geojson(surface: &MapSurface) -> Value {
    let features: Vec<Value> = surface
        .markers()
        .iter()
        .map(|m| {
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [m.position.lng, m.position.lat],
                },
                "properties": {
                    "style": m.style,
                    "popup": m.popup.html,
                },
            })
        })
        .collect();
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
    log(
        Level::Info,
        Domain::Render,
        "output_written",
        obj(&[("path", v_str(&path.to_string_lossy()))]),
    );
    Ok(())
}

/// Write the HTML page and, if `geojson_path` is set, the GeoJSON sidecar.
/// Returns every path written.
pub fn write_outputs(
    surface: &MapSurface,
    html_path: &Path,
    geojson_path: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    write_file(html_path, &to_html(surface))?;
    written.push(html_path.to_path_buf());
    if let Some(path) = geojson_path {
        let body = serde_json::to_string_pretty(&to_geojson(surface))?;
        write_file(path, &body)?;
        written.push(path.to_path_buf());
    }
    Ok(written)
}
