use crate::logging::{log, obj, v_num, v_str, Domain, Level, ProfileScope};
use crate::quake::EarthquakeRecord;
use crate::style::MarkerStyle;
use crate::surface::{CircleMarker, LatLng, Popup, RenderSurface};

/// Add one styled circle marker per record, in input order. Returns the number
/// of markers added.
pub fn build_markers<S: RenderSurface + ?Sized>(
    records: &[EarthquakeRecord],
    surface: &mut S,
) -> usize {
    let _scope =
        ProfileScope::with_context("build_markers", &[("records", v_num(records.len() as f64))]);
    for record in records {
        surface.add_marker(marker_for(record));
        log(
            Level::Trace,
            Domain::Render,
            "marker_added",
            obj(&[
                ("place", v_str(&record.place)),
                ("mag", v_num(record.magnitude)),
                ("depth", v_num(record.depth)),
            ]),
        );
    }
    records.len()
}

pub fn marker_for(record: &EarthquakeRecord) -> CircleMarker {
    CircleMarker {
        position: LatLng {
            lat: record.latitude,
            lng: record.longitude,
        },
        style: MarkerStyle::for_event(record.depth, record.magnitude),
        popup: Popup {
            html: popup_label(record),
        },
    }
}

/// Popup body: place as heading, then magnitude and depth.
pub fn popup_label(record: &EarthquakeRecord) -> String {
    format!(
        "<h3>{}</h3><hr><p>Magnitude: {}</p><p>Depth: {} km</p>",
        escape_html(&record.place),
        display_number(record.magnitude),
        display_number(record.depth)
    )
}

/// Negative zero prints as `0`.
fn display_number(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(place: &str, depth: f64, magnitude: f64) -> EarthquakeRecord {
        EarthquakeRecord {
            longitude: -122.4,
            latitude: 37.8,
            depth,
            magnitude,
            place: place.to_string(),
        }
    }

    #[derive(Default)]
    struct Recorder {
        markers: Vec<CircleMarker>,
    }

    impl RenderSurface for Recorder {
        fn add_marker(&mut self, marker: CircleMarker) {
            self.markers.push(marker);
        }

        fn add_control(&mut self, _control: crate::surface::LegendControl) {
            panic!("marker builder must not add controls");
        }
    }

    #[test]
    fn marker_is_placed_lat_first() {
        let m = marker_for(&record("Test", 12.0, 4.5));
        assert_eq!(m.position, LatLng { lat: 37.8, lng: -122.4 });
        assert_eq!(m.style.radius, 18.0);
        assert_eq!(m.style.fill_color, "#91cf60");
        assert_eq!(m.style.stroke_color, "#000");
    }

    #[test]
    fn popup_has_place_magnitude_depth() {
        let label = popup_label(&record("Test", 12.0, 4.5));
        assert_eq!(
            label,
            "<h3>Test</h3><hr><p>Magnitude: 4.5</p><p>Depth: 12 km</p>"
        );
    }

    #[test]
    fn popup_prints_negative_zero_as_zero() {
        let label = popup_label(&record("Surface", -0.0, 2.0));
        assert!(label.contains("<p>Depth: 0 km</p>"), "{}", label);
        let label = popup_label(&record("Shallow", -0.5, 2.0));
        assert!(label.contains("<p>Depth: -0.5 km</p>"));
    }

    #[test]
    fn popup_escapes_place() {
        let label = popup_label(&record("<b>Ridge & Co</b>", 1.0, 1.0));
        assert!(label.contains("&lt;b&gt;Ridge &amp; Co&lt;/b&gt;"));
    }

    #[test]
    fn one_marker_per_record_in_order() {
        let records = vec![
            record("first", 95.0, 6.0),
            record("second", 5.0, 2.0),
            record("third", 40.0, 3.1),
        ];
        let mut rec = Recorder::default();
        assert_eq!(build_markers(&records, &mut rec), 3);
        let colors: Vec<&str> = rec.markers.iter().map(|m| m.style.fill_color).collect();
        assert_eq!(colors, vec!["#d73027", "#1a9850", "#d9ef8b"]);
        assert!(rec.markers[1].popup.html.contains("second"));
    }

    #[test]
    fn empty_input_adds_nothing() {
        let mut rec = Recorder::default();
        assert_eq!(build_markers(&[], &mut rec), 0);
        assert!(rec.markers.is_empty());
    }
}
