//! Depth legend, derived from the same tier table the markers use.

use serde::Serialize;

use crate::logging::{log, obj, v_num, v_str, Domain, Level};
use crate::markers::escape_html;
use crate::style::{depth_color, DEPTH_TIERS};
use crate::surface::{ControlPosition, LegendControl, RenderSurface};

pub const LEGEND_POSITION: ControlPosition = ControlPosition::BottomRight;
pub const LEGEND_CLASS: &str = "info legend";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    pub color_sample: &'static str,
    pub range_label: String,
}

/// One entry per tier, shallowest first. Each swatch is sampled just inside
/// its range (boundary + 1 km) so it goes through the classifier rather than
/// reading the table directly.
pub fn legend_entries() -> Vec<LegendEntry> {
    let ascending: Vec<f64> = DEPTH_TIERS.iter().rev().map(|t| t.boundary).collect();
    ascending
        .iter()
        .enumerate()
        .map(|(i, &lower)| LegendEntry {
            color_sample: depth_color(lower + 1.0),
            range_label: range_label(lower, ascending.get(i + 1).copied()),
        })
        .collect()
}

fn range_label(lower: f64, upper: Option<f64>) -> String {
    match upper {
        Some(upper) => format!("{}\u{2013}{}", lower, upper),
        None => format!("{}+", lower),
    }
}

pub fn legend_html(entries: &[LegendEntry]) -> String {
    entries
        .iter()
        .map(|e| {
            format!(
                "<i style=\"background:{}\"></i> {}<br>",
                e.color_sample,
                escape_html(&e.range_label)
            )
        })
        .collect()
}

/// Attach the legend control. Independent of any fetched data.
pub fn build_legend<S: RenderSurface + ?Sized>(surface: &mut S) -> Vec<LegendEntry> {
    let entries = legend_entries();
    surface.add_control(LegendControl {
        position: LEGEND_POSITION,
        css_class: LEGEND_CLASS.to_string(),
        html: legend_html(&entries),
    });
    log(
        Level::Debug,
        Domain::Legend,
        "legend_added",
        obj(&[
            ("entries", v_num(entries.len() as f64)),
            ("position", v_str(LEGEND_POSITION.as_str())),
        ]),
    );
    entries
}
