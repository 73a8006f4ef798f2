//! Chart Plotter Module
//! Interactive dashboard charts using egui_plot, plus the shared color scales.

use crate::data::Metric;
use crate::stats::{StateReport, StateSummary};
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, Points};

/// Line colors of the progression metrics (Primary .. Graduation).
pub const TREND_COLORS: [(u8, u8, u8); 4] = [
    (0x7d, 0xd3, 0xfc),
    (0x38, 0xbd, 0xf8),
    (0x0e, 0xa5, 0xe9),
    (0x03, 0x69, 0xa1),
];

/// Nine-stop sequential "Blues" scale, light to dark.
pub const BLUES: [(u8, u8, u8); 9] = [
    (247, 251, 255),
    (222, 235, 247),
    (198, 219, 239),
    (158, 202, 225),
    (107, 174, 214),
    (66, 146, 198),
    (33, 113, 181),
    (8, 81, 156),
    (8, 48, 107),
];

/// Fill for regions without a value.
pub const NO_DATA: (u8, u8, u8) = (100, 116, 139);

pub const POSITIVE_COLOR: Color32 = Color32::from_rgb(40, 167, 69);
pub const NEGATIVE_COLOR: Color32 = Color32::from_rgb(220, 53, 69);
pub const HIGHLIGHT_COLOR: Color32 = Color32::from_rgb(250, 204, 21);

/// Sample the Blues scale at `t` in [0, 1]; NaN maps to [`NO_DATA`].
pub fn blues(t: f64) -> (u8, u8, u8) {
    if t.is_nan() {
        return NO_DATA;
    }
    let t = t.clamp(0.0, 1.0);
    let scaled = t * (BLUES.len() - 1) as f64;
    let lo = scaled.floor() as usize;
    let hi = (lo + 1).min(BLUES.len() - 1);
    let frac = scaled - lo as f64;

    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    let (a, b) = (BLUES[lo], BLUES[hi]);
    (lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

/// Position of `value` inside `range`, NaN when either is undefined.
pub fn normalize(value: f64, range: Option<(f64, f64)>) -> f64 {
    match range {
        _ if value.is_nan() => f64::NAN,
        Some((min, max)) if max > min => (value - min) / (max - min),
        Some(_) => 0.5,
        None => f64::NAN,
    }
}

pub fn to_color32(rgb: (u8, u8, u8)) -> Color32 {
    Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}

/// Green for gains, red for drops, gray when undefined.
pub fn delta_color(delta: f64) -> Color32 {
    if delta.is_nan() {
        Color32::GRAY
    } else if delta < 0.0 {
        NEGATIVE_COLOR
    } else {
        POSITIVE_COLOR
    }
}

/// One grid mark per category index.
fn category_marks(count: usize) -> Vec<GridMark> {
    (0..count)
        .map(|i| GridMark {
            value: i as f64,
            step_size: 1.0,
        })
        .collect()
}

/// Label of the category at an integer axis position.
fn category_label(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// Creates the interactive dashboard charts.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Line chart of the progression metrics across income classes.
    pub fn draw_trends_chart(ui: &mut egui::Ui, report: &StateReport) {
        ui.label(
            RichText::new(format!("Education Progression in {}", report.summary.state))
                .size(16.0)
                .strong(),
        );

        if report.records.is_empty() {
            ui.label(RichText::new("No records for this state").color(Color32::GRAY));
            return;
        }

        let classes: Vec<String> = report
            .records
            .iter()
            .map(|r| r.income_class.clone())
            .collect();
        let class_count = classes.len();

        Plot::new(format!("trends_{}", report.summary.state))
            .height(380.0)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("Income Class")
            .y_axis_label("Percent")
            .include_y(0.0)
            .include_y(100.0)
            .x_grid_spacer(move |_input| category_marks(class_count))
            .x_axis_formatter(move |mark, _range| category_label(&classes, mark.value))
            .show(ui, |plot_ui| {
                for (metric, rgb) in Metric::PROGRESSION.iter().zip(TREND_COLORS) {
                    let color = to_color32(rgb);
                    let points: Vec<[f64; 2]> = report
                        .records
                        .iter()
                        .enumerate()
                        .map(|(i, r)| [i as f64, metric.value(r)])
                        .filter(|p| !p[1].is_nan())
                        .collect();

                    plot_ui.line(
                        Line::new(PlotPoints::from_iter(points.iter().copied()))
                            .color(color)
                            .width(2.0)
                            .name(metric.column()),
                    );
                    plot_ui.points(
                        Points::new(PlotPoints::from_iter(points.iter().copied()))
                            .radius(4.0)
                            .color(color)
                            .name(metric.column()),
                    );
                }
            });
    }

    /// Horizontal bars of state mean literacy, best first.
    pub fn draw_literacy_ranking(ui: &mut egui::Ui, summaries: &[StateSummary], selected: &str) {
        let ranked = Self::rank_by_literacy(summaries);
        let range = {
            let values: Vec<f64> = ranked.iter().map(|s| s.mean_literacy).collect();
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (min <= max).then_some((min, max))
        };

        // Top of the chart holds rank 1.
        let labels: Vec<String> = ranked.iter().rev().map(|s| s.state.clone()).collect();
        let count = labels.len();

        let bars: Vec<Bar> = ranked
            .iter()
            .rev()
            .enumerate()
            .map(|(i, s)| {
                let fill = if s.state == selected {
                    HIGHLIGHT_COLOR
                } else {
                    to_color32(blues(normalize(s.mean_literacy, range)))
                };
                Bar::new(i as f64, s.mean_literacy)
                    .name(&s.state)
                    .fill(fill)
                    .width(0.7)
            })
            .collect();

        Plot::new("literacy_ranking")
            .height((count as f32 * 22.0).max(200.0))
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_x(0.0)
            .include_x(100.0)
            .x_axis_label("Mean Literacy Rate (%)")
            .y_grid_spacer(move |_input| category_marks(count))
            .y_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).horizontal().name("Literacy"));
            });
    }

    /// States with a defined literacy mean, highest first.
    pub fn rank_by_literacy(summaries: &[StateSummary]) -> Vec<&StateSummary> {
        let mut ranked: Vec<&StateSummary> = summaries
            .iter()
            .filter(|s| !s.mean_literacy.is_nan())
            .collect();
        ranked.sort_by(|a, b| {
            b.mean_literacy
                .partial_cmp(&a.mean_literacy)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(state: &str, literacy: f64) -> StateSummary {
        StateSummary {
            state: state.to_string(),
            mean_literacy: literacy,
            mean_primary: f64::NAN,
            mean_secondary: f64::NAN,
            mean_higher_secondary: f64::NAN,
            mean_graduation: f64::NAN,
        }
    }

    #[test]
    fn blues_endpoints_and_clamping() {
        assert_eq!(blues(0.0), BLUES[0]);
        assert_eq!(blues(1.0), BLUES[8]);
        assert_eq!(blues(-3.0), BLUES[0]);
        assert_eq!(blues(7.0), BLUES[8]);
        assert_eq!(blues(0.5), BLUES[4]);
        assert_eq!(blues(f64::NAN), NO_DATA);
    }

    #[test]
    fn blues_interpolates_between_stops() {
        // Halfway between stop 0 and stop 1.
        let (r, g, b) = blues(1.0 / 16.0);
        assert_eq!((r, g, b), (235, 243, 251));
    }

    #[test]
    fn normalize_handles_degenerate_ranges() {
        assert_eq!(normalize(70.0, Some((60.0, 80.0))), 0.5);
        assert_eq!(normalize(80.0, Some((60.0, 80.0))), 1.0);
        assert_eq!(normalize(70.0, Some((70.0, 70.0))), 0.5);
        assert!(normalize(70.0, None).is_nan());
        assert!(normalize(f64::NAN, Some((0.0, 1.0))).is_nan());
    }

    #[test]
    fn category_labels_only_on_integer_marks() {
        let labels = vec!["Low".to_string(), "Middle".to_string(), "High".to_string()];
        assert_eq!(category_label(&labels, 1.0), "Middle");
        assert_eq!(category_label(&labels, 1.5), "");
        assert_eq!(category_label(&labels, -1.0), "");
        assert_eq!(category_label(&labels, 3.0), "");
        assert_eq!(category_marks(3).len(), 3);
    }

    #[test]
    fn ranking_drops_nan_and_sorts_descending() {
        let summaries = vec![
            summary("Bihar", 61.0),
            summary("Kerala", 94.0),
            summary("Nowhere", f64::NAN),
            summary("Goa", 88.5),
        ];
        let ranked: Vec<&str> = ChartPlotter::rank_by_literacy(&summaries)
            .iter()
            .map(|s| s.state.as_str())
            .collect();
        assert_eq!(ranked, vec!["Kerala", "Goa", "Bihar"]);
    }

    #[test]
    fn delta_colors() {
        assert_eq!(delta_color(-7.5), NEGATIVE_COLOR);
        assert_eq!(delta_color(0.0), POSITIVE_COLOR);
        assert_eq!(delta_color(f64::NAN), Color32::GRAY);
    }
}
