//! Static Chart Renderer
//! Rasterizes the choropleth map and the trends chart with plotters.
//!
//! Both renderers draw into an in-memory RGB buffer, which the GUI uploads as
//! a texture and the export action encodes as PNG.

use crate::charts::plotter::{blues, normalize, to_color32, NO_DATA, TREND_COLORS};
use crate::data::Metric;
use crate::geo::{Boundaries, Bounds};
use crate::stats::{MetricsAggregator, StateReport};
use image::RgbImage;
use plotters::prelude::*;
use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Drawing(String),
    #[error("No boundaries to draw")]
    EmptyMap,
    #[error("Image buffer size mismatch")]
    Buffer,
    #[error("Failed to write image: {0}")]
    Image(#[from] image::ImageError),
}

fn drawing<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Drawing(e.to_string())
}

// Dark dashboard palette
const BACKGROUND: RGBColor = RGBColor(15, 23, 42);
const PANEL: RGBColor = RGBColor(30, 41, 59);
const TEXT: RGBColor = RGBColor(226, 232, 240);
const GRID: RGBColor = RGBColor(51, 65, 85);
const OUTLINE: RGBColor = RGBColor(148, 163, 184);
const SELECTED: RGBColor = RGBColor(250, 204, 21);

const LEGEND_WIDTH: u32 = 90;

fn rgb((r, g, b): (u8, u8, u8)) -> RGBColor {
    RGBColor(r, g, b)
}

/// Convert a rendered image for display in egui.
pub fn to_color_image(img: &RgbImage) -> egui::ColorImage {
    egui::ColorImage::from_rgb([img.width() as usize, img.height() as usize], img.as_raw())
}

/// Extend a lon/lat box so the map keeps its shape inside a `width` x
/// `height` plot. Longitude is scaled by the cosine of the mid latitude.
pub fn fit_bounds(bounds: Bounds, width: u32, height: u32) -> (Range<f64>, Range<f64>) {
    let lon_span = (bounds.max_lon - bounds.min_lon).max(1e-6);
    let lat_span = (bounds.max_lat - bounds.min_lat).max(1e-6);
    let mid_lon = (bounds.min_lon + bounds.max_lon) / 2.0;
    let mid_lat = (bounds.min_lat + bounds.max_lat) / 2.0;
    let lon_scale = mid_lat.to_radians().cos().max(0.1);

    let data_aspect = lon_span * lon_scale / lat_span;
    let pixel_aspect = width.max(1) as f64 / height.max(1) as f64;

    let (lon_half, lat_half) = if data_aspect > pixel_aspect {
        let lat_needed = lon_span * lon_scale / pixel_aspect;
        (lon_span / 2.0, lat_needed / 2.0)
    } else {
        let lon_needed = lat_span * pixel_aspect / lon_scale;
        (lon_needed / 2.0, lat_span / 2.0)
    };

    (
        (mid_lon - lon_half)..(mid_lon + lon_half),
        (mid_lat - lat_half)..(mid_lat + lat_half),
    )
}

/// Generates static chart images.
pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Choropleth of mean literacy per state; the selected state is outlined.
    pub fn render_choropleth(
        boundaries: &Boundaries,
        literacy: &HashMap<String, f64>,
        selected: &str,
        (width, height): (u32, u32),
    ) -> Result<RgbImage, RenderError> {
        let bounds = boundaries.bounds().ok_or(RenderError::EmptyMap)?;
        let range = MetricsAggregator::literacy_range(literacy);

        let mut buf = vec![0u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
            root.fill(&BACKGROUND).map_err(drawing)?;

            let (map_area, legend_area) = root.split_horizontally(width.saturating_sub(LEGEND_WIDTH));

            let mut chart = ChartBuilder::on(&map_area)
                .caption(
                    "Literacy Rate by State",
                    ("sans-serif", 22).into_font().color(&TEXT),
                )
                .margin(10)
                .build_cartesian_2d(0.0..1.0, 0.0..1.0)
                .map_err(drawing)?;

            // Re-fit once the caption and margins are known.
            let (plot_w, plot_h) = chart.plotting_area().dim_in_pixel();
            let (lon_range, lat_range) = fit_bounds(bounds, plot_w, plot_h);
            let project = |(lon, lat): (f64, f64)| {
                (
                    (lon - lon_range.start) / (lon_range.end - lon_range.start),
                    (lat - lat_range.start) / (lat_range.end - lat_range.start),
                )
            };

            for region in &boundaries.regions {
                let value = literacy.get(&region.name).copied().unwrap_or(f64::NAN);
                let fill = rgb(blues(normalize(value, range)));

                for ring in &region.rings {
                    let points: Vec<(f64, f64)> = ring.iter().copied().map(project).collect();
                    chart
                        .draw_series(std::iter::once(Polygon::new(points.clone(), fill.filled())))
                        .map_err(drawing)?;
                    chart
                        .draw_series(std::iter::once(PathElement::new(points, OUTLINE.stroke_width(1))))
                        .map_err(drawing)?;
                }
            }

            if let Some(region) = boundaries.regions.iter().find(|r| r.name == selected) {
                for ring in &region.rings {
                    let points: Vec<(f64, f64)> = ring.iter().copied().map(project).collect();
                    chart
                        .draw_series(std::iter::once(PathElement::new(
                            points,
                            SELECTED.stroke_width(3),
                        )))
                        .map_err(drawing)?;
                }
            }

            Self::draw_color_legend(&legend_area, range)?;
            root.present().map_err(drawing)?;
        }

        RgbImage::from_raw(width, height, buf).ok_or(RenderError::Buffer)
    }

    /// Vertical color bar from the lowest to the highest state mean.
    fn draw_color_legend<DB: DrawingBackend>(
        area: &DrawingArea<DB, plotters::coord::Shift>,
        range: Option<(f64, f64)>,
    ) -> Result<(), RenderError>
    where
        DB::ErrorType: 'static,
    {
        let (_, height) = area.dim_in_pixel();
        let top = 60i32;
        let bottom = height as i32 - 40;
        let steps = 64;
        let step_h = ((bottom - top) as f64 / steps as f64).max(1.0);
        let label_style = ("sans-serif", 13).into_font().color(&TEXT);

        // Dark end of the scale at the top.
        for i in 0..steps {
            let t = 1.0 - i as f64 / (steps - 1) as f64;
            let y0 = top + (i as f64 * step_h) as i32;
            let y1 = top + ((i + 1) as f64 * step_h) as i32;
            area.draw(&Rectangle::new([(15, y0), (40, y1)], rgb(blues(t)).filled()))
                .map_err(drawing)?;
        }

        match range {
            Some((min, max)) => {
                area.draw(&Text::new(format!("{:.1}", max), (45, top), label_style.clone()))
                    .map_err(drawing)?;
                area.draw(&Text::new(format!("{:.1}", min), (45, bottom - 12), label_style))
                    .map_err(drawing)?;
            }
            None => {
                area.draw(&Rectangle::new([(15, top), (40, bottom)], rgb(NO_DATA).filled()))
                    .map_err(drawing)?;
            }
        }
        Ok(())
    }

    /// Progression lines across income classes for the selected state.
    pub fn render_trends(
        report: &StateReport,
        (width, height): (u32, u32),
    ) -> Result<RgbImage, RenderError> {
        let classes: Vec<String> = report
            .records
            .iter()
            .map(|r| r.income_class.clone())
            .collect();
        let (y_min, y_max) = Self::trend_y_range(report);
        let x_max = (classes.len() as f64 - 0.5).max(0.5);

        let mut buf = vec![0u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
            root.fill(&BACKGROUND).map_err(drawing)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(
                    format!("Education Progression in {}", report.summary.state),
                    ("sans-serif", 22).into_font().color(&TEXT),
                )
                .margin(15)
                .x_label_area_size(40)
                .y_label_area_size(50)
                .build_cartesian_2d(-0.5..x_max, y_min..y_max)
                .map_err(drawing)?;

            let class_label = |x: &f64| {
                let idx = x.round();
                if (x - idx).abs() > 1e-6 || idx < 0.0 {
                    return String::new();
                }
                classes.get(idx as usize).cloned().unwrap_or_default()
            };

            chart
                .configure_mesh()
                .x_labels(classes.len().max(1) * 2 + 1)
                .x_label_formatter(&class_label)
                .x_desc("Income Class")
                .y_desc("Percent")
                .axis_style(OUTLINE)
                .bold_line_style(GRID)
                .light_line_style(PANEL)
                .label_style(("sans-serif", 14).into_font().color(&TEXT))
                .axis_desc_style(("sans-serif", 14).into_font().color(&TEXT))
                .draw()
                .map_err(drawing)?;

            for (metric, color) in Metric::PROGRESSION.iter().zip(TREND_COLORS) {
                let color = rgb(color);
                let points: Vec<(f64, f64)> = report
                    .records
                    .iter()
                    .enumerate()
                    .map(|(i, r)| (i as f64, metric.value(r)))
                    .filter(|(_, v)| !v.is_nan())
                    .collect();

                chart
                    .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))
                    .map_err(drawing)?
                    .label(metric.column())
                    .legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                    });
                chart
                    .draw_series(points.iter().map(|&p| Circle::new(p, 4, color.filled())))
                    .map_err(drawing)?;
            }

            chart
                .configure_series_labels()
                .background_style(&PANEL.mix(0.9))
                .border_style(&GRID)
                .label_font(("sans-serif", 13).into_font().color(&TEXT))
                .draw()
                .map_err(drawing)?;

            root.present().map_err(drawing)?;
        }

        RgbImage::from_raw(width, height, buf).ok_or(RenderError::Buffer)
    }

    /// Padded value range of the plotted metrics; 0..100 when nothing is defined.
    fn trend_y_range(report: &StateReport) -> (f64, f64) {
        let values = report.records.iter().flat_map(|r| {
            Metric::PROGRESSION
                .iter()
                .map(move |m| m.value(r))
                .filter(|v| !v.is_nan())
        });
        let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if min > max {
            return (0.0, 100.0);
        }
        let pad = ((max - min) * 0.15).max(5.0);
        let lo = (min - pad).floor().max(0.0);
        let hi = (max + pad).ceil();
        // Percent axis tops out at 100 unless the data itself goes beyond.
        (lo, if max <= 100.0 { hi.min(100.0) } else { hi })
    }

    pub fn save_png(img: &RgbImage, path: &Path) -> Result<(), RenderError> {
        img.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}

/// Texture color of a state on the egui side, matching the rendered map.
pub fn region_color(value: f64, range: Option<(f64, f64)>) -> egui::Color32 {
    to_color32(blues(normalize(value, range)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{record, Dataset};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn fit_bounds_widens_latitude_for_wide_plots() {
        let bounds = Bounds {
            min_lon: 70.0,
            min_lat: 10.0,
            max_lon: 90.0,
            max_lat: 30.0,
        };
        let (lon, lat) = fit_bounds(bounds, 800, 200);

        // Lat span fits, lon grows to match the 4:1 plot.
        assert!(close(lat.start, 10.0) && close(lat.end, 30.0));
        assert!(lon.end - lon.start > 20.0);
        assert!(close((lon.start + lon.end) / 2.0, 80.0));
    }

    #[test]
    fn fit_bounds_keeps_aspect_ratio() {
        let bounds = Bounds {
            min_lon: 68.0,
            min_lat: 6.0,
            max_lon: 98.0,
            max_lat: 37.0,
        };
        let (lon, lat) = fit_bounds(bounds, 600, 600);
        let scale = 21.5f64.to_radians().cos();
        let aspect = (lon.end - lon.start) * scale / (lat.end - lat.start);
        assert!(close(aspect, 1.0));
        assert!(lon.start <= 68.0 && lon.end >= 98.0);
        assert!(lat.start <= 6.0 && lat.end >= 37.0);
    }

    #[test]
    fn trend_range_is_padded_and_clamped() {
        let ds = Dataset::from_records(vec![
            record("Goa", "Low", [80.0, 70.0, 60.0, 50.0, 40.0], ""),
            record("Goa", "High", [99.0, 98.0, 85.0, 80.0, 75.0], ""),
        ]);
        let report = MetricsAggregator::state_report(&ds, "Goa");
        let (lo, hi) = StaticChartRenderer::trend_y_range(&report);
        assert_eq!(hi, 100.0);
        assert!(lo < 40.0 && lo >= 0.0);

        let over = Dataset::from_records(vec![record(
            "Delhi",
            "High",
            [110.0, 120.0, 115.0, 112.0, 118.0],
            "",
        )]);
        let report = MetricsAggregator::state_report(&over, "Delhi");
        let (lo, hi) = StaticChartRenderer::trend_y_range(&report);
        assert!(lo < hi);
        assert!(hi >= 120.0);

        let empty = MetricsAggregator::state_report(&ds, "Nowhere");
        assert_eq!(StaticChartRenderer::trend_y_range(&empty), (0.0, 100.0));
    }

    #[test]
    fn region_color_matches_scale() {
        assert_eq!(region_color(f64::NAN, Some((0.0, 1.0))), to_color32(NO_DATA));
        assert_eq!(region_color(60.0, Some((60.0, 80.0))), to_color32(blues(0.0)));
    }
}
