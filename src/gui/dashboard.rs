//! Dashboard View
//! Central panel: metric cards for the selected state and the tabbed charts.

use crate::charts::{delta_color, region_color, ChartPlotter};
use crate::data::Metric;
use crate::stats::{format_delta, format_percent, MetricsAggregator, NationalOverview, StateReport, StateSummary};
use egui::{Color32, RichText, ScrollArea, Stroke};

const CARD_FILL: Color32 = Color32::from_rgb(30, 41, 59);
const CARD_BORDER: Color32 = Color32::from_rgb(51, 65, 85);
const ACCENT: Color32 = Color32::from_rgb(125, 211, 252);
const CARD_SPACING: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Trends,
    StateMap,
    Issues,
    National,
}

impl Tab {
    const ALL: [Tab; 4] = [Tab::Trends, Tab::StateMap, Tab::Issues, Tab::National];

    fn title(self) -> &'static str {
        match self {
            Tab::Trends => "📈 Trends",
            Tab::StateMap => "🗺 State Map",
            Tab::Issues => "⚠ Issues",
            Tab::National => "🌐 National",
        }
    }
}

/// Rendered choropleth, or why there is none.
pub enum MapState {
    Pending,
    Ready(egui::TextureHandle),
    Unavailable(String),
}

/// National data computed once per loaded dataset.
pub struct NationalData {
    pub summaries: Vec<StateSummary>,
    pub overview: Option<NationalOverview>,
}

#[derive(Default)]
pub struct DashboardView {
    pub tab: Tab,
}

impl DashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        report: &StateReport,
        national: &NationalData,
        map: &MapState,
    ) {
        ui.heading(RichText::new(format!("📊 {}", report.summary.state)).color(ACCENT));
        if report.summary.is_empty() {
            ui.label(RichText::new("No data for this state").color(Color32::GRAY));
        }
        ui.add_space(8.0);

        Self::draw_metric_cards(ui, &report.summary);
        ui.add_space(12.0);

        ui.horizontal(|ui| {
            for tab in Tab::ALL {
                ui.selectable_value(&mut self.tab, tab, RichText::new(tab.title()).size(14.0));
            }
        });
        ui.separator();

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| match self.tab {
                Tab::Trends => ChartPlotter::draw_trends_chart(ui, report),
                Tab::StateMap => Self::draw_map_tab(ui, report, map),
                Tab::Issues => Self::draw_issues_tab(ui, report),
                Tab::National => Self::draw_national_tab(ui, national, &report.summary.state),
            });
    }

    /// Five cards: literacy, then each stage with its change from the previous one.
    fn draw_metric_cards(ui: &mut egui::Ui, summary: &StateSummary) {
        ui.columns(Metric::ALL.len(), |columns| {
            for (column, metric) in columns.iter_mut().zip(Metric::ALL) {
                Self::draw_metric_card(column, summary, metric);
            }
        });
    }

    fn draw_metric_card(ui: &mut egui::Ui, summary: &StateSummary, metric: Metric) {
        Self::card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(metric.label()).size(13.0).color(Color32::GRAY));
            ui.label(
                RichText::new(format_percent(summary.mean(metric)))
                    .size(24.0)
                    .strong()
                    .color(Color32::WHITE),
            );
            match summary.delta(metric) {
                Some(delta) => {
                    let arrow = if delta < 0.0 { "⏷" } else { "⏶" };
                    ui.label(
                        RichText::new(format!("{} {}", arrow, format_delta(delta)))
                            .size(12.0)
                            .color(delta_color(delta)),
                    );
                }
                None => {
                    ui.label(RichText::new(" ").size(12.0));
                }
            }
        });
    }

    fn card_frame() -> egui::Frame {
        egui::Frame::none()
            .fill(CARD_FILL)
            .rounding(12.0)
            .stroke(Stroke::new(1.0, CARD_BORDER))
            .inner_margin(10.0)
    }

    fn draw_map_tab(ui: &mut egui::Ui, report: &StateReport, map: &MapState) {
        match map {
            MapState::Pending => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Rendering map...");
                });
            }
            MapState::Unavailable(reason) => {
                ui.label(
                    RichText::new(format!("Map unavailable: {}", reason))
                        .color(Color32::from_rgb(220, 53, 69)),
                );
            }
            MapState::Ready(texture) => {
                let max_width = ui.available_width().min(900.0);
                ui.add(
                    egui::Image::from_texture(texture)
                        .max_width(max_width)
                        .maintain_aspect_ratio(true),
                );
            }
        }

        ui.add_space(8.0);
        let state = &report.summary.state;
        let value = report.national.get(state).copied().unwrap_or(f64::NAN);
        let range = MetricsAggregator::literacy_range(&report.national);
        ui.horizontal(|ui| {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(16.0, 16.0), egui::Sense::hover());
            ui.painter().rect_filled(rect, 3.0, region_color(value, range));
            ui.label(format!("{}: {} mean literacy", state, format_percent(value)));
        });
    }

    fn draw_issues_tab(ui: &mut egui::Ui, report: &StateReport) {
        ui.label(
            RichText::new(format!("Issues Faced in {}", report.summary.state))
                .size(16.0)
                .strong(),
        );
        ui.add_space(8.0);

        if report.issues.is_empty() {
            ui.label(RichText::new("No records for this state").color(Color32::GRAY));
            return;
        }

        for (income_class, issue) in &report.issues {
            Self::card_frame().show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(
                    RichText::new(format!("{} Class", income_class))
                        .size(15.0)
                        .strong()
                        .color(ACCENT),
                );
                ui.label(issue);
            });
            ui.add_space(CARD_SPACING);
        }
    }

    fn draw_national_tab(ui: &mut egui::Ui, national: &NationalData, selected: &str) {
        ui.label(RichText::new("Mean Literacy Rate by State").size(16.0).strong());
        ui.add_space(8.0);

        if let Some(overview) = &national.overview {
            egui::Grid::new("national_overview")
                .striped(true)
                .min_col_width(70.0)
                .spacing([12.0, 4.0])
                .show(ui, |ui| {
                    for header in ["States", "Mean", "Median", "Std", "Min", "Max"] {
                        ui.label(RichText::new(header).strong().size(12.0));
                    }
                    ui.end_row();

                    ui.label(overview.states.to_string());
                    for value in [
                        overview.mean,
                        overview.median,
                        overview.std_dev,
                        overview.min,
                        overview.max,
                    ] {
                        ui.label(format!("{:.1}", value));
                    }
                    ui.end_row();
                });
            ui.add_space(10.0);
        }

        ChartPlotter::draw_literacy_ranking(ui, &national.summaries, selected);
    }
}
