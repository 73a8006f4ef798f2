//! Dashboard Main Application
//! Main window with control panel and dashboard view.

use crate::charts::{to_color_image, StaticChartRenderer};
use crate::config::DashboardArgs;
use crate::data::{Dataset, DATASET_CACHE};
use crate::geo::{load_boundaries, Boundaries};
use crate::gui::control_panel::DataSourceInfo;
use crate::gui::dashboard::{MapState, NationalData};
use crate::gui::{ControlPanel, ControlPanelAction, DashboardView};
use crate::stats::{MetricsAggregator, StateReport};
use egui::{RichText, SidePanel};
use log::{error, info, warn};
use std::path::Path;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;

const MAP_SIZE: (u32, u32) = (900, 900);
const TRENDS_EXPORT_SIZE: (u32, u32) = (1400, 800);

/// Loading result from background thread
enum LoadResult {
    Progress(String),
    Complete {
        dataset: Arc<Dataset>,
        boundaries: Result<Boundaries, String>,
    },
    Error(String),
}

/// Main application window.
pub struct DashboardApp {
    args: DashboardArgs,
    control_panel: ControlPanel,
    dashboard: DashboardView,

    dataset: Option<Arc<Dataset>>,
    boundaries: Result<Boundaries, String>,
    national: Option<NationalData>,
    report: Option<StateReport>,
    map: MapState,
    map_dirty: bool,

    // Async loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
    load_error: Option<String>,
}

impl DashboardApp {
    pub fn new(cc: &eframe::CreationContext<'_>, args: DashboardArgs) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let source = DataSourceInfo {
            csv_path: args.data.clone(),
            geojson_path: args.geojson.clone(),
            ..DataSourceInfo::default()
        };

        let mut app = Self {
            args,
            control_panel: ControlPanel::new(source),
            dashboard: DashboardView::new(),
            dataset: None,
            boundaries: Err("not loaded".to_string()),
            national: None,
            report: None,
            map: MapState::Pending,
            map_dirty: false,
            load_rx: None,
            is_loading: false,
            load_error: None,
        };
        app.start_loading();
        app
    }

    /// Load dataset and boundaries in background thread
    fn start_loading(&mut self) {
        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        self.is_loading = true;
        self.control_panel.set_status("Loading data...");

        let data_path = self.args.data.clone();
        let geojson_path = self.args.geojson.clone();
        let feature_key = self.args.feature_key.clone();

        thread::spawn(move || {
            let _ = tx.send(LoadResult::Progress("Reading CSV file...".to_string()));
            let dataset = match DATASET_CACHE.get_or_load(&data_path) {
                Ok(dataset) => dataset,
                Err(e) => {
                    let _ = tx.send(LoadResult::Error(e.to_string()));
                    return;
                }
            };

            let _ = tx.send(LoadResult::Progress("Reading boundaries...".to_string()));
            let boundaries = load_boundaries(&geojson_path, &feature_key).map_err(|e| {
                warn!("boundaries unavailable: {}", e);
                e.to_string()
            });

            let _ = tx.send(LoadResult::Complete {
                dataset,
                boundaries,
            });
        });
    }

    /// Check for loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Progress(status) => {
                        self.control_panel.set_status(&status);
                    }
                    LoadResult::Complete {
                        dataset,
                        boundaries,
                    } => {
                        self.on_loaded(dataset, boundaries);
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                    LoadResult::Error(e) => {
                        error!("failed to load dataset: {}", e);
                        self.control_panel.set_status(&format!("Error: {}", e));
                        self.load_error = Some(e);
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    fn on_loaded(&mut self, dataset: Arc<Dataset>, boundaries: Result<Boundaries, String>) {
        if dataset.is_empty() {
            warn!("dataset has no rows");
        }
        let states = dataset.states();
        let initial = initial_state(&states, self.args.state.as_deref());

        self.control_panel.source.row_count = dataset.len();
        self.control_panel.source.region_count = boundaries.as_ref().ok().map(|b| b.regions.len());
        self.control_panel
            .update_states(states.clone(), initial.as_deref().unwrap_or_default());
        self.control_panel.set_status(&format!(
            "Loaded {} rows, {} states",
            dataset.len(),
            states.len()
        ));

        let summaries = MetricsAggregator::summarize_all(&dataset);
        let national = MetricsAggregator::national_literacy_by_state(&dataset);
        self.national = Some(NationalData {
            summaries,
            overview: MetricsAggregator::national_overview(&national),
        });

        if let Ok(b) = &boundaries {
            let names = b.names();
            let unmatched: Vec<&String> = states
                .iter()
                .filter(|s| !names.contains(&s.as_str()))
                .collect();
            if !unmatched.is_empty() {
                warn!("{} states have no boundary: {:?}", unmatched.len(), unmatched);
            }
        }

        self.boundaries = boundaries;
        self.dataset = Some(dataset);

        if let Some(state) = initial {
            self.select_state(&state);
        }
    }

    /// Recompute everything the view shows for a state.
    fn select_state(&mut self, state: &str) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        info!("selected state '{}'", state);
        self.report = Some(MetricsAggregator::state_report(dataset, state));
        self.map_dirty = true;
    }

    fn refresh_map(&mut self, ctx: &egui::Context) {
        if !self.map_dirty {
            return;
        }
        self.map_dirty = false;

        let Some(report) = &self.report else {
            return;
        };
        self.map = match &self.boundaries {
            Err(e) => MapState::Unavailable(e.clone()),
            Ok(boundaries) => match StaticChartRenderer::render_choropleth(
                boundaries,
                &report.national,
                &report.summary.state,
                MAP_SIZE,
            ) {
                Ok(img) => MapState::Ready(ctx.load_texture(
                    "literacy_map",
                    to_color_image(&img),
                    egui::TextureOptions::LINEAR,
                )),
                Err(e) => {
                    error!("map render failed: {}", e);
                    MapState::Unavailable(e.to_string())
                }
            },
        };
    }

    /// Write trends and map PNGs into a user-chosen folder
    fn handle_export_png(&mut self) {
        let Some(report) = &self.report else {
            self.control_panel.set_status("Nothing to export");
            return;
        };

        let Some(dir) = rfd::FileDialog::new()
            .set_title("Export charts to folder")
            .pick_folder()
        else {
            return; // User cancelled
        };

        match export_charts(report, self.boundaries.as_ref().ok(), &dir) {
            Ok(count) => {
                info!("exported {} images to {}", count, dir.display());
                self.control_panel
                    .set_status(&format!("Exported {} images", count));
                if let Err(e) = open::that(&dir) {
                    warn!("could not open {}: {}", dir.display(), e);
                }
            }
            Err(e) => {
                error!("export failed: {}", e);
                self.control_panel
                    .set_status(&format!("Error: export failed: {}", e));
            }
        }
    }
}

/// Requested state if present, otherwise the first one.
fn initial_state(states: &[String], requested: Option<&str>) -> Option<String> {
    match requested {
        Some(name) if states.iter().any(|s| s == name) => Some(name.to_string()),
        Some(name) => {
            warn!("state '{}' not in dataset, using first state", name);
            states.first().cloned()
        }
        None => states.first().cloned(),
    }
}

/// File-system safe stem for a state name.
fn file_stem(state: &str) -> String {
    state
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

fn export_charts(
    report: &StateReport,
    boundaries: Option<&Boundaries>,
    dir: &Path,
) -> Result<usize, crate::charts::RenderError> {
    let trends = StaticChartRenderer::render_trends(report, TRENDS_EXPORT_SIZE)?;
    let trends_path = dir.join(format!("{}_trends.png", file_stem(&report.summary.state)));
    StaticChartRenderer::save_png(&trends, &trends_path)?;

    let Some(boundaries) = boundaries else {
        return Ok(1);
    };
    let map = StaticChartRenderer::render_choropleth(
        boundaries,
        &report.national,
        &report.summary.state,
        MAP_SIZE,
    )?;
    StaticChartRenderer::save_png(&map, &dir.join("literacy_map.png"))?;
    Ok(2)
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();
        self.refresh_map(ctx);

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::StateChanged => {
                            let state = self.control_panel.selected_state.clone();
                            self.select_state(&state);
                        }
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Dashboard
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(e) = &self.load_error {
                ui.centered_and_justified(|ui| {
                    ui.label(
                        RichText::new(format!("Failed to load data\n{}", e))
                            .size(18.0)
                            .color(egui::Color32::from_rgb(220, 53, 69)),
                    );
                });
                return;
            }

            match (&self.report, &self.national) {
                (Some(report), Some(national)) => {
                    self.dashboard.show(ui, report, national, &self.map);
                }
                _ => {
                    ui.centered_and_justified(|ui| {
                        ui.spinner();
                    });
                }
            }
        });
    }
}
