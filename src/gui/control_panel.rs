//! Control Panel Widget
//! Left side panel with the state selector, data source info and export.

use egui::{Color32, ComboBox, RichText};
use std::path::PathBuf;

/// Where the dashboard reads its inputs from.
#[derive(Default, Clone)]
pub struct DataSourceInfo {
    pub csv_path: PathBuf,
    pub geojson_path: PathBuf,
    pub row_count: usize,
    pub region_count: Option<usize>,
}

/// Left side control panel.
pub struct ControlPanel {
    pub states: Vec<String>,
    pub selected_state: String,
    pub source: DataSourceInfo,
    pub status: String,
    pub export_enabled: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            states: Vec::new(),
            selected_state: String::new(),
            source: DataSourceInfo::default(),
            status: "Ready".to_string(),
            export_enabled: false,
        }
    }
}

impl ControlPanel {
    pub fn new(source: DataSourceInfo) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }

    /// Fill the selector once the dataset is available.
    pub fn update_states(&mut self, states: Vec<String>, initial: &str) {
        self.states = states;
        self.selected_state = initial.to_string();
        self.export_enabled = !self.states.is_empty();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 India Education Dashboard")
                    .size(20.0)
                    .color(Color32::from_rgb(125, 211, 252)),
            );
            ui.label(
                RichText::new("Statewise Education Data by Income Class")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== State Section =====
        ui.label(RichText::new("🗺 Select State").size(14.0).strong());
        ui.add_space(5.0);

        ui.add_enabled_ui(!self.states.is_empty(), |ui| {
            ComboBox::from_id_salt("selected_state")
                .width(ui.available_width() - 10.0)
                .selected_text(&self.selected_state)
                .show_ui(ui, |ui| {
                    for state in &self.states {
                        if ui
                            .selectable_label(self.selected_state == *state, state)
                            .clicked()
                            && self.selected_state != *state
                        {
                            self.selected_state = state.clone();
                            action = ControlPanelAction::StateChanged;
                        }
                    }
                });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new(file_name(&self.source.csv_path)).size(12.0));
                ui.label(
                    RichText::new(format!(
                        "{} rows, {} states",
                        self.source.row_count,
                        self.states.len()
                    ))
                    .size(11.0)
                    .color(Color32::GRAY),
                );
                ui.add_space(4.0);
                ui.label(RichText::new(file_name(&self.source.geojson_path)).size(12.0));
                let regions = match self.source.region_count {
                    Some(n) => format!("{} regions", n),
                    None => "not loaded".to_string(),
                };
                ui.label(RichText::new(regions).size(11.0).color(Color32::GRAY));
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled, |ui| {
                let button = egui::Button::new(RichText::new("🖼 Export PNG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportPng;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    StateChanged,
    ExportPng,
}
