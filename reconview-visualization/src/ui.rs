//! egui panels: reconstruction selectors, overlay toggles and metrics

use crate::catalog::{MeshOption, SampleGroup};
use reconview_metrics::MetricsReport;

/// What the user changed during one frame
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UiEvents {
    pub selection: Option<String>,
    pub show_wireframe: Option<bool>,
    pub show_point_cloud: Option<bool>,
    pub reset_camera: bool,
}

impl UiEvents {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub selected: String,
    pub show_wireframe: bool,
    pub show_point_cloud: bool,
    pub loading: bool,
    pub last_error: Option<String>,
    pub metrics: Option<MetricsReport>,
}

impl UiState {
    pub fn new(selected: impl Into<String>, show_wireframe: bool, show_point_cloud: bool) -> Self {
        Self {
            selected: selected.into(),
            show_wireframe,
            show_point_cloud,
            loading: false,
            last_error: None,
            metrics: None,
        }
    }

    /// Mark `key` as requested; the previous metrics and error no longer apply
    pub fn begin_load(&mut self, key: &str) {
        self.selected = key.to_string();
        self.loading = true;
        self.last_error = None;
        self.metrics = None;
    }

    pub fn finish_load(&mut self, metrics: Option<MetricsReport>) {
        self.loading = false;
        self.metrics = metrics;
    }

    pub fn fail_load(&mut self, error: String) {
        self.loading = false;
        self.last_error = Some(error);
    }

    /// Whether a finished load for `key` should be shown.
    ///
    /// Only the pending load of the current selection is accepted; outcomes
    /// of abandoned selections and repeats after completion are dropped.
    pub fn accepts(&self, key: &str) -> bool {
        self.loading && key == self.selected
    }

    /// Picking the current key again only counts as a retry after a failure
    pub fn is_new_selection(&self, key: &str) -> bool {
        key != self.selected || self.last_error.is_some()
    }

    /// Flip an overlay from the keyboard, reported like a checkbox click
    pub fn toggle_wireframe(&mut self) -> UiEvents {
        self.show_wireframe = !self.show_wireframe;
        UiEvents {
            show_wireframe: Some(self.show_wireframe),
            ..Default::default()
        }
    }

    pub fn toggle_point_cloud(&mut self) -> UiEvents {
        self.show_point_cloud = !self.show_point_cloud;
        UiEvents {
            show_point_cloud: Some(self.show_point_cloud),
            ..Default::default()
        }
    }

    pub fn status_text(&self) -> Option<String> {
        if self.loading {
            Some(format!("Carregant {}…", self.selected))
        } else {
            self.last_error.as_ref().map(|e| format!("Error: {}", e))
        }
    }

    pub fn show(&mut self, ctx: &egui::Context) -> UiEvents {
        let mut events = UiEvents::default();
        let status = self.status_text();
        let loading = self.loading;

        egui::Window::new("reconview")
            .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
            .title_bar(false)
            .resizable(false)
            .collapsible(false)
            .show(ctx, |ui| {
                for group in SampleGroup::ALL {
                    ui.label(group.title());
                    if let Some(key) = selector(ui, group, group.options(), &self.selected) {
                        events.selection = Some(key);
                    }
                    ui.add_space(4.0);
                }

                ui.separator();
                if ui.checkbox(&mut self.show_wireframe, "Wireframe").changed() {
                    events.show_wireframe = Some(self.show_wireframe);
                }
                if ui.checkbox(&mut self.show_point_cloud, "Núvol de punts").changed() {
                    events.show_point_cloud = Some(self.show_point_cloud);
                }
                if ui.button("Restableix la càmera").clicked() {
                    events.reset_camera = true;
                }

                if let Some(status) = status {
                    ui.separator();
                    if loading {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label(status);
                        });
                    } else {
                        ui.colored_label(egui::Color32::from_rgb(0xc0, 0x39, 0x2b), status);
                    }
                }
            });

        if let Some(report) = &self.metrics {
            egui::Window::new("Mètriques")
                .anchor(egui::Align2::RIGHT_BOTTOM, [-10.0, -10.0])
                .resizable(false)
                .collapsible(true)
                .show(ctx, |ui| {
                    ui.strong(report.name.as_str());
                    egui::Grid::new("metrics_grid")
                        .num_columns(2)
                        .striped(true)
                        .show(ui, |ui| {
                            for (label, value) in report.rows() {
                                ui.label(label);
                                ui.monospace(value);
                                ui.end_row();
                            }
                        });
                });
        }

        if let Some(key) = &events.selection {
            if !self.is_new_selection(key) {
                events.selection = None;
            }
        }
        events
    }
}

/// Combo box for one sample group; returns the newly picked key
fn selector(
    ui: &mut egui::Ui,
    group: SampleGroup,
    options: &[MeshOption],
    selected: &str,
) -> Option<String> {
    let current = options
        .iter()
        .find(|o| o.key == selected)
        .map(|o| o.label)
        .unwrap_or("—");

    let mut picked = None;
    egui::ComboBox::from_id_source(group.title())
        .selected_text(current)
        .width(240.0)
        .show_ui(ui, |ui| {
            for option in options {
                if ui
                    .selectable_label(option.key == selected, option.label)
                    .clicked()
                {
                    picked = Some(option.key.to_string());
                }
            }
        });
    picked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_lifecycle() {
        let mut ui = UiState::new("poisson", true, false);
        assert!(ui.status_text().is_none());

        ui.begin_load("Bunny500");
        assert_eq!(ui.selected, "Bunny500");
        assert_eq!(ui.status_text().as_deref(), Some("Carregant Bunny500…"));

        ui.fail_load("mesh not found".to_string());
        assert!(!ui.loading);
        assert_eq!(ui.status_text().as_deref(), Some("Error: mesh not found"));

        ui.begin_load("poisson");
        assert!(ui.last_error.is_none());
        ui.finish_load(None);
        assert!(ui.status_text().is_none());
    }

    #[test]
    fn test_only_pending_selection_is_accepted() {
        let mut ui = UiState::new("poisson", true, false);
        assert!(!ui.accepts("poisson"));

        ui.begin_load("marching_cubes");
        ui.begin_load("Bunny500");
        assert!(!ui.accepts("marching_cubes"));
        assert!(ui.accepts("Bunny500"));

        ui.finish_load(None);
        assert!(!ui.accepts("Bunny500"));
    }

    #[test]
    fn test_failed_selection_can_be_retried() {
        let mut ui = UiState::new("poisson", true, false);
        ui.begin_load("poisson");
        ui.finish_load(None);
        assert!(!ui.is_new_selection("poisson"));
        assert!(ui.is_new_selection("Bunny1m"));

        ui.begin_load("Bunny1m");
        ui.fail_load("mesh not found".to_string());
        assert!(ui.is_new_selection("Bunny1m"));
    }

    #[test]
    fn test_keyboard_toggles() {
        let mut ui = UiState::new("poisson", true, false);
        let events = ui.toggle_wireframe();
        assert_eq!(events.show_wireframe, Some(false));
        assert!(!ui.show_wireframe);

        let events = ui.toggle_point_cloud();
        assert_eq!(events.show_point_cloud, Some(true));
        assert!(events.selection.is_none());
    }

    #[test]
    fn test_first_frame_emits_nothing() {
        let ctx = egui::Context::default();
        let mut ui = UiState::new("poisson", true, false);
        let mut events = UiEvents::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            events = ui.show(ctx);
        });
        assert!(events.is_empty());
    }

    #[test]
    fn test_metrics_window_renders() {
        let ctx = egui::Context::default();
        let mut ui = UiState::new("poisson", true, false);
        let mesh = reconview_core::TriangleMesh::from_vertices_and_faces(
            vec![
                reconview_core::Point3f::new(0.0, 0.0, 0.0),
                reconview_core::Point3f::new(1.0, 0.0, 0.0),
                reconview_core::Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );
        ui.finish_load(MetricsReport::compute("poisson", &mesh, None).ok());
        let output = ctx.run(egui::RawInput::default(), |ctx| {
            ui.show(ctx);
        });
        assert!(!output.shapes.is_empty());
    }
}
