//! Control Panel Widget
//! Left side panel with the data source, the year interval and status.

use cord_explorer::data::{ColumnProfile, NormalizeReport, YearRange};
use egui::{Color32, RichText};
use std::path::PathBuf;

/// Left side control panel with file selection and the year selector.
pub struct ControlPanel {
    pub csv_path: Option<PathBuf>,
    /// Year bounds of the loaded corpus.
    pub bounds: Option<(i32, i32)>,
    pub from: i32,
    pub to: i32,
    pub profile: Option<ColumnProfile>,
    pub normalize: Option<NormalizeReport>,
    pub subset_size: usize,
    pub status: String,
    pub busy: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            csv_path: None,
            bounds: None,
            from: YearRange::DEFAULT.lo(),
            to: YearRange::DEFAULT.hi(),
            profile: None,
            normalize: None,
            subset_size: 0,
            status: "Ready".to_string(),
            busy: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the selector to `initial` clamped into the corpus bounds.
    pub fn set_bounds(&mut self, bounds: Option<(i32, i32)>, initial: YearRange) {
        self.bounds = bounds;
        let range = match bounds {
            Some((min, max)) => initial.clamp_to(min, max),
            None => initial,
        };
        self.from = range.lo();
        self.to = range.hi();
    }

    /// Currently selected interval.
    pub fn range(&self) -> YearRange {
        YearRange::new(self.from.min(self.to), self.from.max(self.to)).unwrap_or(YearRange::DEFAULT)
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("CORD Explorer")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Research paper metadata")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .csv_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.csv_path.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.add_enabled_ui(!self.busy, |ui| {
                            if ui.button("📂 Browse").clicked() {
                                action = ControlPanelAction::BrowseCsv;
                            }
                        });
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Year Range =====
        ui.label(RichText::new("📅 Publication Years").size(14.0).strong());
        ui.add_space(5.0);

        match self.bounds {
            Some((min, max)) => {
                let (old_from, old_to) = (self.from, self.to);
                ui.add(egui::Slider::new(&mut self.from, min..=max).text("From"));
                ui.add(egui::Slider::new(&mut self.to, min..=max).text("To"));

                // Dragging one handle past the other pushes it along.
                if self.from != old_from && self.from > self.to {
                    self.to = self.from;
                } else if self.to != old_to && self.to < self.from {
                    self.from = self.to;
                }
                if (self.from, self.to) != (old_from, old_to) {
                    action = ControlPanelAction::RangeChanged;
                }
                ui.label(
                    RichText::new(format!("{} papers selected", self.subset_size))
                        .size(12.0)
                        .color(Color32::GRAY),
                );
            }
            None => {
                ui.label(RichText::new("Load a CSV to choose years").color(Color32::GRAY));
            }
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Dataset =====
        if let (Some(profile), Some(normalize)) = (&self.profile, &self.normalize) {
            ui.label(RichText::new("📊 Dataset").size(14.0).strong());
            ui.add_space(5.0);
            egui::Grid::new("dataset_summary")
                .num_columns(2)
                .striped(true)
                .show(ui, |ui| {
                    ui.label("Rows");
                    ui.label(profile.rows.to_string());
                    ui.end_row();
                    ui.label("Columns");
                    ui.label(profile.columns.len().to_string());
                    ui.end_row();
                    for (column, missing) in &profile.missing {
                        ui.label(format!("Missing {column}"));
                        ui.label(missing.to_string());
                        ui.end_row();
                    }
                    ui.label("Kept");
                    ui.label(normalize.kept.to_string());
                    ui.end_row();
                    ui.label("No title");
                    ui.label(normalize.dropped_missing_title.to_string());
                    ui.end_row();
                    ui.label("Bad date");
                    ui.label(normalize.dropped_unparsable_date.to_string());
                    ui.end_row();
                });

            ui.add_space(15.0);
            ui.separator();
            ui.add_space(10.0);
        }

        // ===== Status =====
        if self.busy {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(RichText::new(&self.status).size(11.0));
            });
        } else {
            let status_color = if self.status.starts_with("Error") {
                Color32::from_rgb(220, 53, 69)
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(&self.status).size(11.0).color(status_color));
        }

        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    RangeChanged,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_range_is_clamped_to_data() {
        let mut panel = ControlPanel::new();
        panel.set_bounds(Some((2003, 2020)), YearRange::DEFAULT);
        assert_eq!((panel.from, panel.to), (2020, 2020));

        panel.set_bounds(Some((2021, 2022)), YearRange::DEFAULT);
        assert_eq!((panel.from, panel.to), (2021, 2021));

        panel.set_bounds(Some((1990, 2022)), YearRange::DEFAULT);
        assert_eq!(panel.range(), YearRange::DEFAULT);
    }

    #[test]
    fn range_is_always_ordered() {
        let mut panel = ControlPanel::new();
        panel.from = 2022;
        panel.to = 2019;
        assert_eq!(panel.range(), YearRange::new(2019, 2022).unwrap());
    }
}
