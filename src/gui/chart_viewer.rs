//! Chart Viewer Widget
//! Central scrollable panel showing the views of the selected years using egui_plot.

use cord_explorer::report::PreviewRow;
use cord_explorer::stats::{TermFrequency, VenueRanking, YearHistogram};
use egui::{Color32, RichText, ScrollArea};
use egui_plot::{Bar, BarChart, Plot};

const YEAR_COLOR: Color32 = Color32::from_rgb(52, 152, 219); // Blue
const VENUE_COLOR: Color32 = Color32::from_rgb(243, 156, 18); // Orange
const PLOT_HEIGHT: f32 = 300.0;
const CARD_SPACING: f32 = 15.0;

/// Everything derived from the current year selection.
pub struct Views {
    pub histogram: YearHistogram,
    pub venues: VenueRanking,
    pub terms: TermFrequency,
    pub preview: Vec<PreviewRow>,
    pub wordcloud: Option<egui::TextureHandle>,
}

#[derive(Default)]
pub struct ChartViewer {
    views: Option<Views>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.views = None;
    }

    pub fn set_views(&mut self, views: Views) {
        self.views = Some(views);
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        let Some(views) = &self.views else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                Self::card(ui, "Publications by Year", |ui| Self::draw_years(ui, &views.histogram));
                Self::card(ui, "Top Journals", |ui| Self::draw_venues(ui, &views.venues));
                Self::card(ui, "Word Cloud of Paper Titles", |ui| {
                    Self::draw_wordcloud(ui, views.wordcloud.as_ref(), &views.terms)
                });
                Self::card(ui, "Sample of the Data", |ui| Self::draw_preview(ui, &views.preview));
            });
    }

    fn card(ui: &mut egui::Ui, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new(title).size(18.0).strong());
                ui.add_space(8.0);
                add_contents(ui);
            });
        ui.add_space(CARD_SPACING);
    }

    fn draw_years(ui: &mut egui::Ui, histogram: &YearHistogram) {
        if histogram.is_empty() {
            ui.label(RichText::new("No papers in the selected years").color(Color32::GRAY));
            return;
        }
        let bars: Vec<Bar> = histogram
            .iter()
            .map(|(year, count)| Bar::new(year as f64, count as f64).width(0.8).name(year.to_string()))
            .collect();

        Plot::new("publications_by_year")
            .height(PLOT_HEIGHT)
            .allow_scroll(false)
            .x_axis_label("Year")
            .y_axis_label("Number of Papers")
            .x_axis_formatter(|mark, _range| {
                if mark.value.fract() == 0.0 {
                    format!("{}", mark.value as i32)
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(YEAR_COLOR).name("Papers"));
            });
    }

    fn draw_venues(ui: &mut egui::Ui, venues: &VenueRanking) {
        if venues.is_empty() {
            ui.label(RichText::new("No journal information").color(Color32::GRAY));
            return;
        }
        let n = venues.len();
        // Rank 1 at the top of the chart.
        let labels: Vec<String> = venues.entries().iter().rev().map(|(name, _)| name.clone()).collect();
        let bars: Vec<Bar> = venues
            .iter()
            .enumerate()
            .map(|(rank, (name, count))| {
                Bar::new((n - 1 - rank) as f64, count as f64)
                    .width(0.7)
                    .name(name)
            })
            .collect();

        Plot::new("top_journals")
            .height(PLOT_HEIGHT)
            .allow_scroll(false)
            .x_axis_label("Paper Count")
            .y_axis_min_width(160.0)
            .y_axis_formatter(move |mark, _range| {
                if mark.value.fract() != 0.0 || mark.value < 0.0 {
                    return String::new();
                }
                labels.get(mark.value as usize).cloned().unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .horizontal()
                        .color(VENUE_COLOR)
                        .name("Papers"),
                );
            });
    }

    fn draw_wordcloud(ui: &mut egui::Ui, texture: Option<&egui::TextureHandle>, terms: &TermFrequency) {
        match texture {
            Some(texture) => {
                let size = texture.size_vec2();
                let scale = (ui.available_width() / size.x).min(1.0);
                ui.image((texture.id(), size * scale));
            }
            None => {
                ui.label(RichText::new("No title words to show").color(Color32::GRAY));
            }
        }

        if !terms.is_empty() {
            ui.add_space(8.0);
            ui.label(RichText::new("Most frequent words").size(14.0).strong());
            ui.horizontal_wrapped(|ui| {
                for (term, count) in terms.iter() {
                    ui.label(format!("{term} ({count})"));
                }
            });
        }
    }

    fn draw_preview(ui: &mut egui::Ui, rows: &[PreviewRow]) {
        if rows.is_empty() {
            ui.label(RichText::new("No rows").color(Color32::GRAY));
            return;
        }
        ScrollArea::horizontal().id_salt("preview_scroll").show(ui, |ui| {
            egui::Grid::new("preview_table")
                .num_columns(4)
                .striped(true)
                .spacing([12.0, 4.0])
                .show(ui, |ui| {
                    for header in ["publish_time", "journal", "words", "title"] {
                        ui.label(RichText::new(header).strong());
                    }
                    ui.end_row();

                    for row in rows {
                        ui.label(&row.publish_time);
                        ui.label(row.journal.as_deref().unwrap_or("-"));
                        ui.label(row.abstract_word_count.to_string());
                        ui.label(&row.title);
                        ui.end_row();
                    }
                });
        });
    }
}
