//! CORD Explorer Main Application
//! Main window with control panel and chart viewer.

use super::cache::{load_and_normalize, CorpusCache, Fingerprint, LoadedCorpus};
use super::chart_viewer::{ChartViewer, Views};
use super::control_panel::{ControlPanel, ControlPanelAction};
use cord_explorer::charts::{render_word_cloud, RenderError};
use cord_explorer::config::ExplorerConfig;
use cord_explorer::data::RangeFilter;
use cord_explorer::report::PreviewRow;
use cord_explorer::stats::Aggregator;
use egui::SidePanel;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, info, warn};

/// CSV loading result from background thread
enum LoadResult {
    Complete {
        fingerprint: Fingerprint,
        loaded: LoadedCorpus,
    },
    Error(String),
}

/// Main application window.
pub struct ExplorerApp {
    config: ExplorerConfig,
    cache: CorpusCache,
    current: Option<Arc<LoadedCorpus>>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
}

impl ExplorerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: ExplorerConfig) -> Self {
        let mut app = Self {
            config,
            cache: CorpusCache::new(),
            current: None,
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            load_rx: None,
        };
        if let Some(path) = app.config.data.path.clone() {
            app.open(&cc.egui_ctx, path);
        }
        app
    }

    fn handle_browse_csv(&mut self, ctx: &egui::Context) {
        if self.load_rx.is_some() {
            return;
        }
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.open(ctx, path);
        }
    }

    /// Show `path`, from the cache when possible, otherwise loading it in a
    /// background thread.
    fn open(&mut self, ctx: &egui::Context, path: PathBuf) {
        self.control_panel.csv_path = Some(path.clone());

        if let Some(loaded) = self.cache.get(&path) {
            self.show_corpus(ctx, loaded);
            return;
        }

        self.chart_viewer.clear();
        self.control_panel.busy = true;
        self.control_panel.set_status("Loading CSV file...");

        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        let repaint = ctx.clone();

        thread::spawn(move || {
            let result = match load_and_normalize(&path) {
                Ok((fingerprint, loaded)) => LoadResult::Complete {
                    fingerprint,
                    loaded,
                },
                Err(e) => LoadResult::Error(e.to_string()),
            };
            let _ = tx.send(result);
            repaint.request_repaint();
        });
    }

    /// Check for CSV loading results
    fn check_load_results(&mut self, ctx: &egui::Context) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(LoadResult::Complete {
                fingerprint,
                loaded,
            }) => {
                self.control_panel.busy = false;
                let loaded = self.cache.insert(fingerprint, loaded);
                debug!(cached = self.cache.len(), "corpus cache updated");
                self.show_corpus(ctx, loaded);
            }
            Ok(LoadResult::Error(message)) => {
                error!(%message, "failed to load corpus");
                self.control_panel.busy = false;
                self.control_panel.set_status(format!("Error: {message}"));
            }
            Err(std::sync::mpsc::TryRecvError::Empty) => self.load_rx = Some(rx),
            Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                self.control_panel.busy = false;
                self.control_panel.set_status("Error: loader stopped unexpectedly");
            }
        }
    }

    fn show_corpus(&mut self, ctx: &egui::Context, loaded: Arc<LoadedCorpus>) {
        self.control_panel
            .set_bounds(loaded.corpus.year_bounds(), self.config.views.default_year_range);
        self.control_panel.profile = Some(loaded.profile.clone());
        self.control_panel.normalize = Some(loaded.normalize);
        self.control_panel.set_status(format!(
            "Loaded {} papers from {}",
            loaded.corpus.len(),
            loaded.source.display()
        ));
        self.current = Some(loaded);
        self.recompute_views(ctx);
    }

    /// Re-run filter and aggregation for the selected years.
    fn recompute_views(&mut self, ctx: &egui::Context) {
        let Some(loaded) = self.current.clone() else {
            return;
        };
        let range = self.control_panel.range();
        let view = RangeFilter::apply_range(&loaded.corpus, range);
        self.control_panel.subset_size = view.len();

        let views = &self.config.views;
        let venues = Aggregator::venue_ranking(&view, views.top_venues);
        let cloud_terms = Aggregator::term_frequency(&view, None);
        let (venues, cloud_terms) = match (venues, cloud_terms) {
            (Ok(venues), Ok(terms)) => (venues, terms),
            (Err(e), _) | (_, Err(e)) => {
                self.control_panel.set_status(format!("Error: {e}"));
                return;
            }
        };
        let terms = match Aggregator::term_frequency(&view, Some(views.top_terms)) {
            Ok(terms) => terms,
            Err(e) => {
                self.control_panel.set_status(format!("Error: {e}"));
                return;
            }
        };

        let wordcloud = match render_word_cloud(&cloud_terms, &self.config.wordcloud) {
            Ok((image, layout)) => {
                info!(words = layout.words.len(), "word cloud rendered");
                let color_image = egui::ColorImage::from_rgb(
                    [image.width as usize, image.height as usize],
                    &image.pixels,
                );
                Some(ctx.load_texture("title_wordcloud", color_image, egui::TextureOptions::LINEAR))
            }
            Err(RenderError::Empty(_)) => None,
            Err(e) => {
                warn!(error = %e, "word cloud not rendered");
                None
            }
        };

        self.chart_viewer.set_views(Views {
            histogram: Aggregator::year_histogram(&view),
            venues,
            terms,
            preview: view
                .preview(views.preview_rows)
                .iter()
                .map(|r| PreviewRow::from(*r))
                .collect(),
            wordcloud,
        });
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results(ctx);

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(280.0)
            .max_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(ctx),
                        ControlPanelAction::RangeChanged => self.recompute_views(ctx),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}
