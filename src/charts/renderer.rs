//! Static Chart Renderer
//! Draws bar charts for the aggregated views into in-memory RGB images.
//!
//! Layout:
//! 1. Title centered on top
//! 2. Vertical bars per year, or horizontal bars per venue (rank 1 on top)
//! 3. Axis descriptions matching the report wording

use crate::stats::{VenueRanking, YearHistogram};
use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

const FONT: &str = "sans-serif";
const BAR: RGBColor = RGBColor(91, 155, 213);
const VENUE_BAR: RGBColor = RGBColor(237, 125, 49);
const GRID: RGBColor = RGBColor(200, 200, 200);
/// Venue names longer than this are shortened on the axis.
const MAX_LABEL_CHARS: usize = 36;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("drawing failed: {0}")]
    Backend(String),
    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("nothing to draw for {0}")]
    Empty(&'static str),
    #[error("invalid image size {width}x{height}")]
    Size { width: u32, height: u32 },
}

pub(crate) fn backend_error<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Backend(err.to_string())
}

/// An RGB raster, row-major, 3 bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ChartImage {
    /// White canvas of the given size.
    pub fn blank(width: u32, height: u32) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::Size { width, height });
        }
        Ok(Self {
            width,
            height,
            pixels: vec![255; width as usize * height as usize * 3],
        })
    }

    /// Encode as PNG (format chosen from the extension).
    pub fn save(&self, path: &Path) -> Result<(), RenderError> {
        let img = image::RgbImage::from_raw(self.width, self.height, self.pixels.clone()).ok_or(
            RenderError::Size {
                width: self.width,
                height: self.height,
            },
        )?;
        img.save(path)?;
        Ok(())
    }
}

/// Renders bar charts with plotters.
pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// "Publications by Year" bar chart.
    pub fn render_year_histogram(
        hist: &YearHistogram,
        width: u32,
        height: u32,
    ) -> Result<ChartImage, RenderError> {
        let (Some(first), Some(last)) = (hist.first_year(), hist.last_year()) else {
            return Err(RenderError::Empty("publications by year"));
        };
        let y_max = Self::axis_max(hist.max_count());
        let mut image = ChartImage::blank(width, height)?;

        {
            let root = BitMapBackend::with_buffer(&mut image.pixels, (width, height))
                .into_drawing_area();
            root.fill(&WHITE).map_err(backend_error)?;

            let mut chart = ChartBuilder::on(&root)
                .caption("Publications by Year", (FONT, 24))
                .margin(12)
                .x_label_area_size(40)
                .y_label_area_size(56)
                .build_cartesian_2d((first..last + 1).into_segmented(), 0u32..y_max)
                .map_err(backend_error)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .bold_line_style(GRID.mix(0.6))
                .x_desc("Year")
                .y_desc("Number of Papers")
                .axis_desc_style((FONT, 15))
                .draw()
                .map_err(backend_error)?;

            chart
                .draw_series(
                    Histogram::vertical(&chart)
                        .style(BAR.filled())
                        .margin(6)
                        .data(hist.iter().map(|(year, count)| (year, count as u32))),
                )
                .map_err(backend_error)?;

            root.present().map_err(backend_error)?;
        }

        Ok(image)
    }

    /// "Top Journals" horizontal bar chart, most frequent venue on top.
    pub fn render_venue_ranking(
        ranking: &VenueRanking,
        width: u32,
        height: u32,
    ) -> Result<ChartImage, RenderError> {
        if ranking.is_empty() {
            return Err(RenderError::Empty("top journals"));
        }
        let n = ranking.len();
        // Row 0 is drawn at the bottom, so the ranking is laid out reversed.
        let labels: Vec<String> = ranking
            .entries()
            .iter()
            .rev()
            .map(|(name, _)| Self::shorten(name))
            .collect();
        let x_max = Self::axis_max(ranking.max_count());
        let mut image = ChartImage::blank(width, height)?;

        {
            let root = BitMapBackend::with_buffer(&mut image.pixels, (width, height))
                .into_drawing_area();
            root.fill(&WHITE).map_err(backend_error)?;

            let mut chart = ChartBuilder::on(&root)
                .caption("Top Journals", (FONT, 24))
                .margin(12)
                .x_label_area_size(40)
                .y_label_area_size((width / 3).max(80))
                .build_cartesian_2d(0u32..x_max, (0usize..n).into_segmented())
                .map_err(backend_error)?;

            let label_of = |value: &SegmentValue<usize>| match value {
                SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
                    labels.get(*i).cloned().unwrap_or_default()
                }
                SegmentValue::Last => String::new(),
            };

            chart
                .configure_mesh()
                .disable_y_mesh()
                .bold_line_style(GRID.mix(0.6))
                .y_labels(n)
                .y_label_formatter(&label_of)
                .x_desc("Paper Count")
                .axis_desc_style((FONT, 15))
                .draw()
                .map_err(backend_error)?;

            chart
                .draw_series(
                    Histogram::horizontal(&chart)
                        .style(VENUE_BAR.filled())
                        .margin(4)
                        .data(
                            ranking
                                .iter()
                                .enumerate()
                                .map(|(rank, (_, count))| (n - 1 - rank, count as u32)),
                        ),
                )
                .map_err(backend_error)?;

            root.present().map_err(backend_error)?;
        }

        Ok(image)
    }

    /// Upper bound for a count axis with ~10% headroom.
    fn axis_max(max_count: usize) -> u32 {
        let max = max_count as u32;
        max + (max / 10).max(1)
    }

    fn shorten(name: &str) -> String {
        if name.chars().count() <= MAX_LABEL_CHARS {
            return name.to_string();
        }
        let mut short: String = name.chars().take(MAX_LABEL_CHARS - 1).collect();
        short.push('…');
        short
    }
}
