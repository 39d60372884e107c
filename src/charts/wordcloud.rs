//! Word cloud of title terms.
//!
//! Layout and drawing are split: [`WordCloudLayout::compute`] places words on
//! an Archimedean spiral using any text-measuring function, and
//! [`render_word_cloud`] measures with plotters fonts and rasterizes the
//! result into a [`ChartImage`].

use super::renderer::{backend_error, ChartImage, RenderError};
use crate::stats::TermFrequency;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};

const FONT: &str = "sans-serif";
/// Gap kept between word boxes, in pixels.
const PADDING: i32 = 2;
/// Each failed fit shrinks the font by this factor.
const SHRINK: f64 = 0.8;
const SPIRAL_STEP: f64 = 0.1;

/// Colors cycled over words, most frequent first.
pub const PALETTE: [(u8, u8, u8); 10] = [
    (231, 76, 60),   // Red
    (46, 204, 113),  // Green
    (155, 89, 182),  // Purple
    (243, 156, 18),  // Orange
    (26, 188, 156),  // Teal
    (233, 30, 99),   // Pink
    (0, 188, 212),   // Cyan
    (52, 152, 219),  // Blue
    (121, 85, 72),   // Brown
    (96, 125, 139),  // Blue Grey
];

/// Canvas and font settings for the cloud.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordCloudOptions {
    pub width: u32,
    pub height: u32,
    pub max_words: usize,
    pub min_font: f64,
    pub max_font: f64,
}

impl Default for WordCloudOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            max_words: 200,
            min_font: 10.0,
            max_font: 72.0,
        }
    }
}

/// One word with its top-left corner and box size.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub word: String,
    pub count: usize,
    pub font_size: f64,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub color: (u8, u8, u8),
}

impl PlacedWord {
    fn overlaps(&self, x: i32, y: i32, w: u32, h: u32) -> bool {
        x < self.x + self.width as i32 + PADDING
            && self.x < x + w as i32 + PADDING
            && y < self.y + self.height as i32 + PADDING
            && self.y < y + h as i32 + PADDING
    }
}

/// Non-overlapping placement of words inside the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct WordCloudLayout {
    pub width: u32,
    pub height: u32,
    pub words: Vec<PlacedWord>,
}

impl WordCloudLayout {
    /// Place up to `options.max_words` terms, biggest first.
    ///
    /// Font size scales linearly with relative frequency between `min_font`
    /// and `max_font`. A word that does not fit is retried smaller; words
    /// that still do not fit at `min_font` are left out. `measure` returns the
    /// pixel box of a word at a font size.
    pub fn compute<E>(
        terms: &TermFrequency,
        options: &WordCloudOptions,
        mut measure: impl FnMut(&str, f64) -> Result<(u32, u32), E>,
    ) -> Result<Self, E> {
        let mut layout = Self {
            width: options.width,
            height: options.height,
            words: Vec::new(),
        };
        let max_count = terms.max_count().max(1) as f64;
        let span = (options.max_font - options.min_font).max(0.0);

        for (index, (word, count)) in terms.iter().take(options.max_words).enumerate() {
            let mut font_size = options.min_font + span * (count as f64 / max_count);

            loop {
                let (w, h) = measure(word, font_size)?;
                if let Some((x, y)) = layout.find_spot(w, h) {
                    layout.words.push(PlacedWord {
                        word: word.to_string(),
                        count,
                        font_size,
                        x,
                        y,
                        width: w,
                        height: h,
                        color: PALETTE[index % PALETTE.len()],
                    });
                    break;
                }
                let smaller = (font_size * SHRINK).max(options.min_font);
                // Stop at the floor, and on sizes that no longer shrink (NaN, <= 0).
                if font_size <= options.min_font || !(smaller > 0.0 && smaller < font_size) {
                    break;
                }
                font_size = smaller;
            }
        }

        Ok(layout)
    }

    /// First free spot for a `w` x `h` box walking outwards from the center.
    fn find_spot(&self, w: u32, h: u32) -> Option<(i32, i32)> {
        if w == 0 || h == 0 || w > self.width || h > self.height {
            return None;
        }
        let (cx, cy) = (self.width as f64 / 2.0, self.height as f64 / 2.0);
        let aspect = self.height as f64 / self.width as f64;
        let max_radius = cx.hypot(cy);

        let mut t: f64 = 0.0;
        while t * aspect.max(1.0) <= max_radius {
            let x = (cx + t * t.cos() - w as f64 / 2.0).round() as i32;
            let y = (cy + aspect * t * t.sin() - h as f64 / 2.0).round() as i32;
            t += SPIRAL_STEP;

            if x < 0 || y < 0 || x + w as i32 > self.width as i32 || y + h as i32 > self.height as i32 {
                continue;
            }
            if self.words.iter().all(|placed| !placed.overlaps(x, y, w, h)) {
                return Some((x, y));
            }
        }
        None
    }
}

/// Lay out and draw a word cloud on a white canvas.
pub fn render_word_cloud(
    terms: &TermFrequency,
    options: &WordCloudOptions,
) -> Result<(ChartImage, WordCloudLayout), RenderError> {
    if terms.is_empty() {
        return Err(RenderError::Empty("word cloud"));
    }
    let mut image = ChartImage::blank(options.width, options.height)?;

    let layout = {
        let root = BitMapBackend::with_buffer(&mut image.pixels, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(backend_error)?;

        let layout = WordCloudLayout::compute(terms, options, |word, size| {
            let style = TextStyle::from((FONT, size).into_font());
            root.estimate_text_size(word, &style).map_err(backend_error)
        })?;

        for placed in &layout.words {
            let (r, g, b) = placed.color;
            let style = (FONT, placed.font_size).into_font().color(&RGBColor(r, g, b));
            root.draw(&Text::new(placed.word.clone(), (placed.x, placed.y), style))
                .map_err(backend_error)?;
        }
        root.present().map_err(backend_error)?;
        layout
    };

    Ok((image, layout))
}
