//! Charts module - static chart and word cloud rendering

mod renderer;
mod wordcloud;

pub use renderer::{ChartImage, RenderError, StaticChartRenderer};
pub use wordcloud::{render_word_cloud, PlacedWord, WordCloudLayout, WordCloudOptions, PALETTE};
