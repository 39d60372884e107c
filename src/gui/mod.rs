//! GUI module - interactive explorer window

mod app;
mod cache;
mod chart_viewer;
mod control_panel;

pub use app::ExplorerApp;
