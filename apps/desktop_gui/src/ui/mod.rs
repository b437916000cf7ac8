//! UI layer for the wizard window: app shell, chart view, and shared widgets.

pub mod app;
pub mod chart;
pub mod widgets;

pub use app::DatavizApp;
