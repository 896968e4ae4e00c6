//! Process-facing pieces: settings and the rendered report.

pub mod config;
pub mod report;

pub use config::Settings;
pub use report::{render_text, Report};
