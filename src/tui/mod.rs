//! TUI module: Terminal User Interface using Ratatui.
//!
//! Two screens:
//! - Clinical record entry form
//! - Prediction result with report export

mod app;
mod styles;
mod ui;

pub use app::{App, Screen};
pub use styles::CardioTheme;
