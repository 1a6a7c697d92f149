pub mod app;
pub mod document;
pub mod event;
pub mod input;
pub mod keymap;
pub mod theme;
pub mod themes;
pub mod ui;
pub mod widgets;

pub use app::{App, ROW_HEIGHT};
pub use document::Document;
pub use theme::Theme;
pub use themes::load_theme;
