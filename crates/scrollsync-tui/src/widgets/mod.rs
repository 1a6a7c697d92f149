mod indicator;
mod reader;
mod status_bar;

pub use indicator::ProgressIndicator;
pub use reader::ReaderWidget;
pub use status_bar::StatusBarWidget;
