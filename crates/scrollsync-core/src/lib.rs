pub mod config;
pub mod dispatch;
pub mod error;
pub mod geometry;
pub mod indicator;
pub mod locator;
pub mod observer;
pub mod restorer;
pub mod store;
pub mod sync;
pub mod view;

pub use config::AppConfig;
pub use dispatch::UiQueue;
pub use error::{Error, Result};
pub use geometry::{clamp_progress, MetricsSnapshot, ScrollRange};
pub use indicator::{IndicatorGeometry, IndicatorStyle, Tint};
pub use locator::locate_scroll_surface;
pub use observer::{AttachOutcome, ScrollMetricsObserver, Subscription};
pub use restorer::{ProgressRestorer, RestoreDecision, RestoreOutcome, RestoreState};
pub use store::{ProgressStore, ProgressWriter, SavedProgress};
pub use sync::ScrollSync;
pub use view::{ObservationHandle, ScrollSurface, SurfaceProperty, View, ViewId, ViewKind, WeakView};
