//! Host-facing anchor that ties observation and restoration together
//!
//! A [`ScrollSync`] lives for one screen instance. The host calls
//! [`ScrollSync::on_render`] on every render pass; the anchor keeps retrying
//! attachment and restoration until both succeed, publishes the live progress
//! through a callback, and exposes it for the indicator.

use std::cell::Cell;
use std::rc::Rc;

use crate::dispatch::UiQueue;
use crate::geometry::MetricsSnapshot;
use crate::observer::{AttachOutcome, ScrollMetricsObserver, Subscription};
use crate::restorer::{ProgressRestorer, RestoreDecision, RestoreOutcome, RestoreState};
use crate::view::View;

#[derive(Default)]
struct LiveMetrics {
    progress: Cell<Option<f64>>,
    snapshot: Cell<Option<MetricsSnapshot>>,
    updates: Cell<u64>,
}

pub struct ScrollSync {
    observer: ScrollMetricsObserver,
    restorer: ProgressRestorer,
    subscription: Option<Subscription>,
    live: Rc<LiveMetrics>,
    on_progress: Rc<dyn Fn(f64)>,
    debug_logging: Rc<Cell<bool>>,
}

impl ScrollSync {
    pub fn new<F>(queue: UiQueue, on_progress_changed: F) -> Self
    where
        F: Fn(f64) + 'static,
    {
        Self::with_restorer(
            queue.clone(),
            ProgressRestorer::new(queue),
            on_progress_changed,
        )
    }

    pub fn with_restorer<F>(queue: UiQueue, restorer: ProgressRestorer, on_progress_changed: F) -> Self
    where
        F: Fn(f64) + 'static,
    {
        Self {
            observer: ScrollMetricsObserver::new(queue),
            restorer,
            subscription: None,
            live: Rc::new(LiveMetrics::default()),
            on_progress: Rc::new(on_progress_changed),
            debug_logging: Rc::new(Cell::new(false)),
        }
    }

    pub fn set_debug_logging(&self, enabled: bool) {
        self.debug_logging.set(enabled);
    }

    /// Drive attachment and restoration for one render pass
    pub fn on_render(&mut self, host: &View, enabled: bool, saved_progress: Option<f64>) -> RestoreDecision {
        if enabled {
            self.ensure_attached(host);
        } else if self.subscription.take().is_some() {
            tracing::debug!(host = %host.id(), "Tracking disabled, detached observer");
        }

        let decision = self.restorer.restore_if_needed(enabled, saved_progress, host);
        if self.debug_logging.get() {
            tracing::debug!(host = %host.id(), ?decision, "Restore check");
        }
        decision
    }

    fn ensure_attached(&mut self, host: &View) {
        if self.subscription.as_ref().is_some_and(Subscription::is_active) {
            return;
        }

        let live = Rc::clone(&self.live);
        let on_progress = Rc::clone(&self.on_progress);
        let debug = Rc::clone(&self.debug_logging);
        let outcome = self.observer.attach(host, move |snapshot| {
            let progress = snapshot.progress();
            live.progress.set(Some(progress));
            live.snapshot.set(Some(snapshot));
            live.updates.set(live.updates.get() + 1);
            if debug.get() {
                tracing::debug!(
                    offset = snapshot.content_offset_y,
                    logical_offset = snapshot.logical_offset_y(),
                    content = snapshot.content_height,
                    viewport = snapshot.viewport_height,
                    progress,
                    "Scroll metrics"
                );
            }
            on_progress(progress);
        });

        match outcome {
            AttachOutcome::Attached(sub) => self.subscription = Some(sub),
            AttachOutcome::AlreadyAttached => {}
            AttachOutcome::SurfaceNotFound => {
                if self.debug_logging.get() {
                    tracing::debug!(host = %host.id(), "Scroll surface not found, will retry next render");
                }
            }
        }
    }

    /// Stop observing; restoration state is kept
    pub fn detach(&mut self) {
        self.subscription = None;
        self.observer.detach();
    }

    pub fn is_tracking(&self) -> bool {
        self.observer.is_attached()
    }

    /// Latest progress reported by the observer
    pub fn live_progress(&self) -> Option<f64> {
        self.live.progress.get()
    }

    pub fn last_snapshot(&self) -> Option<MetricsSnapshot> {
        self.live.snapshot.get()
    }

    /// Number of metric updates delivered so far
    pub fn update_count(&self) -> u64 {
        self.live.updates.get()
    }

    pub fn restore_state(&self) -> RestoreState {
        self.restorer.state()
    }

    pub fn last_restore_outcome(&self) -> Option<RestoreOutcome> {
        self.restorer.last_outcome()
    }

    pub fn observed_surface(&self) -> Option<View> {
        self.observer.observed_surface()
    }
}
