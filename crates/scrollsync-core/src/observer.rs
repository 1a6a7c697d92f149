//! Scroll metrics observation
//!
//! [`ScrollMetricsObserver`] locates the scroll surface near a host view and
//! reports a fresh [`MetricsSnapshot`] whenever the surface's offset, content
//! size or bounds change. Reports always run on the UI context.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::dispatch::UiQueue;
use crate::geometry::MetricsSnapshot;
use crate::locator::locate_scroll_surface;
use crate::view::{ObservationHandle, ScrollSurface, SurfaceProperty, View, WeakView};

type MetricsCallback = Rc<dyn Fn(MetricsSnapshot)>;

const OBSERVED_PROPERTIES: [SurfaceProperty; 3] = [
    SurfaceProperty::ContentOffset,
    SurfaceProperty::ContentSize,
    SurfaceProperty::Bounds,
];

#[derive(Default)]
struct ObserverState {
    surface: Weak<ScrollSurface>,
    surface_view: WeakView,
    handles: Vec<ObservationHandle>,
    /// Bumped on every attach and detach; stale emissions compare against it
    epoch: u64,
}

impl ObserverState {
    fn is_attached(&self) -> bool {
        self.surface.strong_count() > 0
    }

    /// Clear the attachment, handing back the handles so they drop outside the borrow
    fn clear(&mut self) -> Vec<ObservationHandle> {
        self.epoch += 1;
        self.surface = Weak::new();
        self.surface_view = WeakView::default();
        std::mem::take(&mut self.handles)
    }
}

/// Result of [`ScrollMetricsObserver::attach`]
pub enum AttachOutcome {
    /// Observation started; dropping the subscription stops it
    Attached(Subscription),
    /// Already observing a live surface, nothing changed
    AlreadyAttached,
    /// No scroll surface near the host yet; retry on a later pass
    SurfaceNotFound,
}

impl AttachOutcome {
    pub fn is_attached(&self) -> bool {
        matches!(self, AttachOutcome::Attached(_))
    }

    pub fn into_subscription(self) -> Option<Subscription> {
        match self {
            AttachOutcome::Attached(sub) => Some(sub),
            _ => None,
        }
    }
}

impl fmt::Debug for AttachOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachOutcome::Attached(_) => f.write_str("Attached"),
            AttachOutcome::AlreadyAttached => f.write_str("AlreadyAttached"),
            AttachOutcome::SurfaceNotFound => f.write_str("SurfaceNotFound"),
        }
    }
}

/// Owned scope of one attachment
///
/// Dropping it detaches the observer, unless the observer has since been
/// detached and attached again.
#[must_use = "dropping the subscription detaches the observer"]
pub struct Subscription {
    state: Weak<RefCell<ObserverState>>,
    epoch: u64,
}

impl Subscription {
    /// Detach now instead of at drop
    pub fn cancel(self) {}

    pub fn is_active(&self) -> bool {
        self.state
            .upgrade()
            .map(|s| {
                let s = s.borrow();
                s.epoch == self.epoch && s.is_attached()
            })
            .unwrap_or(false)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(state) = self.state.upgrade() else {
            return;
        };
        let handles = {
            let mut s = state.borrow_mut();
            if s.epoch != self.epoch {
                return;
            }
            s.clear()
        };
        drop(handles);
    }
}

/// Observes the scroll surface nearest to a host view
pub struct ScrollMetricsObserver {
    queue: UiQueue,
    state: Rc<RefCell<ObserverState>>,
}

impl ScrollMetricsObserver {
    pub fn new(queue: UiQueue) -> Self {
        Self {
            queue,
            state: Rc::new(RefCell::new(ObserverState::default())),
        }
    }

    /// Start observing the scroll surface nearest to `host`
    ///
    /// Emits one snapshot synchronously on success. Calling this while a live
    /// surface is already observed does nothing.
    pub fn attach<F>(&self, host: &View, on_update: F) -> AttachOutcome
    where
        F: Fn(MetricsSnapshot) + 'static,
    {
        let stale = {
            let mut s = self.state.borrow_mut();
            if s.is_attached() {
                return AttachOutcome::AlreadyAttached;
            }
            // The previous surface went away without a detach.
            s.clear()
        };
        drop(stale);

        let Some(view) = locate_scroll_surface(host) else {
            return AttachOutcome::SurfaceNotFound;
        };
        let Some(surface) = view.surface() else {
            return AttachOutcome::SurfaceNotFound;
        };

        let callback: MetricsCallback = Rc::new(on_update);
        let epoch = {
            let mut s = self.state.borrow_mut();
            s.epoch += 1;
            s.surface = Rc::downgrade(&surface);
            s.surface_view = view.downgrade();
            s.epoch
        };

        tracing::debug!(host = %host.id(), surface = %view.id(), epoch, "Attached scroll metrics observer");
        callback(surface.snapshot());

        let handles: Vec<ObservationHandle> = OBSERVED_PROPERTIES
            .iter()
            .map(|&property| {
                let queue = self.queue.clone();
                let state = Rc::downgrade(&self.state);
                let weak_surface = Rc::downgrade(&surface);
                let callback = Rc::clone(&callback);
                surface.observe(property, move |changed| {
                    let state = state.clone();
                    let weak_surface = weak_surface.clone();
                    let callback = Rc::clone(&callback);
                    queue.dispatch(move || {
                        emit_if_current(&state, epoch, &weak_surface, &callback, changed);
                    });
                })
            })
            .collect();

        let mut s = self.state.borrow_mut();
        if s.epoch == epoch {
            s.handles = handles;
        }
        drop(s);

        AttachOutcome::Attached(Subscription {
            state: Rc::downgrade(&self.state),
            epoch,
        })
    }

    /// Stop observing and forget the surface
    pub fn detach(&self) {
        let handles = self.state.borrow_mut().clear();
        if !handles.is_empty() {
            tracing::debug!(released = handles.len(), "Detached scroll metrics observer");
        }
        drop(handles);
    }

    pub fn is_attached(&self) -> bool {
        self.state.borrow().is_attached()
    }

    /// View currently observed, if it is still alive
    pub fn observed_surface(&self) -> Option<View> {
        let s = self.state.borrow();
        if !s.is_attached() {
            return None;
        }
        s.surface_view.upgrade()
    }
}

fn emit_if_current(
    state: &Weak<RefCell<ObserverState>>,
    epoch: u64,
    surface: &Weak<ScrollSurface>,
    callback: &MetricsCallback,
    changed: SurfaceProperty,
) {
    let Some(state) = state.upgrade() else {
        return;
    };
    if state.borrow().epoch != epoch {
        tracing::trace!(?changed, "Dropping emission from a finished attachment");
        return;
    }
    let Some(surface) = surface.upgrade() else {
        return;
    };
    callback(surface.snapshot());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Fixture {
        queue: UiQueue,
        _window: View,
        reader: View,
        anchor: View,
    }

    fn fixture() -> Fixture {
        let queue = UiQueue::new();
        let window = View::new_window("window");
        let reader = View::new_scroll("reader", ScrollSurface::new(1000.0, 400.0));
        let anchor = View::new_overlay("anchor");
        window.add_child(&reader);
        window.add_child(&anchor);
        Fixture {
            queue,
            _window: window,
            reader,
            anchor,
        }
    }

    fn recorder() -> (Rc<RefCell<Vec<MetricsSnapshot>>>, impl Fn(MetricsSnapshot) + 'static) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        (log, move |snap| sink.borrow_mut().push(snap))
    }

    #[test]
    fn test_attach_emits_initial_snapshot() {
        let fx = fixture();
        let observer = ScrollMetricsObserver::new(fx.queue.clone());
        let (log, sink) = recorder();

        let outcome = observer.attach(&fx.anchor, sink);
        assert!(outcome.is_attached());
        assert_eq!(log.borrow().len(), 1);
        assert!((log.borrow()[0].content_height - 1000.0).abs() < f64::EPSILON);
        assert!(observer.observed_surface().unwrap().ptr_eq(&fx.reader));
    }

    #[test]
    fn test_attach_is_idempotent() {
        let fx = fixture();
        let observer = ScrollMetricsObserver::new(fx.queue.clone());
        let (log, sink) = recorder();
        let _sub = observer.attach(&fx.anchor, sink).into_subscription().unwrap();

        let (_, sink2) = recorder();
        assert!(matches!(observer.attach(&fx.anchor, sink2), AttachOutcome::AlreadyAttached));
        assert_eq!(fx.reader.surface().unwrap().observer_count(), 3);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_changes_off_ui_context_are_redispatched() {
        let fx = fixture();
        let observer = ScrollMetricsObserver::new(fx.queue.clone());
        let (log, sink) = recorder();
        let _sub = observer.attach(&fx.anchor, sink);
        let surface = fx.reader.surface().unwrap();

        surface.set_content_offset_y(150.0);
        surface.set_content_height(1200.0);
        surface.set_viewport_height(500.0);
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(fx.queue.pending(), 3);

        fx.queue.run_tick();
        let log = log.borrow();
        assert_eq!(log.len(), 4);
        // Snapshots are taken when the task runs, so all reflect the final state.
        assert!((log[1].content_offset_y - 150.0).abs() < f64::EPSILON);
        assert!((log[3].viewport_height - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_changes_on_ui_context_emit_inline() {
        let fx = fixture();
        let observer = ScrollMetricsObserver::new(fx.queue.clone());
        let (log, sink) = recorder();
        let _sub = observer.attach(&fx.anchor, sink);
        let surface = fx.reader.surface().unwrap();

        let _ui = fx.queue.enter();
        surface.set_insets(20.0, 10.0);
        assert_eq!(log.borrow().len(), 2);
        assert_eq!(fx.queue.pending(), 0);
        assert!((log.borrow()[1].inset_top - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_detach_releases_handles_and_drops_pending() {
        let fx = fixture();
        let observer = ScrollMetricsObserver::new(fx.queue.clone());
        let (log, sink) = recorder();
        let _sub = observer.attach(&fx.anchor, sink);
        let surface = fx.reader.surface().unwrap();

        surface.set_content_offset_y(80.0);
        observer.detach();
        assert_eq!(surface.observer_count(), 0);
        assert!(!observer.is_attached());

        fx.queue.run_tick();
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_dropping_subscription_detaches() {
        let fx = fixture();
        let observer = ScrollMetricsObserver::new(fx.queue.clone());
        let (_, sink) = recorder();
        let sub = observer.attach(&fx.anchor, sink).into_subscription().unwrap();
        assert!(sub.is_active());
        sub.cancel();
        assert!(!observer.is_attached());
        assert_eq!(fx.reader.surface().unwrap().observer_count(), 0);
    }

    #[test]
    fn test_stale_subscription_does_not_detach_new_attachment() {
        let fx = fixture();
        let observer = ScrollMetricsObserver::new(fx.queue.clone());
        let (_, sink) = recorder();
        let old = observer.attach(&fx.anchor, sink).into_subscription().unwrap();
        observer.detach();

        let (_, sink) = recorder();
        let _new = observer.attach(&fx.anchor, sink).into_subscription().unwrap();
        drop(old);
        assert!(observer.is_attached());
        assert_eq!(fx.reader.surface().unwrap().observer_count(), 3);
    }

    #[test]
    fn test_reusable_for_different_surface() {
        let fx = fixture();
        let observer = ScrollMetricsObserver::new(fx.queue.clone());
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _sub = observer.attach(&fx.anchor, move |_| h.set(h.get() + 1));
        observer.detach();

        let other_window = View::new_window("other");
        let other_reader = View::new_scroll("other-reader", ScrollSurface::new(3000.0, 600.0));
        let other_anchor = View::new_overlay("other-anchor");
        other_window.add_child(&other_reader);
        other_window.add_child(&other_anchor);

        let h = Rc::clone(&hits);
        let _sub = observer.attach(&other_anchor, move |_| h.set(h.get() + 1));
        assert!(observer.observed_surface().unwrap().ptr_eq(&other_reader));

        fx.reader.surface().unwrap().set_content_offset_y(10.0);
        other_reader.surface().unwrap().set_content_offset_y(10.0);
        fx.queue.run_tick();
        assert_eq!(hits.get(), 3);
    }

    #[test]
    fn test_not_found_leaves_observer_unstarted() {
        let queue = UiQueue::new();
        let window = View::new_window("window");
        let anchor = View::new_overlay("anchor");
        window.add_child(&anchor);
        let observer = ScrollMetricsObserver::new(queue);
        let (log, sink) = recorder();

        assert!(matches!(observer.attach(&anchor, sink), AttachOutcome::SurfaceNotFound));
        assert!(!observer.is_attached());
        assert!(log.borrow().is_empty());

        let reader = View::new_scroll("reader", ScrollSurface::new(900.0, 300.0));
        window.add_child(&reader);
        let (log, sink) = recorder();
        assert!(observer.attach(&anchor, sink).is_attached());
        assert_eq!(log.borrow().len(), 1);
    }
}
