//! One-shot restoration of a saved reading position
//!
//! The restorer waits until the surface has been laid out, then applies the
//! saved progress on the following UI tick. Once it has run to completion it
//! never touches the surface again for the lifetime of the screen instance.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::dispatch::UiQueue;
use crate::geometry::clamp_progress;
use crate::locator::locate_scroll_surface;
use crate::view::{View, WeakView};

/// Offsets within this distance of the target are left as they are
pub const RESTORE_TOLERANCE: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestoreState {
    #[default]
    NotRestored,
    /// Terminal
    Restored,
}

/// What a call to [`ProgressRestorer::restore_if_needed`] did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RestoreDecision {
    Disabled,
    NoTarget,
    AlreadyRestored,
    /// A restore tick is already queued
    AlreadyScheduled,
    SurfaceNotFound,
    /// Surface exists but has not been laid out; try again next pass
    LayoutPending,
    Scheduled { progress: f64 },
}

/// Result of a scheduled restore tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RestoreOutcome {
    Applied { from: f64, to: f64 },
    WithinTolerance { offset: f64, target: f64 },
    /// Surface vanished before the tick ran; state stays `NotRestored`
    Abandoned,
}

#[derive(Debug, Default)]
struct RestorerInner {
    state: RestoreState,
    scheduled: bool,
    last_outcome: Option<RestoreOutcome>,
}

/// Applies a saved progress value to the scroll surface at most once
#[derive(Debug)]
pub struct ProgressRestorer {
    queue: UiQueue,
    tolerance: f64,
    inner: Rc<RefCell<RestorerInner>>,
}

impl ProgressRestorer {
    pub fn new(queue: UiQueue) -> Self {
        Self::with_tolerance(queue, RESTORE_TOLERANCE)
    }

    pub fn with_tolerance(queue: UiQueue, tolerance: f64) -> Self {
        let tolerance = if tolerance.is_finite() {
            tolerance.max(0.0)
        } else {
            RESTORE_TOLERANCE
        };
        Self {
            queue,
            tolerance,
            inner: Rc::new(RefCell::new(RestorerInner::default())),
        }
    }

    pub fn state(&self) -> RestoreState {
        self.inner.borrow().state
    }

    pub fn is_scheduled(&self) -> bool {
        self.inner.borrow().scheduled
    }

    pub fn last_outcome(&self) -> Option<RestoreOutcome> {
        self.inner.borrow().last_outcome
    }

    /// Schedule restoration of `target` if every precondition holds
    ///
    /// Hosts call this on every render pass; only the first call that finds a
    /// laid-out surface schedules work.
    pub fn restore_if_needed(&self, enabled: bool, target: Option<f64>, host: &View) -> RestoreDecision {
        if !enabled {
            return RestoreDecision::Disabled;
        }
        let Some(target) = target else {
            return RestoreDecision::NoTarget;
        };
        {
            let inner = self.inner.borrow();
            if inner.state == RestoreState::Restored {
                return RestoreDecision::AlreadyRestored;
            }
            if inner.scheduled {
                return RestoreDecision::AlreadyScheduled;
            }
        }

        let Some(surface) = locate_scroll_surface(host).and_then(|v| v.surface()) else {
            return RestoreDecision::SurfaceNotFound;
        };
        if !surface.is_laid_out() {
            tracing::trace!(
                content_height = surface.content_height(),
                viewport_height = surface.viewport_height(),
                "Deferring restore until layout settles"
            );
            return RestoreDecision::LayoutPending;
        }

        let progress = clamp_progress(target);
        self.inner.borrow_mut().scheduled = true;

        let inner = Rc::downgrade(&self.inner);
        let host = host.downgrade();
        let tolerance = self.tolerance;
        self.queue
            .post(move || run_restore(&inner, &host, progress, tolerance));

        tracing::debug!(progress, "Scheduled progress restore");
        RestoreDecision::Scheduled { progress }
    }
}

fn run_restore(inner: &Weak<RefCell<RestorerInner>>, host: &WeakView, progress: f64, tolerance: f64) {
    // Restorer dropped with its screen.
    let Some(inner) = inner.upgrade() else {
        return;
    };
    {
        let mut i = inner.borrow_mut();
        i.scheduled = false;
        if i.state == RestoreState::Restored {
            return;
        }
    }

    let surface = host
        .upgrade()
        .and_then(|h| locate_scroll_surface(&h))
        .and_then(|v| v.surface())
        .filter(|s| s.is_laid_out());
    let Some(surface) = surface else {
        tracing::debug!(progress, "Scroll surface gone before restore tick, will retry");
        inner.borrow_mut().last_outcome = Some(RestoreOutcome::Abandoned);
        return;
    };

    let target = surface.snapshot().range().offset_for(progress);
    let current = surface.content_offset_y();
    let outcome = if (current - target).abs() > tolerance {
        RestoreOutcome::Applied { from: current, to: target }
    } else {
        RestoreOutcome::WithinTolerance { offset: current, target }
    };

    {
        let mut i = inner.borrow_mut();
        i.state = RestoreState::Restored;
        i.last_outcome = Some(outcome);
    }

    // Observers may run inline here, so no borrow is held.
    if let RestoreOutcome::Applied { to, .. } = outcome {
        surface.set_content_offset_y(to);
    }
    tracing::info!(progress, ?outcome, "Restored reading position");
}
