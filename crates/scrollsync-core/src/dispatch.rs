//! Single-threaded UI task queue
//!
//! All observation callbacks and deferred restores run on one execution
//! context. Work that arrives from outside that context is posted here and
//! runs on the next tick, in FIFO order.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

type Task = Box<dyn FnOnce()>;

#[derive(Default)]
struct QueueInner {
    tasks: RefCell<VecDeque<Task>>,
    /// Nesting depth of UI-context scopes
    depth: Cell<usize>,
    ticks: Cell<u64>,
}

/// FIFO queue bound to the UI-affinity context
///
/// Cloning yields another handle to the same queue.
#[derive(Clone, Default)]
pub struct UiQueue {
    inner: Rc<QueueInner>,
}

impl fmt::Debug for UiQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiQueue")
            .field("pending", &self.pending())
            .field("ticks", &self.inner.ticks.get())
            .field("ui_context", &self.is_ui_context())
            .finish()
    }
}

/// Marks the enclosing scope as running on the UI context
#[must_use = "the UI context ends when the guard is dropped"]
pub struct UiContextGuard {
    inner: Rc<QueueInner>,
}

impl Drop for UiContextGuard {
    fn drop(&mut self) {
        self.inner.depth.set(self.inner.depth.get().saturating_sub(1));
    }
}

impl UiQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a task for the next tick
    pub fn post<F>(&self, task: F)
    where
        F: FnOnce() + 'static,
    {
        self.inner.tasks.borrow_mut().push_back(Box::new(task));
    }

    /// Run `task` now when already on the UI context, otherwise redispatch it
    pub fn dispatch<F>(&self, task: F)
    where
        F: FnOnce() + 'static,
    {
        if self.is_ui_context() {
            task();
        } else {
            self.post(task);
        }
    }

    /// Enter the UI context for the lifetime of the returned guard
    pub fn enter(&self) -> UiContextGuard {
        self.inner.depth.set(self.inner.depth.get() + 1);
        UiContextGuard {
            inner: Rc::clone(&self.inner),
        }
    }

    #[inline]
    pub fn is_ui_context(&self) -> bool {
        self.inner.depth.get() > 0
    }

    /// Number of tasks waiting for a tick
    pub fn pending(&self) -> usize {
        self.inner.tasks.borrow().len()
    }

    /// Ticks run so far
    pub fn ticks(&self) -> u64 {
        self.inner.ticks.get()
    }

    /// Run every task queued before this call
    ///
    /// Tasks posted while the batch runs are left for the following tick.
    pub fn run_tick(&self) -> usize {
        let batch = std::mem::take(&mut *self.inner.tasks.borrow_mut());
        let _guard = self.enter();
        self.inner.ticks.set(self.inner.ticks.get() + 1);

        let count = batch.len();
        for task in batch {
            task();
        }
        count
    }

    /// Tick until the queue is empty or `max_ticks` ticks have run
    pub fn run_until_idle(&self, max_ticks: usize) -> usize {
        let mut total = 0;
        for _ in 0..max_ticks {
            if self.pending() == 0 {
                break;
            }
            total += self.run_tick();
        }
        total
    }
}
