//! View hierarchy model
//!
//! A [`View`] is a reference-counted node with a weak link to its parent and
//! strong links to its children. Scrollable nodes carry a [`ScrollSurface`]
//! whose geometry changes are observable per property.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::geometry::MetricsSnapshot;

static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(u64);

impl ViewId {
    fn next() -> Self {
        Self(NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// Top of an attached hierarchy
    Window,
    /// Plain grouping node
    Container,
    /// Non-interactive node layered over its siblings
    Overlay,
    /// Scrollable container backed by a [`ScrollSurface`]
    Scroll,
}

struct ViewNode {
    id: ViewId,
    kind: ViewKind,
    label: String,
    parent: RefCell<Weak<ViewNode>>,
    children: RefCell<Vec<View>>,
    surface: Option<Rc<ScrollSurface>>,
}

/// Handle to a node in the view hierarchy
#[derive(Clone)]
pub struct View {
    node: Rc<ViewNode>,
}

/// Non-owning handle to a [`View`]
#[derive(Clone, Default)]
pub struct WeakView {
    node: Weak<ViewNode>,
}

impl WeakView {
    pub fn upgrade(&self) -> Option<View> {
        self.node.upgrade().map(|node| View { node })
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("id", &self.node.id)
            .field("kind", &self.node.kind)
            .field("label", &self.node.label)
            .field("children", &self.node.children.borrow().len())
            .finish()
    }
}

impl View {
    fn with_kind(kind: ViewKind, label: &str, surface: Option<Rc<ScrollSurface>>) -> Self {
        Self {
            node: Rc::new(ViewNode {
                id: ViewId::next(),
                kind,
                label: label.to_string(),
                parent: RefCell::new(Weak::new()),
                children: RefCell::new(Vec::new()),
                surface,
            }),
        }
    }

    pub fn new_window(label: &str) -> Self {
        Self::with_kind(ViewKind::Window, label, None)
    }

    pub fn new_container(label: &str) -> Self {
        Self::with_kind(ViewKind::Container, label, None)
    }

    pub fn new_overlay(label: &str) -> Self {
        Self::with_kind(ViewKind::Overlay, label, None)
    }

    pub fn new_scroll(label: &str, surface: ScrollSurface) -> Self {
        Self::with_kind(ViewKind::Scroll, label, Some(Rc::new(surface)))
    }

    pub fn id(&self) -> ViewId {
        self.node.id
    }

    pub fn kind(&self) -> ViewKind {
        self.node.kind
    }

    pub fn label(&self) -> &str {
        &self.node.label
    }

    pub fn is_scrollable(&self) -> bool {
        self.node.surface.is_some()
    }

    /// Scroll surface of this node, if it is a scrollable container
    pub fn surface(&self) -> Option<Rc<ScrollSurface>> {
        self.node.surface.clone()
    }

    pub fn downgrade(&self) -> WeakView {
        WeakView {
            node: Rc::downgrade(&self.node),
        }
    }

    pub fn ptr_eq(&self, other: &View) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }

    pub fn parent(&self) -> Option<View> {
        self.node.parent.borrow().upgrade().map(|node| View { node })
    }

    pub fn children(&self) -> Vec<View> {
        self.node.children.borrow().clone()
    }

    /// Append `child`, detaching it from any previous parent first
    ///
    /// Adding a view to itself or to one of its own descendants is ignored.
    pub fn add_child(&self, child: &View) -> &Self {
        if self.ptr_eq(child) || self.ancestors().any(|a| a.ptr_eq(child)) {
            tracing::warn!(parent = %self.id(), child = %child.id(), "Refusing to create a cycle in view hierarchy");
            return self;
        }
        child.remove_from_parent();
        *child.node.parent.borrow_mut() = Rc::downgrade(&self.node);
        self.node.children.borrow_mut().push(child.clone());
        self
    }

    pub fn remove_from_parent(&self) {
        if let Some(parent) = self.parent() {
            parent
                .node
                .children
                .borrow_mut()
                .retain(|c| !c.ptr_eq(self));
        }
        *self.node.parent.borrow_mut() = Weak::new();
    }

    /// Ancestors of this view, nearest first
    pub fn ancestors(&self) -> impl Iterator<Item = View> {
        std::iter::successors(Some(self.clone()), |v| v.parent()).skip(1)
    }

    /// Nearest window at or above this view
    pub fn enclosing_window(&self) -> Option<View> {
        std::iter::once(self.clone())
            .chain(self.ancestors())
            .find(|v| v.kind() == ViewKind::Window)
    }
}

/// Observable property of a [`ScrollSurface`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceProperty {
    ContentOffset,
    ContentSize,
    /// Viewport height and chrome insets
    Bounds,
}

type ObserverFn = Rc<dyn Fn(SurfaceProperty)>;

struct Observation {
    token: u64,
    property: SurfaceProperty,
    callback: ObserverFn,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct SurfaceGeometry {
    content_offset_y: f64,
    content_height: f64,
    viewport_height: f64,
    inset_top: f64,
    inset_bottom: f64,
}

/// Geometry of a scrollable container
///
/// Heights of zero mean layout has not run yet.
#[derive(Default)]
pub struct ScrollSurface {
    geometry: Cell<SurfaceGeometry>,
    observers: RefCell<Vec<Observation>>,
    next_token: Cell<u64>,
    offset_writes: Cell<u64>,
}

impl fmt::Debug for ScrollSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollSurface")
            .field("geometry", &self.geometry.get())
            .field("observers", &self.observers.borrow().len())
            .finish()
    }
}

impl ScrollSurface {
    pub fn new(content_height: f64, viewport_height: f64) -> Self {
        let surface = Self::default();
        surface.geometry.set(SurfaceGeometry {
            content_height,
            viewport_height,
            ..Default::default()
        });
        surface
    }

    pub fn with_insets(self, top: f64, bottom: f64) -> Self {
        let mut g = self.geometry.get();
        g.inset_top = top;
        g.inset_bottom = bottom;
        self.geometry.set(g);
        self
    }

    pub fn with_offset(self, offset_y: f64) -> Self {
        let mut g = self.geometry.get();
        g.content_offset_y = offset_y;
        self.geometry.set(g);
        self
    }

    pub fn content_offset_y(&self) -> f64 {
        self.geometry.get().content_offset_y
    }

    pub fn content_height(&self) -> f64 {
        self.geometry.get().content_height
    }

    pub fn viewport_height(&self) -> f64 {
        self.geometry.get().viewport_height
    }

    pub fn insets(&self) -> (f64, f64) {
        let g = self.geometry.get();
        (g.inset_top, g.inset_bottom)
    }

    /// True once layout produced real content and viewport heights
    pub fn is_laid_out(&self) -> bool {
        let g = self.geometry.get();
        g.content_height > 1.0 && g.viewport_height > 1.0
    }

    /// Number of offset writes issued, including writes of an unchanged value
    pub fn offset_write_count(&self) -> u64 {
        self.offset_writes.get()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let g = self.geometry.get();
        MetricsSnapshot::new(
            g.content_offset_y,
            g.content_height,
            g.viewport_height,
            g.inset_top,
            g.inset_bottom,
        )
    }

    pub fn set_content_offset_y(&self, offset_y: f64) {
        self.offset_writes.set(self.offset_writes.get() + 1);
        self.update(SurfaceProperty::ContentOffset, |g| g.content_offset_y = offset_y);
    }

    pub fn set_content_height(&self, height: f64) {
        self.update(SurfaceProperty::ContentSize, |g| g.content_height = height);
    }

    pub fn set_viewport_height(&self, height: f64) {
        self.update(SurfaceProperty::Bounds, |g| g.viewport_height = height);
    }

    pub fn set_insets(&self, top: f64, bottom: f64) {
        self.update(SurfaceProperty::Bounds, |g| {
            g.inset_top = top;
            g.inset_bottom = bottom;
        });
    }

    fn update(&self, property: SurfaceProperty, apply: impl FnOnce(&mut SurfaceGeometry)) {
        let before = self.geometry.get();
        let mut after = before;
        apply(&mut after);
        if after == before {
            return;
        }
        self.geometry.set(after);
        self.notify(property);
    }

    fn notify(&self, property: SurfaceProperty) {
        // Callbacks may register or drop observations, so release the borrow first.
        let callbacks: Vec<ObserverFn> = self
            .observers
            .borrow()
            .iter()
            .filter(|o| o.property == property)
            .map(|o| Rc::clone(&o.callback))
            .collect();
        for callback in callbacks {
            callback(property);
        }
    }

    /// Register `callback` for changes of `property`
    ///
    /// The observation lasts until the returned handle is dropped or invalidated.
    pub fn observe<F>(self: &Rc<Self>, property: SurfaceProperty, callback: F) -> ObservationHandle
    where
        F: Fn(SurfaceProperty) + 'static,
    {
        let token = self.next_token.get();
        self.next_token.set(token + 1);
        self.observers.borrow_mut().push(Observation {
            token,
            property,
            callback: Rc::new(callback),
        });
        ObservationHandle {
            surface: Rc::downgrade(self),
            token: Some(token),
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    fn unregister(&self, token: u64) {
        self.observers.borrow_mut().retain(|o| o.token != token);
    }
}

/// Live registration of a surface observer
#[must_use = "dropping the handle ends the observation"]
pub struct ObservationHandle {
    surface: Weak<ScrollSurface>,
    token: Option<u64>,
}

impl ObservationHandle {
    pub fn invalidate(&mut self) {
        if let Some(token) = self.token.take() {
            if let Some(surface) = self.surface.upgrade() {
                surface.unregister(token);
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        self.token.is_some() && self.surface.strong_count() > 0
    }
}

impl Drop for ObservationHandle {
    fn drop(&mut self) {
        self.invalidate();
    }
}
