//! Scroll surface discovery
//!
//! Observation is anchored by a helper view that usually sits next to the
//! scrollable container rather than inside it. Ancestors are searched first,
//! then the enclosing hierarchy breadth-first.

use std::collections::VecDeque;

use crate::view::View;

/// Nearest scrollable container for `start`, or `None`
///
/// Not finding one is expected during early layout; callers retry on the
/// next render pass.
pub fn locate_scroll_surface(start: &View) -> Option<View> {
    if let Some(found) = find_scrollable_ancestor(start) {
        return Some(found);
    }
    let root = search_root(start);
    let found = find_scrollable_descendant(&root);
    if found.is_none() {
        tracing::debug!(start = %start.id(), root = %root.id(), "No scroll surface in hierarchy");
    }
    found
}

/// First scrollable view walking up from `start` (inclusive)
pub fn find_scrollable_ancestor(start: &View) -> Option<View> {
    std::iter::once(start.clone())
        .chain(start.ancestors())
        .find(View::is_scrollable)
}

/// First scrollable view below `root` in breadth-first order
///
/// `root` itself is not considered.
pub fn find_scrollable_descendant(root: &View) -> Option<View> {
    let mut queue: VecDeque<View> = root.children().into();
    while let Some(view) = queue.pop_front() {
        if view.is_scrollable() {
            return Some(view);
        }
        queue.extend(view.children());
    }
    None
}

/// Window of the hierarchy, or the immediate parent for detached subtrees
fn search_root(start: &View) -> View {
    start
        .enclosing_window()
        .or_else(|| start.parent())
        .unwrap_or_else(|| start.clone())
}
