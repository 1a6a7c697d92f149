//! Scroll geometry: metric snapshots and the progress <-> offset mapping
//!
//! Progress is the only value that leaves this crate. It is always a fraction
//! in `[0.0, 1.0]` of the scrollable range, so it survives font, window and
//! device changes.

use serde::{Deserialize, Serialize};

/// Smallest dimension a snapshot will report for content or viewport height
pub const MIN_DIMENSION: f64 = 1.0;

/// Clamp a progress value into `[0.0, 1.0]`; NaN maps to `0.0`
#[inline]
pub fn clamp_progress(progress: f64) -> f64 {
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    }
}

#[inline]
fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Immutable capture of a scroll surface at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub content_offset_y: f64,
    pub content_height: f64,
    pub viewport_height: f64,
    pub inset_top: f64,
    pub inset_bottom: f64,
}

impl MetricsSnapshot {
    /// Build a snapshot, clamping both heights to at least [`MIN_DIMENSION`]
    pub fn new(
        content_offset_y: f64,
        content_height: f64,
        viewport_height: f64,
        inset_top: f64,
        inset_bottom: f64,
    ) -> Self {
        Self {
            content_offset_y: finite_or_zero(content_offset_y),
            content_height: finite_or_zero(content_height).max(MIN_DIMENSION),
            viewport_height: finite_or_zero(viewport_height).max(MIN_DIMENSION),
            inset_top: finite_or_zero(inset_top),
            inset_bottom: finite_or_zero(inset_bottom),
        }
    }

    /// Offset measured from the top of the content, ignoring leading chrome
    #[inline]
    pub fn logical_offset_y(&self) -> f64 {
        (self.content_offset_y + self.inset_top).max(0.0)
    }

    pub fn range(&self) -> ScrollRange {
        ScrollRange::from_snapshot(self)
    }

    /// Normalized reading progress of this snapshot
    ///
    /// Measured on the raw `content_offset_y` against [`ScrollRange`], not
    /// on [`Self::logical_offset_y`], so it inverts [`ScrollRange::offset_for`]
    /// exactly whatever the insets.
    pub fn progress(&self) -> f64 {
        self.range().progress_for(self.content_offset_y)
    }
}

/// Reachable content offsets of a surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRange {
    pub min_y: f64,
    pub max_y: f64,
}

impl ScrollRange {
    pub fn from_snapshot(snapshot: &MetricsSnapshot) -> Self {
        let min_y = -snapshot.inset_top;
        let max_y = (snapshot.content_height - snapshot.viewport_height + snapshot.inset_bottom)
            .max(min_y);
        Self { min_y, max_y }
    }

    #[inline]
    pub fn span(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Content offset that corresponds to `progress`
    pub fn offset_for(&self, progress: f64) -> f64 {
        self.min_y + clamp_progress(progress) * self.span()
    }

    /// Progress that corresponds to a raw content offset
    pub fn progress_for(&self, offset: f64) -> f64 {
        let span = self.span();
        if span <= f64::EPSILON || !offset.is_finite() {
            return 0.0;
        }
        clamp_progress((offset - self.min_y) / span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_logical_offset_never_negative() {
        for (offset, inset) in [(-50.0, 0.0), (-100.0, 20.0), (0.0, 0.0), (-20.0, 20.0), (30.0, 10.0)] {
            let snap = MetricsSnapshot::new(offset, 1000.0, 400.0, inset, 0.0);
            assert!(snap.logical_offset_y() >= 0.0, "offset={offset} inset={inset}");
        }
        let snap = MetricsSnapshot::new(30.0, 1000.0, 400.0, 10.0, 0.0);
        assert_close(snap.logical_offset_y(), 40.0);
    }

    #[test]
    fn test_degenerate_dimensions_clamped() {
        let snap = MetricsSnapshot::new(0.0, 0.0, 0.0, 0.0, 0.0);
        assert_close(snap.content_height, 1.0);
        assert_close(snap.viewport_height, 1.0);
        let progress = snap.progress();
        assert!(progress.is_finite());
        assert_close(progress, 0.0);

        let snap = MetricsSnapshot::new(f64::NAN, f64::INFINITY, -5.0, f64::NAN, 0.0);
        assert_close(snap.content_offset_y, 0.0);
        assert_close(snap.content_height, 1.0);
        assert_close(snap.viewport_height, 1.0);
        assert_close(snap.inset_top, 0.0);
    }

    #[test]
    fn test_range_with_insets() {
        let snap = MetricsSnapshot::new(0.0, 1000.0, 400.0, 64.0, 34.0);
        let range = snap.range();
        assert_close(range.min_y, -64.0);
        assert_close(range.max_y, 634.0);
    }

    #[test]
    fn test_short_content_range_collapses() {
        let snap = MetricsSnapshot::new(0.0, 200.0, 400.0, 10.0, 0.0);
        let range = snap.range();
        assert_close(range.min_y, -10.0);
        assert_close(range.max_y, -10.0);
        assert_close(range.progress_for(0.0), 0.0);
        assert_close(range.offset_for(0.7), -10.0);
    }

    #[test]
    fn test_target_stays_in_range() {
        let snap = MetricsSnapshot::new(0.0, 5000.0, 800.0, 47.0, 83.0);
        let range = snap.range();
        for i in 0..=20 {
            let target = range.offset_for(i as f64 / 20.0);
            assert!(target >= range.min_y && target <= range.max_y);
        }
    }

    #[test]
    fn test_round_trip_midpoint() {
        let snap = MetricsSnapshot::new(0.0, 1000.0, 400.0, 0.0, 0.0);
        let range = snap.range();
        let offset = range.offset_for(0.5);
        assert_close(offset, 300.0);
        let restored = MetricsSnapshot::new(offset, 1000.0, 400.0, 0.0, 0.0);
        assert!((restored.progress() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_round_trip_with_insets() {
        let range = MetricsSnapshot::new(0.0, 3000.0, 700.0, 91.0, 34.0).range();
        for p in [0.0, 0.25, 0.5, 0.9, 1.0] {
            assert!((range.progress_for(range.offset_for(p)) - p).abs() < 1e-9);
        }
    }

    #[test]
    fn test_snapshot_progress_uses_raw_offset() {
        // min_y = -40, max_y = 600 - 200 + 10 = 410
        let top = MetricsSnapshot::new(-40.0, 600.0, 200.0, 40.0, 10.0);
        assert!(top.progress().abs() < 1e-12);
        let mid = MetricsSnapshot::new(185.0, 600.0, 200.0, 40.0, 10.0);
        assert!((mid.progress() - 0.5).abs() < 1e-12);
        assert!((mid.logical_offset_y() - 225.0).abs() < 1e-12);
    }

    #[test]
    fn test_clamp_progress() {
        assert_close(clamp_progress(-0.3), 0.0);
        assert_close(clamp_progress(1.7), 1.0);
        assert_close(clamp_progress(0.42), 0.42);
        assert_close(clamp_progress(f64::NAN), 0.0);
        assert_close(clamp_progress(f64::INFINITY), 1.0);
    }
}
