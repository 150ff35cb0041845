//! Viewport geometry and visibility observation.
//!
//! `VisibilityObserver` is the capability the virtualizer depends on. The
//! bundled `IntersectionTracker` computes visibility from feed geometry the way
//! a browser intersection observer would; tests substitute a scripted double.

use std::collections::HashMap;

use crate::config::ViewportConfig;
use crate::store::{FeedLayout, ItemBox, ItemKey};

/// Physical viewport in layout units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub scroll_top: u64,
}

impl Viewport {
    pub fn bottom(&self) -> u64 {
        self.scroll_top + u64::from(self.height)
    }
}

/// Growth (positive) or shrinkage (negative) applied to the viewport edges
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewportMargin {
    pub top: i32,
    pub bottom: i32,
}

impl ViewportMargin {
    pub fn uniform(margin: i32) -> Self {
        Self {
            top: margin,
            bottom: margin,
        }
    }

    /// Tracked region `[start, end)`; may be empty when margins are very negative
    pub fn region(&self, viewport: &Viewport) -> (i64, i64) {
        let start = viewport.scroll_top as i64 - i64::from(self.top);
        let end = viewport.bottom() as i64 + i64::from(self.bottom);
        (start, end.max(start))
    }
}

/// A change in an observed item's visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityEntry {
    pub key: ItemKey,
    pub is_intersecting: bool,
}

impl VisibilityEntry {
    pub fn visible(key: ItemKey) -> Self {
        Self {
            key,
            is_intersecting: true,
        }
    }

    pub fn hidden(key: ItemKey) -> Self {
        Self {
            key,
            is_intersecting: false,
        }
    }
}

pub trait VisibilityObserver {
    fn observe(&mut self, key: ItemKey);

    fn unobserve(&mut self, key: ItemKey);

    /// Stop observing everything
    fn disconnect(&mut self);

    /// Drain the pending visibility changes for the current geometry
    fn take_records(&mut self, viewport: &Viewport, layout: &FeedLayout) -> Vec<VisibilityEntry>;
}

/// Geometry-driven visibility observer.
///
/// An item intersects while any part of it overlaps the tracked region. The
/// threshold only adds report points: crossing it emits an entry even when
/// the intersecting state is unchanged. Each newly observed item is reported
/// on the next `take_records`.
#[derive(Debug, Clone)]
pub struct IntersectionTracker {
    margin: ViewportMargin,
    threshold: f64,
    /// Last reported state; `None` until the first report
    observed: HashMap<ItemKey, Option<Intersection>>,
}

/// Overlap of one item with the tracked region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Intersection {
    is_intersecting: bool,
    past_threshold: bool,
}

impl IntersectionTracker {
    pub fn new(margin: ViewportMargin, threshold: f64) -> Self {
        Self {
            margin,
            threshold: threshold.clamp(0.0, 1.0),
            observed: HashMap::new(),
        }
    }

    pub fn from_config(config: &ViewportConfig) -> Self {
        Self::new(
            ViewportMargin {
                top: config.margin_top,
                bottom: config.margin_bottom,
            },
            config.threshold,
        )
    }

    pub fn observed_count(&self) -> usize {
        self.observed.len()
    }

    fn intersection(&self, item: &ItemBox, region: (i64, i64)) -> Intersection {
        let (start, end) = region;
        let top = item.top as i64;
        let bottom = item.bottom() as i64;

        // Zero-height boxes count as fully inside when their top is
        if item.height == 0 {
            let inside = top >= start && top < end;
            return Intersection {
                is_intersecting: inside,
                past_threshold: inside,
            };
        }

        let overlap = (bottom.min(end) - top.max(start)).max(0);
        let ratio = overlap as f64 / f64::from(item.height);
        Intersection {
            is_intersecting: overlap > 0,
            past_threshold: overlap > 0 && ratio >= self.threshold,
        }
    }
}

impl VisibilityObserver for IntersectionTracker {
    fn observe(&mut self, key: ItemKey) {
        self.observed.entry(key).or_insert(None);
    }

    fn unobserve(&mut self, key: ItemKey) {
        self.observed.remove(&key);
    }

    fn disconnect(&mut self) {
        self.observed.clear();
    }

    fn take_records(&mut self, viewport: &Viewport, layout: &FeedLayout) -> Vec<VisibilityEntry> {
        let region = self.margin.region(viewport);
        let mut records = Vec::new();

        for item in &layout.boxes {
            let Some(last) = self.observed.get(&item.key).copied() else {
                continue;
            };
            let now = self.intersection(item, region);
            if last != Some(now) {
                self.observed.insert(item.key, Some(now));
                records.push(VisibilityEntry {
                    key: item.key,
                    is_intersecting: now.is_intersecting,
                });
            }
        }

        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FeedStore;
    use crate::testing::{article, full_geometry, FakeEmbed};

    // Five 884-unit boxes (804 frame + 80 chrome)
    fn layout() -> (FeedLayout, Vec<ItemKey>) {
        let mut store: FeedStore<FakeEmbed> = FeedStore::new();
        let keys = store.append((1..=5).map(article).collect(), full_geometry(), FakeEmbed::new);
        (store.layout(80), keys)
    }

    fn viewport(scroll_top: u64) -> Viewport {
        Viewport {
            width: 1280,
            height: 900,
            scroll_top,
        }
    }

    fn tracker_observing(margin: ViewportMargin, threshold: f64, keys: &[ItemKey]) -> IntersectionTracker {
        let mut tracker = IntersectionTracker::new(margin, threshold);
        for key in keys {
            tracker.observe(*key);
        }
        tracker
    }

    #[test]
    fn test_initial_report_covers_every_observed_item() {
        let (layout, keys) = layout();
        let mut tracker = tracker_observing(ViewportMargin::default(), 0.1, &keys);

        let records = tracker.take_records(&viewport(0), &layout);
        assert_eq!(records.len(), 5);
        assert!(records[0].is_intersecting);
        assert!(records[1].is_intersecting); // only 16 of 884 units inside
        assert!(!records[2].is_intersecting);
    }

    #[test]
    fn test_only_changes_are_reported() {
        let (layout, keys) = layout();
        let mut tracker = tracker_observing(ViewportMargin::default(), 0.1, &keys);
        tracker.take_records(&viewport(0), &layout);

        assert!(tracker.take_records(&viewport(0), &layout).is_empty());

        // Region [1800, 2700): boxes 0 and 1 leave, box 2 is mostly inside
        // and box 3 shows its first 48 units
        let records = tracker.take_records(&viewport(1800), &layout);
        let changed: Vec<_> = records.iter().map(|r| (r.key.index(), r.is_intersecting)).collect();
        assert_eq!(changed, vec![(0, false), (1, false), (2, true), (3, true)]);
    }

    #[test]
    fn test_any_overlap_intersects_regardless_of_threshold() {
        let (layout, keys) = layout();
        // Viewport [0, 900) shows 16 units of box 1 [884, 1768)
        let mut strict = tracker_observing(ViewportMargin::default(), 0.5, &keys[1..2]);
        let mut loose = tracker_observing(ViewportMargin::default(), 0.0, &keys[1..2]);

        assert!(strict.take_records(&viewport(0), &layout)[0].is_intersecting);
        assert!(loose.take_records(&viewport(0), &layout)[0].is_intersecting);
    }

    #[test]
    fn test_threshold_crossing_reports_without_state_change() {
        let (layout, keys) = layout();
        let mut tracker = tracker_observing(ViewportMargin::default(), 0.1, &keys[1..2]);
        tracker.take_records(&viewport(0), &layout);

        // 316 of 884 units inside now: still intersecting, past the threshold
        let records = tracker.take_records(&viewport(300), &layout);
        assert_eq!(records, vec![VisibilityEntry::visible(keys[1])]);
        assert!(tracker.take_records(&viewport(310), &layout).is_empty());
    }

    #[test]
    fn test_item_scrolled_mostly_off_top_still_intersects() {
        let (layout, keys) = layout();
        let mut tracker = tracker_observing(ViewportMargin::default(), 0.1, &keys[0..1]);
        tracker.take_records(&viewport(0), &layout);

        // Only the last 4 units of box 0 [0, 884) remain inside
        let records = tracker.take_records(&viewport(880), &layout);
        assert_eq!(records, vec![VisibilityEntry::visible(keys[0])]);
        let records = tracker.take_records(&viewport(884), &layout);
        assert_eq!(records, vec![VisibilityEntry::hidden(keys[0])]);
    }

    #[test]
    fn test_positive_margin_preloads() {
        let (layout, keys) = layout();
        let mut tracker = tracker_observing(ViewportMargin { top: 0, bottom: 1000 }, 0.1, &keys[2..3]);

        // Box 2 starts at 1768; the region extends to 1900
        let records = tracker.take_records(&viewport(0), &layout);
        assert!(records[0].is_intersecting);
    }

    #[test]
    fn test_negative_margin_shrinks_region() {
        let (layout, keys) = layout();
        let mut tracker = tracker_observing(ViewportMargin::uniform(-450), 0.1, &keys[0..1]);

        // Region [750, 750) is empty
        let records = tracker.take_records(&viewport(300), &layout);
        assert!(!records[0].is_intersecting);
    }

    #[test]
    fn test_unobserved_and_disconnected_items_are_silent() {
        let (layout, keys) = layout();
        let mut tracker = tracker_observing(ViewportMargin::default(), 0.1, &keys);
        tracker.unobserve(keys[0]);

        let records = tracker.take_records(&viewport(0), &layout);
        assert!(records.iter().all(|r| r.key != keys[0]));

        tracker.disconnect();
        assert_eq!(tracker.observed_count(), 0);
        assert!(tracker.take_records(&viewport(5000), &layout).is_empty());
    }
}
