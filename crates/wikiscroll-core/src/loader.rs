//! Near-bottom detection, coalesced to at most one check per frame.

/// Scroll geometry sampled when a frame is serviced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollMetrics {
    pub scroll_top: u64,
    pub viewport_height: u32,
    pub document_height: u64,
}

impl ScrollMetrics {
    pub fn distance_to_bottom(&self) -> u64 {
        self.document_height
            .saturating_sub(self.scroll_top + u64::from(self.viewport_height))
    }
}

#[derive(Debug, Clone)]
pub struct ScrollLoader {
    prefetch_margin: u64,
    frame_pending: bool,
}

impl ScrollLoader {
    pub fn new(prefetch_margin: u64) -> Self {
        Self {
            prefetch_margin,
            frame_pending: false,
        }
    }

    /// Record a scroll event. Returns true when this event scheduled a frame
    /// check, false when one was already pending.
    pub fn on_scroll(&mut self) -> bool {
        if self.frame_pending {
            return false;
        }
        self.frame_pending = true;
        true
    }

    /// Service the pending frame check. Returns true when the document bottom
    /// is within the prefetch margin; no check runs without a pending frame.
    pub fn on_frame(&mut self, metrics: ScrollMetrics) -> bool {
        if !self.frame_pending {
            return false;
        }
        self.frame_pending = false;

        let distance = metrics.distance_to_bottom();
        let near_bottom = distance <= self.prefetch_margin;
        if near_bottom {
            tracing::trace!(distance, "Near bottom of feed");
        }
        near_bottom
    }
}
