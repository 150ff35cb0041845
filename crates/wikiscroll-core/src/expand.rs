//! Item height policy: the geometry an item is created with and its manual
//! growth afterwards.

use crate::config::LayoutConfig;
use crate::embed::Embed;
use crate::store::{FeedItem, ItemGeometry, LayoutMode};
use crate::viewport::Viewport;

/// Decides the responsive geometry of newly created items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutPolicy {
    full_base_height: u32,
    compact_breakpoint: u32,
    full_extra_margin: u32,
    compact_extra_margin: u32,
}

impl LayoutPolicy {
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            full_base_height: config.full_base_height,
            compact_breakpoint: config.compact_breakpoint,
            full_extra_margin: config.full_extra_margin,
            compact_extra_margin: config.compact_extra_margin,
        }
    }

    pub fn mode_for(&self, viewport_width: u32) -> LayoutMode {
        if viewport_width <= self.compact_breakpoint {
            LayoutMode::Compact
        } else {
            LayoutMode::Full
        }
    }

    /// Geometry for an item created under `viewport`. Compact items take the
    /// viewport height as their base; full items use the fixed base height.
    pub fn geometry(&self, viewport: &Viewport) -> ItemGeometry {
        match self.mode_for(viewport.width) {
            LayoutMode::Compact => ItemGeometry {
                mode: LayoutMode::Compact,
                base_height: viewport.height,
                extra_margin: self.compact_extra_margin,
            },
            LayoutMode::Full => ItemGeometry {
                mode: LayoutMode::Full,
                base_height: self.full_base_height,
                extra_margin: self.full_extra_margin,
            },
        }
    }
}

/// Grows items on request, never shrinking them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandController {
    growth_step: u32,
}

impl ExpandController {
    pub fn new(growth_step: u32) -> Self {
        Self { growth_step }
    }

    pub fn growth_step(&self) -> u32 {
        self.growth_step
    }

    /// Add one expansion to `item` and push the new height to its container
    /// and to whichever representation it currently shows. Returns the new
    /// container height.
    pub fn expand<E: Embed>(&self, item: &mut FeedItem<E>) -> u32 {
        let expand_count = item.expand_count().saturating_add(1);
        let height = item
            .geometry()
            .base_height
            .saturating_add(expand_count.saturating_mul(self.growth_step));

        item.set_expansion(expand_count, height);
        let frame_height = item.frame_height();
        item.content_mut().set_height(frame_height);

        tracing::debug!(
            page_id = %item.page_id(),
            expand_count,
            height,
            "Expanded item"
        );
        height
    }
}

/// Label of the expand affordance after `expand_count` expansions
pub fn expand_label(expand_count: u32) -> String {
    if expand_count > 1 {
        format!("Expand ({}×)", expand_count)
    } else {
        "Expand".to_string()
    }
}
