//! Append-only feed of items for the active source.

use crate::embed::{Embed, ItemContent};
use crate::source::{ArticleRef, PageId};

/// Stable handle to a feed item.
///
/// Keys carry the store generation, so a key issued before a `clear()` never
/// resolves to an item appended afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey {
    generation: u64,
    index: usize,
}

impl ItemKey {
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Responsive layout decided once when an item is created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    Compact,
    Full,
}

/// Height inputs captured at item creation and reused for every later
/// recomputation of that item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemGeometry {
    pub mode: LayoutMode,
    pub base_height: u32,
    pub extra_margin: u32,
}

#[derive(Debug)]
pub struct FeedItem<E> {
    key: ItemKey,
    article: ArticleRef,
    geometry: ItemGeometry,
    current_height: u32,
    expand_count: u32,
    content: ItemContent<E>,
}

impl<E: Embed> FeedItem<E> {
    pub fn key(&self) -> ItemKey {
        self.key
    }

    pub fn page_id(&self) -> PageId {
        self.article.page_id
    }

    pub fn title(&self) -> &str {
        &self.article.title
    }

    pub fn geometry(&self) -> ItemGeometry {
        self.geometry
    }

    /// Container height: base height plus all expansions
    pub fn current_height(&self) -> u32 {
        self.current_height
    }

    pub fn expand_count(&self) -> u32 {
        self.expand_count
    }

    /// Height allocated to the embed or its placeholder
    pub fn frame_height(&self) -> u32 {
        self.current_height + self.geometry.extra_margin
    }

    pub fn is_mounted(&self) -> bool {
        self.content.is_mounted()
    }

    pub fn content(&self) -> &ItemContent<E> {
        &self.content
    }

    pub(crate) fn content_mut(&mut self) -> &mut ItemContent<E> {
        &mut self.content
    }

    /// Swap representation, returning the previous one
    pub(crate) fn replace_content(&mut self, content: ItemContent<E>) -> ItemContent<E> {
        std::mem::replace(&mut self.content, content)
    }

    pub(crate) fn set_expansion(&mut self, expand_count: u32, current_height: u32) {
        self.expand_count = expand_count;
        self.current_height = current_height;
    }
}

/// Position of one item in the stacked feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemBox {
    pub key: ItemKey,
    pub top: u64,
    pub height: u32,
}

impl ItemBox {
    pub fn bottom(&self) -> u64 {
        self.top + u64::from(self.height)
    }
}

/// Stacked geometry of the whole feed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedLayout {
    pub boxes: Vec<ItemBox>,
    pub total_height: u64,
}

impl FeedLayout {
    /// Boxes overlapping the half-open range `[from, to)`
    pub fn overlapping(&self, from: u64, to: u64) -> impl Iterator<Item = &ItemBox> {
        self.boxes
            .iter()
            .filter(move |b| b.bottom() > from && b.top < to)
    }
}

/// Ordered items for the current source. Insertion order is render order.
#[derive(Debug)]
pub struct FeedStore<E> {
    items: Vec<FeedItem<E>>,
    generation: u64,
}

impl<E> Default for FeedStore<E> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            generation: 0,
        }
    }
}

impl<E: Embed> FeedStore<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fetched page. Every new item starts mounted, built by `mount`
    /// from its page id and initial frame height. No dedup is performed.
    pub fn append<F>(&mut self, articles: Vec<ArticleRef>, geometry: ItemGeometry, mut mount: F) -> Vec<ItemKey>
    where
        F: FnMut(PageId, u32) -> E,
    {
        let mut keys = Vec::with_capacity(articles.len());
        for article in articles {
            let key = ItemKey {
                generation: self.generation,
                index: self.items.len(),
            };
            let frame_height = geometry.base_height + geometry.extra_margin;
            let embed = mount(article.page_id, frame_height);
            self.items.push(FeedItem {
                key,
                article,
                geometry,
                current_height: geometry.base_height,
                expand_count: 0,
                content: ItemContent::Embed(embed),
            });
            keys.push(key);
        }
        keys
    }

    /// Drop every item (releasing mounted embeds) and invalidate all keys
    pub fn clear(&mut self) {
        self.items.clear();
        self.generation += 1;
    }

    pub fn all(&self) -> &[FeedItem<E>] {
        &self.items
    }

    pub fn get(&self, key: ItemKey) -> Option<&FeedItem<E>> {
        if key.generation != self.generation {
            return None;
        }
        self.items.get(key.index)
    }

    pub fn get_mut(&mut self, key: ItemKey) -> Option<&mut FeedItem<E>> {
        if key.generation != self.generation {
            return None;
        }
        self.items.get_mut(key.index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn mounted_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_mounted()).count()
    }

    /// Stack items top to bottom; each box is the frame plus `chrome_height`
    pub fn layout(&self, chrome_height: u32) -> FeedLayout {
        let mut top = 0u64;
        let boxes = self
            .items
            .iter()
            .map(|item| {
                let height = item.frame_height() + chrome_height;
                let b = ItemBox {
                    key: item.key,
                    top,
                    height,
                };
                top += u64::from(height);
                b
            })
            .collect();

        FeedLayout {
            boxes,
            total_height: top,
        }
    }
}
