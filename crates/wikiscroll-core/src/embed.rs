//! Live and placeholder representations of a feed item.

use std::fmt;

use crate::source::PageId;

/// A materialized, resource-heavy view of one article.
///
/// Dropping an embed releases it; implementations abandon any in-progress load
/// in `Drop` rather than pausing it.
pub trait Embed: fmt::Debug {
    fn page_id(&self) -> PageId;

    fn height(&self) -> u32;

    fn set_height(&mut self, height: u32);
}

/// Builds embeds for the virtualizer
pub trait EmbedFactory {
    type Embed: Embed;

    fn mount(&mut self, page_id: PageId, height: u32) -> Self::Embed;
}

/// Lightweight stand-in that keeps an unmounted item's height and identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder {
    pub page_id: PageId,
    pub height: u32,
}

/// A placeholder doubles as the embed of headless feeds, which never draw
impl Embed for Placeholder {
    fn page_id(&self) -> PageId {
        self.page_id
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_height(&mut self, height: u32) {
        self.height = height;
    }
}

/// Factory for feeds without a display, e.g. command-line paging
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessFactory;

impl EmbedFactory for HeadlessFactory {
    type Embed = Placeholder;

    fn mount(&mut self, page_id: PageId, height: u32) -> Placeholder {
        Placeholder { page_id, height }
    }
}

#[derive(Debug)]
pub enum ItemContent<E> {
    Embed(E),
    Placeholder(Placeholder),
}

impl<E: Embed> ItemContent<E> {
    pub fn is_mounted(&self) -> bool {
        matches!(self, ItemContent::Embed(_))
    }

    pub fn page_id(&self) -> PageId {
        match self {
            ItemContent::Embed(embed) => embed.page_id(),
            ItemContent::Placeholder(placeholder) => placeholder.page_id,
        }
    }

    /// Height currently allocated to whichever representation is present
    pub fn height(&self) -> u32 {
        match self {
            ItemContent::Embed(embed) => embed.height(),
            ItemContent::Placeholder(placeholder) => placeholder.height,
        }
    }

    pub fn set_height(&mut self, height: u32) {
        match self {
            ItemContent::Embed(embed) => embed.set_height(height),
            ItemContent::Placeholder(placeholder) => placeholder.height = height,
        }
    }

    pub fn embed(&self) -> Option<&E> {
        match self {
            ItemContent::Embed(embed) => Some(embed),
            ItemContent::Placeholder(_) => None,
        }
    }
}
