//! Test doubles shared by the engine's unit tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Mutex;

use crate::embed::{Embed, EmbedFactory};
use crate::source::{ArticleRef, Page, PageId, PaginationCursor, Source, SourceClient};
use crate::store::{FeedLayout, ItemGeometry, ItemKey, LayoutMode};
use crate::viewport::{Viewport, VisibilityEntry, VisibilityObserver};
use crate::FetchError;

pub fn article(n: u64) -> ArticleRef {
    ArticleRef {
        page_id: PageId(n),
        title: format!("Article {}", n),
    }
}

pub fn full_geometry() -> ItemGeometry {
    ItemGeometry {
        mode: LayoutMode::Full,
        base_height: 600,
        extra_margin: 204,
    }
}

/// Page of articles `ids` with an optional continuation token
pub fn page(ids: impl IntoIterator<Item = u64>, next: Option<&str>) -> Page {
    Page {
        items: ids.into_iter().map(article).collect(),
        next_cursor: PaginationCursor {
            token: next.map(str::to_string),
            exhausted: false,
        },
    }
}

#[derive(Debug)]
pub struct FakeEmbed {
    page_id: PageId,
    height: u32,
    released: Rc<Cell<usize>>,
}

impl FakeEmbed {
    pub fn new(page_id: PageId, height: u32) -> Self {
        Self {
            page_id,
            height,
            released: Rc::default(),
        }
    }
}

impl Embed for FakeEmbed {
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

impl Drop for FakeEmbed {
    fn drop(&mut self) {
        self.released.set(self.released.get() + 1);
    }
}

/// Records every mount and counts releases of the embeds it built
#[derive(Debug, Default)]
pub struct FakeFactory {
    mounts: Vec<(PageId, u32)>,
    released: Rc<Cell<usize>>,
}

impl FakeFactory {
    pub fn mounts(&self) -> &[(PageId, u32)] {
        &self.mounts
    }

    pub fn released(&self) -> usize {
        self.released.get()
    }
}

impl EmbedFactory for FakeFactory {
    type Embed = FakeEmbed;

    fn mount(&mut self, page_id: PageId, height: u32) -> FakeEmbed {
        self.mounts.push((page_id, height));
        FakeEmbed {
            page_id,
            height,
            released: Rc::clone(&self.released),
        }
    }
}

#[derive(Debug, Default)]
struct Script {
    queued: VecDeque<VisibilityEntry>,
    observed: Vec<ItemKey>,
}

/// Observer that replays entries pushed through its handle
#[derive(Debug, Default)]
pub struct ScriptedObserver {
    script: Rc<RefCell<Script>>,
}

#[derive(Debug, Clone)]
pub struct ScriptHandle {
    script: Rc<RefCell<Script>>,
}

impl ScriptedObserver {
    pub fn handle(&self) -> ScriptHandle {
        ScriptHandle {
            script: Rc::clone(&self.script),
        }
    }
}

impl ScriptHandle {
    pub fn push(&self, entry: VisibilityEntry) {
        self.script.borrow_mut().queued.push_back(entry);
    }

    pub fn observed(&self) -> Vec<ItemKey> {
        self.script.borrow().observed.clone()
    }
}

impl VisibilityObserver for ScriptedObserver {
    fn observe(&mut self, key: ItemKey) {
        self.script.borrow_mut().observed.push(key);
    }

    fn unobserve(&mut self, key: ItemKey) {
        self.script.borrow_mut().observed.retain(|k| *k != key);
    }

    fn disconnect(&mut self) {
        let mut script = self.script.borrow_mut();
        script.observed.clear();
        script.queued.clear();
    }

    fn take_records(&mut self, _viewport: &Viewport, _layout: &FeedLayout) -> Vec<VisibilityEntry> {
        self.script.borrow_mut().queued.drain(..).collect()
    }
}

/// Source client answering from a queue of scripted results
#[derive(Debug, Default)]
pub struct FakeSourceClient {
    responses: Mutex<VecDeque<Result<Page, FetchError>>>,
    calls: Mutex<Vec<(Source, PaginationCursor)>>,
}

impl FakeSourceClient {
    pub fn respond(&self, response: Result<Page, FetchError>) -> &Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<(Source, PaginationCursor)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SourceClient for FakeSourceClient {
    async fn fetch_page(&self, source: Source, cursor: &PaginationCursor) -> Result<Page, FetchError> {
        self.calls.lock().unwrap().push((source, cursor.clone()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Network("no scripted response".to_string())))
    }
}
