//! Feed orchestration: the active source, fetch cycles and scroll position.
//!
//! Fetches are split in two halves so the owner of the event loop decides how
//! to await the network: `begin_fetch` hands out a `FetchRequest` and
//! `complete_fetch` applies its result. `load_next_page` runs both halves
//! around a single await.

use crate::config::AppConfig;
use crate::embed::EmbedFactory;
use crate::expand::{ExpandController, LayoutPolicy};
use crate::loader::{ScrollLoader, ScrollMetrics};
use crate::source::{CursorSet, Page, PaginationCursor, Source, SourceClient};
use crate::store::{FeedLayout, FeedStore, ItemKey};
use crate::viewport::{IntersectionTracker, Viewport, VisibilityObserver};
use crate::virtualizer::{SwapReport, ViewportVirtualizer};
use crate::FetchError;

/// Tunables the controller reads from the application config
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedSettings {
    pub initial_source: Source,
    pub layout: LayoutPolicy,
    pub growth_step: u32,
    pub chrome_height: u32,
    pub prefetch_margin: u64,
    pub stop_at_end: bool,
}

impl FeedSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            initial_source: config.general.initial_source,
            layout: LayoutPolicy::from_config(&config.layout),
            growth_step: config.layout.growth_step,
            chrome_height: config.layout.chrome_height,
            prefetch_margin: u64::from(config.feed.prefetch_margin),
            stop_at_end: config.feed.stop_at_end,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    Idle,
    Loading,
    /// The active source ran out of pages (only with `stop_at_end`)
    Exhausted(Source),
}

/// Identifies one fetch cycle and the feed it was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    id: u64,
    source: Source,
    generation: u64,
}

impl FetchTicket {
    pub fn source(&self) -> Source {
        self.source
    }
}

/// A fetch the caller must perform and hand back to `complete_fetch`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: FetchTicket,
    pub source: Source,
    pub cursor: PaginationCursor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Page appended (possibly empty) and cursor advanced
    Appended { count: usize },
    /// Fetch failed; feed and cursor untouched
    Failed(FetchError),
    /// Result belonged to a feed that has since been replaced
    Stale,
}

pub struct FeedController<F: EmbedFactory> {
    settings: FeedSettings,
    store: FeedStore<F::Embed>,
    factory: F,
    virtualizer: ViewportVirtualizer,
    expander: ExpandController,
    loader: ScrollLoader,
    cursors: CursorSet,
    active_source: Source,
    in_flight: Option<FetchTicket>,
    reload_pending: bool,
    next_ticket: u64,
    viewport: Viewport,
    last_error: Option<FetchError>,
}

impl<F: EmbedFactory> FeedController<F> {
    pub fn new(settings: FeedSettings, factory: F, observer: Box<dyn VisibilityObserver>) -> Self {
        Self {
            settings,
            store: FeedStore::new(),
            factory,
            virtualizer: ViewportVirtualizer::new(observer),
            expander: ExpandController::new(settings.growth_step),
            loader: ScrollLoader::new(settings.prefetch_margin),
            cursors: CursorSet::default(),
            active_source: settings.initial_source,
            in_flight: None,
            reload_pending: false,
            next_ticket: 0,
            viewport: Viewport::default(),
            last_error: None,
        }
    }

    /// Controller observing visibility with an `IntersectionTracker` built
    /// from the `[viewport]` section
    pub fn from_config(config: &AppConfig, factory: F) -> Self {
        let tracker = IntersectionTracker::from_config(&config.viewport);
        Self::new(FeedSettings::from_config(config), factory, Box::new(tracker))
    }

    /// Start loading the initial source
    pub fn init(&mut self) -> Option<FetchRequest> {
        tracing::info!(source = %self.active_source, "Initializing feed");
        self.begin_fetch()
    }

    /// Switch feeds. Clears the store, restarts the new source from its first
    /// page and immediately requests it. Selecting the active source does nothing.
    pub fn set_source(&mut self, source: Source) -> Option<FetchRequest> {
        if source == self.active_source {
            tracing::debug!(%source, "Source already active");
            return None;
        }

        tracing::info!(from = %self.active_source, to = %source, "Switching source");
        self.active_source = source;
        self.virtualizer.reset();
        self.store.clear();
        self.cursors.reset(source);
        self.viewport.scroll_top = 0;
        self.last_error = None;

        self.begin_fetch()
    }

    /// Start a fetch cycle for the active source, unless one is in flight or
    /// the source is exhausted
    pub fn begin_fetch(&mut self) -> Option<FetchRequest> {
        if let Some(ticket) = self.in_flight {
            if ticket.generation != self.store.generation() {
                // The feed was replaced mid-flight; reload once the old result is back
                self.reload_pending = true;
            }
            tracing::debug!(in_flight = %ticket.source, "Fetch in flight, trigger dropped");
            return None;
        }

        let source = self.active_source;
        let cursor = self.cursors.get(source);
        if cursor.exhausted {
            tracing::debug!(%source, "Source exhausted, trigger dropped");
            return None;
        }

        let ticket = FetchTicket {
            id: self.next_ticket,
            source,
            generation: self.store.generation(),
        };
        self.next_ticket += 1;
        self.in_flight = Some(ticket);
        self.reload_pending = false;

        tracing::debug!(%source, ticket = ticket.id, continuation = ?cursor.token(), "Fetch started");
        Some(FetchRequest {
            ticket,
            source,
            cursor: cursor.clone(),
        })
    }

    /// Apply the result of the fetch identified by `ticket`
    pub fn complete_fetch(&mut self, ticket: FetchTicket, result: Result<Page, FetchError>) -> FetchOutcome {
        if self.in_flight != Some(ticket) {
            tracing::warn!(ticket = ticket.id, "Result for unknown fetch ignored");
            return FetchOutcome::Stale;
        }
        self.in_flight = None;

        if ticket.generation != self.store.generation() {
            tracing::debug!(source = %ticket.source, "Discarding result for replaced feed");
            return FetchOutcome::Stale;
        }

        match result {
            Ok(page) => self.append_page(ticket.source, page),
            Err(err) => {
                tracing::warn!(source = %ticket.source, error = %err, "Fetch failed");
                self.last_error = Some(err.clone());
                FetchOutcome::Failed(err)
            }
        }
    }

    fn append_page(&mut self, source: Source, page: Page) -> FetchOutcome {
        self.last_error = None;

        let cursor = self.cursors.get_mut(source);
        match page.next_cursor.token() {
            Some(token) if source.is_paginated() => {
                cursor.token = Some(token.to_string());
            }
            _ => {
                cursor.token = None;
                if self.settings.stop_at_end && source.is_paginated() {
                    cursor.exhausted = true;
                    tracing::info!(%source, "Reached end of source");
                }
            }
        }

        let geometry = self.settings.layout.geometry(&self.viewport);
        let factory = &mut self.factory;
        let keys = self
            .store
            .append(page.items, geometry, |page_id, height| factory.mount(page_id, height));
        for key in &keys {
            self.virtualizer.register(*key);
        }

        tracing::info!(%source, appended = keys.len(), total = self.store.len(), "Page appended");
        FetchOutcome::Appended { count: keys.len() }
    }

    /// Fetch the reload that a source switch queued while another fetch was
    /// in flight
    pub fn take_pending_request(&mut self) -> Option<FetchRequest> {
        if !self.reload_pending || self.in_flight.is_some() {
            return None;
        }
        self.begin_fetch()
    }

    /// Run one whole fetch cycle against `client`. Returns `None` when the
    /// cycle could not start.
    pub async fn load_next_page(&mut self, client: &dyn SourceClient) -> Option<FetchOutcome> {
        let request = self.begin_fetch()?;
        let result = client.fetch_page(request.source, &request.cursor).await;
        Some(self.complete_fetch(request.ticket, result))
    }

    /// Grow one item; returns its new container height
    pub fn expand(&mut self, key: ItemKey) -> Option<u32> {
        let expander = self.expander;
        self.store.get_mut(key).map(|item| expander.expand(item))
    }

    /// Record a scroll event; see `ScrollLoader::on_scroll`
    pub fn on_scroll(&mut self) -> bool {
        self.loader.on_scroll()
    }

    /// Run the frame's scheduled bottom check, starting a fetch when near the end
    pub fn on_frame(&mut self) -> Option<FetchRequest> {
        let metrics = ScrollMetrics {
            scroll_top: self.viewport.scroll_top,
            viewport_height: self.viewport.height,
            document_height: self.document_height(),
        };
        if self.loader.on_frame(metrics) {
            self.begin_fetch()
        } else {
            None
        }
    }

    /// Move the viewport, clamped to the document. Counts as a scroll event
    /// when the position changes.
    pub fn scroll_to(&mut self, top: u64) -> u64 {
        let top = top.min(self.max_scroll_top());
        if top != self.viewport.scroll_top {
            self.viewport.scroll_top = top;
            self.on_scroll();
        }
        top
    }

    pub fn scroll_by(&mut self, delta: i64) -> u64 {
        let top = self.viewport.scroll_top.saturating_add_signed(delta);
        self.scroll_to(top)
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport.width = width;
        self.viewport.height = height;
        self.viewport.scroll_top = self.viewport.scroll_top.min(self.max_scroll_top());
    }

    /// Mount and unmount items for the current viewport
    pub fn sync_visibility(&mut self) -> SwapReport {
        self.virtualizer.sync(
            &mut self.store,
            &mut self.factory,
            &self.viewport,
            self.settings.chrome_height,
        )
    }

    pub fn state(&self) -> FeedState {
        if self.in_flight.is_some() {
            FeedState::Loading
        } else if self.cursors.get(self.active_source).exhausted {
            FeedState::Exhausted(self.active_source)
        } else {
            FeedState::Idle
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn active_source(&self) -> Source {
        self.active_source
    }

    pub fn cursor(&self, source: Source) -> &PaginationCursor {
        self.cursors.get(source)
    }

    pub fn store(&self) -> &FeedStore<F::Embed> {
        &self.store
    }

    pub fn settings(&self) -> &FeedSettings {
        &self.settings
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    pub fn layout(&self) -> FeedLayout {
        self.store.layout(self.settings.chrome_height)
    }

    pub fn document_height(&self) -> u64 {
        self.layout().total_height
    }

    /// Item at the top edge of the viewport
    pub fn focused(&self) -> Option<ItemKey> {
        let top = self.viewport.scroll_top;
        self.layout()
            .overlapping(top, top.saturating_add(1))
            .next()
            .map(|b| b.key)
    }

    fn max_scroll_top(&self) -> u64 {
        self.document_height()
            .saturating_sub(u64::from(self.viewport.height))
    }
}
