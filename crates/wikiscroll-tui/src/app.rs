use std::sync::Arc;

use wikiscroll_core::source::Endpoints;
use wikiscroll_core::{AppConfig, FeedController, FeedState, FetchRequest, Source};

use crate::embed::PreviewFactory;
use crate::theme::Theme;

/// Layout units per terminal column, used for the compact breakpoint
pub const UNITS_PER_COLUMN: u32 = 10;

/// Rows taken by the header and the status bar
const CHROME_ROWS: u16 = 2;

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Application state
pub struct App {
    /// Application configuration
    pub config: Arc<AppConfig>,
    pub theme: Theme,
    /// Feed engine driving pagination and preview mounting
    pub feed: FeedController<PreviewFactory>,
    /// URL builder for opening articles in the browser
    pub endpoints: Endpoints,
    /// Whether the app should quit
    pub should_quit: bool,
    /// Status message
    pub status_message: Option<String>,
    /// Pending key for multi-key sequences (e.g., 'gg')
    pub pending_key: Option<char>,
    /// Rows available to the feed view
    pub feed_rows: u16,
    spinner_frame: usize,
}

impl App {
    pub fn new(config: Arc<AppConfig>, feed: FeedController<PreviewFactory>, endpoints: Endpoints) -> Self {
        Self {
            config,
            theme: Theme::default(),
            feed,
            endpoints,
            should_quit: false,
            status_message: None,
            pending_key: None,
            feed_rows: 0,
            spinner_frame: 0,
        }
    }

    pub fn units_per_row(&self) -> u32 {
        self.config.ui.units_per_row.max(1)
    }

    /// Terminal row holding layout position `units`
    pub fn units_to_rows(&self, units: u64) -> u64 {
        units / u64::from(self.units_per_row())
    }

    /// Apply a new terminal size to the feed viewport
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.feed_rows = rows.saturating_sub(CHROME_ROWS);
        let width = u32::from(cols) * UNITS_PER_COLUMN;
        let height = u32::from(self.feed_rows) * self.units_per_row();
        self.feed.set_viewport(width, height);
    }

    /// Scroll by whole rows; negative values scroll up
    pub fn scroll_rows(&mut self, rows: i64) {
        let delta = rows.saturating_mul(i64::from(self.units_per_row()));
        self.feed.scroll_by(delta);
    }

    pub fn scroll_down(&mut self) {
        self.scroll_rows(i64::from(self.config.ui.scroll_lines));
    }

    pub fn scroll_up(&mut self) {
        self.scroll_rows(-i64::from(self.config.ui.scroll_lines));
    }

    pub fn scroll_half_page_down(&mut self) {
        self.scroll_rows(i64::from(self.feed_rows / 2).max(1));
    }

    pub fn scroll_half_page_up(&mut self) {
        self.scroll_rows(-i64::from(self.feed_rows / 2).max(1));
    }

    pub fn scroll_page_down(&mut self) {
        self.scroll_rows(i64::from(self.feed_rows).max(1));
    }

    pub fn scroll_page_up(&mut self) {
        self.scroll_rows(-i64::from(self.feed_rows).max(1));
    }

    pub fn jump_to_top(&mut self) {
        self.feed.scroll_to(0);
    }

    pub fn jump_to_bottom(&mut self) {
        self.feed.scroll_to(u64::MAX);
    }

    /// Switch feeds; returns the fetch to spawn, if any
    pub fn select_source(&mut self, source: Source) -> Option<FetchRequest> {
        if source != self.feed.active_source() {
            self.set_status(format!("Loading {} articles", source.label()));
        }
        self.feed.set_source(source)
    }

    pub fn next_source(&mut self) -> Option<FetchRequest> {
        self.select_source(self.feed.active_source().next())
    }

    /// Expand the item at the top of the viewport
    pub fn expand_focused(&mut self) -> Option<u32> {
        let key = self.feed.focused()?;
        self.feed.expand(key)
    }

    /// Browser URL of the item at the top of the viewport
    pub fn focused_url(&self) -> Option<String> {
        let key = self.feed.focused()?;
        let item = self.feed.store().get(key)?;
        Some(self.endpoints.embed_url(item.page_id()))
    }

    /// Whether the loop should poll at frame rate
    pub fn needs_fast_update(&self) -> bool {
        self.feed.is_loading()
    }

    pub fn tick_spinner(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_frame]
    }

    /// Short description of the feed state for the status bar
    pub fn state_label(&self) -> String {
        match self.feed.state() {
            FeedState::Idle => "Idle".to_string(),
            FeedState::Loading => format!("{} Loading", self.spinner()),
            FeedState::Exhausted(source) => format!("End of {}", source.label()),
        }
    }

    /// Set a status message
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Clear the status message
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Clear the pending key
    pub fn clear_pending_key(&mut self) {
        self.pending_key = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::ExtractLoader;
    use tokio::runtime::Handle;
    use wikiscroll_core::{ArticleRef, FetchError, Page, PageId, PaginationCursor};

    struct NoopLoader;

    #[async_trait::async_trait]
    impl ExtractLoader for NoopLoader {
        async fn load_extract(&self, _page_id: PageId) -> Result<String, FetchError> {
            Ok(String::new())
        }
    }

    fn app() -> App {
        let config = Arc::new(AppConfig::default());
        let factory = PreviewFactory::new(Arc::new(NoopLoader), Handle::current());
        let feed = FeedController::from_config(&config, factory);
        let endpoints = Endpoints::new(&config.source).unwrap();
        let mut app = App::new(config, feed, endpoints);
        app.resize(120, 42);
        app
    }

    fn load(app: &mut App, ids: std::ops::RangeInclusive<u64>) {
        let request = app.feed.begin_fetch().unwrap();
        let page = Page {
            items: ids
                .map(|n| ArticleRef {
                    page_id: PageId(n),
                    title: format!("Article {}", n),
                })
                .collect(),
            next_cursor: PaginationCursor::default(),
        };
        app.feed.complete_fetch(request.ticket, Ok(page));
    }

    #[tokio::test]
    async fn test_resize_maps_rows_to_units() {
        let app = app();
        assert_eq!(app.feed_rows, 40);
        assert_eq!(app.feed.viewport().height, 1600);
        assert_eq!(app.feed.viewport().width, 1200);
        assert_eq!(app.units_to_rows(884), 22);
    }

    #[tokio::test]
    async fn test_scroll_keys_move_by_rows() {
        let mut app = app();
        load(&mut app, 1..=10);

        app.scroll_down();
        assert_eq!(app.feed.viewport().scroll_top, 3 * 40);
        app.scroll_page_down();
        assert_eq!(app.feed.viewport().scroll_top, 43 * 40);
        app.scroll_half_page_up();
        assert_eq!(app.feed.viewport().scroll_top, 23 * 40);
        app.jump_to_top();
        assert_eq!(app.feed.viewport().scroll_top, 0);
    }

    #[tokio::test]
    async fn test_focused_item_actions() {
        let mut app = app();
        load(&mut app, 5..=6);

        assert_eq!(
            app.focused_url().as_deref(),
            Some("https://en.wikipedia.org/?curid=5")
        );
        assert_eq!(app.expand_focused(), Some(900));
    }

    #[tokio::test]
    async fn test_next_source_cycles_and_requests() {
        let mut app = app();
        load(&mut app, 1..=2);

        let request = app.next_source().unwrap();
        assert_eq!(request.source, Source::Alphabetical);
        assert!(app.feed.store().is_empty());
        assert!(app.status_message.is_some());
    }
}
