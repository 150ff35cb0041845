pub mod config;
pub mod controller;
pub mod embed;
pub mod error;
pub mod expand;
pub mod loader;
pub mod source;
pub mod store;
pub mod viewport;
pub mod virtualizer;

#[cfg(test)]
pub(crate) mod testing;

pub use config::AppConfig;
pub use controller::{FeedController, FeedSettings, FeedState, FetchOutcome, FetchRequest, FetchTicket};
pub use embed::{Embed, EmbedFactory, HeadlessFactory, ItemContent, Placeholder};
pub use error::{Error, FetchError, Result};
pub use source::{ArticleRef, Page, PageId, PaginationCursor, Source, SourceClient, WikipediaClient};
pub use store::{FeedItem, FeedStore, ItemKey};
