//! Upstream article sources and their pagination state.

mod client;
mod endpoint;
mod response;

pub use client::{SourceClient, WikipediaClient};
pub use endpoint::Endpoints;
pub use response::{parse_extract, parse_page};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// One of the enumerated upstream feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Independent unordered sample on every request
    Random,
    /// Members of the featured-articles category, newest first
    #[default]
    Featured,
    /// All non-redirect articles in title order
    Alphabetical,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Random, Source::Featured, Source::Alphabetical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Random => "random",
            Source::Featured => "featured",
            Source::Alphabetical => "alphabetical",
        }
    }

    /// Human-readable name for headers and status lines
    pub fn label(&self) -> &'static str {
        match self {
            Source::Random => "Random",
            Source::Featured => "Featured",
            Source::Alphabetical => "Alphabetical",
        }
    }

    /// Query parameter carrying the continuation token, if the source paginates
    pub fn continuation_param(&self) -> Option<&'static str> {
        match self {
            Source::Random => None,
            Source::Featured => Some("cmcontinue"),
            Source::Alphabetical => Some("apcontinue"),
        }
    }

    /// Field under `query` that holds the item list
    pub fn item_field(&self) -> &'static str {
        match self {
            Source::Random => "random",
            Source::Featured => "categorymembers",
            Source::Alphabetical => "allpages",
        }
    }

    pub fn is_paginated(&self) -> bool {
        self.continuation_param().is_some()
    }

    /// Next source in header order, wrapping around
    pub fn next(&self) -> Source {
        match self {
            Source::Random => Source::Featured,
            Source::Featured => Source::Alphabetical,
            Source::Alphabetical => Source::Random,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(Source::Random),
            "featured" => Ok(Source::Featured),
            "alphabetical" => Ok(Source::Alphabetical),
            other => Err(Error::UnknownSource(other.to_string())),
        }
    }
}

/// Continuation state for one source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationCursor {
    /// Opaque continuation value; `None` before the first page and after the last
    pub token: Option<String>,
    /// Set only when the feed is configured to stop at the end of a source
    pub exhausted: bool,
}

impl PaginationCursor {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            exhausted: false,
        }
    }

    /// Non-empty continuation token, if any
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn reset(&mut self) {
        self.token = None;
        self.exhausted = false;
    }
}

/// Cursors for every source, owned by the feed controller
#[derive(Debug, Clone, Default)]
pub struct CursorSet {
    random: PaginationCursor,
    featured: PaginationCursor,
    alphabetical: PaginationCursor,
}

impl CursorSet {
    pub fn get(&self, source: Source) -> &PaginationCursor {
        match source {
            Source::Random => &self.random,
            Source::Featured => &self.featured,
            Source::Alphabetical => &self.alphabetical,
        }
    }

    pub fn get_mut(&mut self, source: Source) -> &mut PaginationCursor {
        match source {
            Source::Random => &mut self.random,
            Source::Featured => &mut self.featured,
            Source::Alphabetical => &mut self.alphabetical,
        }
    }

    pub fn reset(&mut self, source: Source) {
        self.get_mut(source).reset();
    }
}

/// MediaWiki page identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageId(pub u64);

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalized item record from any source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRef {
    pub page_id: PageId,
    pub title: String,
}

/// One fetched page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub items: Vec<ArticleRef>,
    pub next_cursor: PaginationCursor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_round_trips_through_str() {
        for source in Source::ALL {
            assert_eq!(source.as_str().parse::<Source>().unwrap(), source);
        }
        assert_eq!(" Featured ".parse::<Source>().unwrap(), Source::Featured);
        assert!(matches!("popular".parse::<Source>(), Err(Error::UnknownSource(_))));
    }

    #[test]
    fn test_only_listing_sources_paginate() {
        assert!(!Source::Random.is_paginated());
        assert_eq!(Source::Featured.continuation_param(), Some("cmcontinue"));
        assert_eq!(Source::Alphabetical.continuation_param(), Some("apcontinue"));
    }

    #[test]
    fn test_next_cycles_all_sources() {
        let mut source = Source::Random;
        for _ in 0..Source::ALL.len() {
            source = source.next();
        }
        assert_eq!(source, Source::Random);
    }

    #[test]
    fn test_empty_token_counts_as_absent() {
        let cursor = PaginationCursor::with_token("");
        assert_eq!(cursor.token(), None);
    }

    #[test]
    fn test_cursor_set_resets_one_source() {
        let mut cursors = CursorSet::default();
        *cursors.get_mut(Source::Featured) = PaginationCursor::with_token("A");
        *cursors.get_mut(Source::Alphabetical) = PaginationCursor::with_token("B");

        cursors.reset(Source::Featured);

        assert_eq!(cursors.get(Source::Featured).token(), None);
        assert_eq!(cursors.get(Source::Alphabetical).token(), Some("B"));
    }
}
