use url::Url;

use super::{PageId, PaginationCursor, Source};
use crate::config::SourceConfig;
use crate::{Error, Result};

/// Request URL templates for every source
#[derive(Debug, Clone)]
pub struct Endpoints {
    api_base: Url,
    article_base: String,
    page_size: u32,
    featured_category: String,
}

impl Endpoints {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        if config.page_size == 0 {
            return Err(Error::Config("source.page_size must be at least 1".to_string()));
        }

        Ok(Self {
            api_base: Url::parse(&config.api_base)?,
            article_base: config.article_base.trim_end_matches('/').to_string(),
            page_size: config.page_size,
            featured_category: config.featured_category.clone(),
        })
    }

    /// Build the listing request for `source`, continuing from `cursor` when it
    /// carries a token. Random ignores the cursor entirely.
    pub fn page_url(&self, source: Source, cursor: &PaginationCursor) -> Url {
        let mut url = self.api_base.clone();
        let limit = self.page_size.to_string();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("action", "query");
            match source {
                Source::Random => {
                    query
                        .append_pair("list", "random")
                        .append_pair("rnnamespace", "0")
                        .append_pair("rnlimit", &limit);
                }
                Source::Featured => {
                    query
                        .append_pair("list", "categorymembers")
                        .append_pair("cmtitle", &format!("Category:{}", self.featured_category))
                        .append_pair("cmlimit", &limit)
                        .append_pair("cmsort", "timestamp")
                        .append_pair("cmdir", "desc");
                }
                Source::Alphabetical => {
                    query
                        .append_pair("list", "allpages")
                        .append_pair("apnamespace", "0")
                        .append_pair("apfilterredir", "nonredirects")
                        .append_pair("aplimit", &limit);
                }
            }
            query.append_pair("format", "json").append_pair("origin", "*");

            if let (Some(param), Some(token)) = (source.continuation_param(), cursor.token()) {
                query.append_pair(param, token);
            }
        }
        url
    }

    /// Plain-text introduction of a single article
    pub fn extract_url(&self, page_id: PageId) -> Url {
        let mut url = self.api_base.clone();
        url.query_pairs_mut()
            .append_pair("action", "query")
            .append_pair("prop", "extracts")
            .append_pair("exintro", "1")
            .append_pair("explaintext", "1")
            .append_pair("pageids", &page_id.to_string())
            .append_pair("format", "json")
            .append_pair("formatversion", "2")
            .append_pair("origin", "*");
        url
    }

    /// URL of the full article, as embedded by a browser front-end
    pub fn embed_url(&self, page_id: PageId) -> String {
        format!("{}/?curid={}", self.article_base, page_id)
    }
}
