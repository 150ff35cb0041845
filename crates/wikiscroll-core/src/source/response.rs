use serde::Deserialize;
use serde_json::Value;

use super::{ArticleRef, Page, PageId, PaginationCursor, Source};
use crate::FetchError;

/// Item record as returned by list=random / categorymembers / allpages.
/// Random results carry `id`, the listings carry `pageid`.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    pageid: Option<u64>,
    #[serde(default)]
    id: Option<u64>,
    title: String,
}

/// Normalize a listing response for `source`.
///
/// The whole page is rejected if the item field is missing or any record lacks
/// an identifier, so callers never append a partial page.
pub fn parse_page(source: Source, body: &Value) -> Result<Page, FetchError> {
    let records = body
        .get("query")
        .and_then(|q| q.get(source.item_field()))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            FetchError::MalformedResponse(format!(
                "missing query.{} in {} response",
                source.item_field(),
                source
            ))
        })?;

    let items = records
        .iter()
        .map(parse_record)
        .collect::<Result<Vec<_>, _>>()?;

    let token = source.continuation_param().and_then(|param| {
        body.get("continue")
            .and_then(|c| c.get(param))
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    });

    Ok(Page {
        items,
        next_cursor: PaginationCursor {
            token,
            exhausted: false,
        },
    })
}

fn parse_record(value: &Value) -> Result<ArticleRef, FetchError> {
    let raw: RawRecord = serde_json::from_value(value.clone())
        .map_err(|e| FetchError::MalformedResponse(format!("bad item record: {}", e)))?;

    let page_id = raw.pageid.or(raw.id).ok_or_else(|| {
        FetchError::MalformedResponse(format!("item '{}' has neither pageid nor id", raw.title))
    })?;

    Ok(ArticleRef {
        page_id: PageId(page_id),
        title: raw.title,
    })
}

/// Pull the plain-text intro out of a `prop=extracts&formatversion=2` response.
/// Pages without an extract (missing or special pages) yield an empty string.
pub fn parse_extract(body: &Value) -> Result<String, FetchError> {
    let page = body
        .get("query")
        .and_then(|q| q.get("pages"))
        .and_then(Value::as_array)
        .and_then(|pages| pages.first())
        .ok_or_else(|| FetchError::MalformedResponse("missing query.pages".to_string()))?;

    Ok(page
        .get("extract")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string())
}
