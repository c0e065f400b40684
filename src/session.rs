//! Export session: the keyword and counter used to name export files

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use url::Url;

/// Query parameters that carry a search term, in lookup order
pub const KEYWORD_PARAMS: [&str; 6] = ["q", "query", "keyword", "search", "k", "searchKeyword"];

pub const DEFAULT_KEYWORD: &str = "default";
pub const MAX_KEYWORD_CHARS: usize = 20;

const FORBIDDEN_FILENAME_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Persisted naming state. `counter` starts at 1 and goes up by one after
/// every successful export; clearing the store leaves it alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSession {
    pub keyword: String,
    pub counter: u32,
}

impl Default for ExportSession {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            counter: 1,
        }
    }
}

impl ExportSession {
    /// Pick the keyword for the next export.
    ///
    /// A search parameter on the current page wins, then the keyword used
    /// last time, then the first meaningful path segment, then
    /// [`DEFAULT_KEYWORD`]. The result is always sanitized.
    pub fn resolve_keyword(&self, page_url: Option<&str>) -> String {
        let parsed = page_url.and_then(|u| Url::parse(u).ok());

        let keyword = parsed
            .as_ref()
            .and_then(keyword_from_query)
            .or_else(|| Some(self.keyword.clone()).filter(|k| !k.is_empty()))
            .or_else(|| parsed.as_ref().and_then(keyword_from_path))
            .map(|k| sanitize_keyword(&k))
            .unwrap_or_default();

        if keyword.is_empty() {
            DEFAULT_KEYWORD.to_string()
        } else {
            keyword
        }
    }
}

/// Search term from the page URL: a known query parameter first, then the
/// first path segment longer than one character without a `.` in it.
pub fn keyword_from_url(page_url: &str) -> Option<String> {
    let parsed = Url::parse(page_url).ok()?;
    keyword_from_query(&parsed).or_else(|| keyword_from_path(&parsed))
}

/// Value of the first known parameter present on the URL. An empty value
/// still stops the lookup; later parameters are not consulted.
fn keyword_from_query(url: &Url) -> Option<String> {
    KEYWORD_PARAMS
        .iter()
        .find_map(|param| {
            url.query_pairs()
                .find(|(name, _)| name == *param)
                .map(|(_, value)| value.into_owned())
        })
        .filter(|v| !v.is_empty())
}

fn keyword_from_path(url: &Url) -> Option<String> {
    url.path_segments()?
        .find(|seg| seg.chars().count() > 1 && !seg.contains('.'))
        .map(|seg| percent_decode_str(seg).decode_utf8_lossy().into_owned())
}

/// Drop characters that are not allowed in file names and cap the length
pub fn sanitize_keyword(raw: &str) -> String {
    raw.chars()
        .filter(|c| !FORBIDDEN_FILENAME_CHARS.contains(c))
        .take(MAX_KEYWORD_CHARS)
        .collect()
}
