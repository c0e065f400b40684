//! Listing scanner
//!
//! Finds the listing item nodes on a results page, runs every field
//! extractor on each and keeps the items that have both a title and a link.
//! Failures are absorbed at the smallest scope that contains them: a field
//! comes back empty, an item is skipped, or the whole scan yields nothing.

use scraper::{ElementRef, Html};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::CollectorConfig;
use crate::error::ExtractError;
use crate::extractors::{extract_field, selector, Field, Listing};
use crate::record::ProductRecord;

pub const DEFAULT_ORIGIN: &str = "https://www.coupang.com";

/// Listing item patterns in priority order; the first one that matches
/// anything is used for the whole page
pub const DEFAULT_ITEM_SELECTORS: [&str; 4] = [
    "li.search-product",
    "ul.productList li",
    ".baby-product",
    "article.product",
];

#[derive(Debug, Clone)]
pub struct ListingScanner {
    origin: String,
    item_selectors: Vec<String>,
}

impl Default for ListingScanner {
    fn default() -> Self {
        Self::new(DEFAULT_ORIGIN)
    }
}

impl ListingScanner {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            item_selectors: DEFAULT_ITEM_SELECTORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn from_config(config: &CollectorConfig) -> Self {
        Self::new(config.origin.clone()).with_item_selectors(config.item_selectors.clone())
    }

    pub fn with_item_selectors(mut self, selectors: Vec<String>) -> Self {
        self.item_selectors = selectors;
        self
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Parse `html` and scan it
    pub fn scan_html(&self, html: &str) -> Vec<ProductRecord> {
        let document = Html::parse_document(html);
        self.scan(&document)
    }

    /// Extract every usable product record from `document`, in document order.
    ///
    /// Never fails: an unusable item is skipped and a page whose item
    /// patterns cannot be evaluated yields an empty list.
    pub fn scan(&self, document: &Html) -> Vec<ProductRecord> {
        let items = match self.locate_items(document) {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "could not locate listing items");
                return Vec::new();
            }
        };

        let found = items.len();
        let mut records = Vec::with_capacity(found);
        for (index, item) in items.into_iter().enumerate() {
            match self.extract_item(item) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => debug!(index, "item skipped: missing title or link"),
                Err(e) => warn!(index, error = %e, "item skipped"),
            }
        }

        info!(found, kept = records.len(), "scan complete");
        records
    }

    /// True when any item pattern matches, i.e. this looks like a results page
    pub fn is_listing_page(&self, document: &Html) -> bool {
        self.item_selectors.iter().any(|css| match selector(css) {
            Ok(sel) => document.select(&sel).next().is_some(),
            Err(_) => false,
        })
    }

    /// Whether scanning `page_url` makes sense: the URL mentions the
    /// configured site or looks like a product page.
    pub fn is_supported_page(&self, page_url: &str) -> bool {
        let site = Url::parse(&self.origin)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()));

        site.is_some_and(|site| page_url.contains(&site)) || page_url.contains("product")
    }

    fn locate_items<'a>(&self, document: &'a Html) -> Result<Vec<ElementRef<'a>>, ExtractError> {
        for css in &self.item_selectors {
            let sel = selector(css)?;
            let items: Vec<ElementRef<'a>> = document.select(&sel).collect();
            if !items.is_empty() {
                debug!(selector = %css, count = items.len(), "listing items located");
                return Ok(items);
            }
        }
        Ok(Vec::new())
    }

    /// Build the record for one item node.
    ///
    /// `Ok(None)` when the item has no link or no title.
    pub fn extract_item(&self, item: ElementRef<'_>) -> Result<Option<ProductRecord>, ExtractError> {
        let link = selector("a[href]")?;
        let Some(href) = item
            .select(&link)
            .filter_map(|a| a.value().attr("href"))
            .map(str::trim)
            .find(|href| !href.is_empty())
        else {
            return Ok(None);
        };

        let url = normalize_url(&self.origin, href);
        let listing = Listing {
            node: item,
            url: &url,
        };

        let title = extract_field(Field::Title, &listing);
        if title.is_empty() {
            return Ok(None);
        }

        Ok(Some(ProductRecord {
            product_id: extract_field(Field::ProductId, &listing),
            title,
            price: extract_field(Field::Price, &listing),
            rating: extract_field(Field::Rating, &listing),
            rating_count: extract_field(Field::RatingCount, &listing),
            image_url: extract_field(Field::ImageUrl, &listing),
            url,
        }))
    }
}

/// Make `href` absolute by prefixing `origin` unless it already carries a
/// scheme. No other validation is done.
pub fn normalize_url(origin: &str, href: &str) -> String {
    let href = href.trim();
    let lower = href.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return href.to_string();
    }
    if href.starts_with("//") {
        return format!("https:{href}");
    }

    let origin = origin.trim_end_matches('/');
    if href.starts_with('/') {
        format!("{origin}{href}")
    } else {
        format!("{origin}/{href}")
    }
}
