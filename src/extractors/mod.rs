//! Field extractors
//!
//! Every product attribute is read by an ordered list of [`Strategy`]
//! values. Strategies are tried in order and the first non-empty result
//! wins. A strategy that errors is logged and counts as "no match", so one
//! broken heuristic never costs the other fields of the same item.

mod identifier;
mod image;
mod price;
mod rating;
mod title;

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};
use tracing::{debug, warn};

use crate::error::ExtractError;

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid regex"));

/// A listing item node together with its already-resolved product URL
#[derive(Debug, Clone, Copy)]
pub struct Listing<'a> {
    pub node: ElementRef<'a>,
    pub url: &'a str,
}

pub type StrategyFn = fn(&Listing<'_>) -> Result<Option<String>, ExtractError>;

/// One named heuristic in a field's fallback chain
#[derive(Clone, Copy)]
pub struct Strategy {
    pub name: &'static str,
    pub run: StrategyFn,
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategy").field("name", &self.name).finish()
    }
}

/// Product attributes that have an extractor chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    ProductId,
    Title,
    ImageUrl,
    Price,
    Rating,
    RatingCount,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::ProductId,
        Field::Title,
        Field::ImageUrl,
        Field::Price,
        Field::Rating,
        Field::RatingCount,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::ProductId => "productId",
            Field::Title => "title",
            Field::ImageUrl => "imageUrl",
            Field::Price => "price",
            Field::Rating => "rating",
            Field::RatingCount => "ratingCount",
        }
    }

    /// The fallback chain for this field, highest confidence first
    pub fn strategies(self) -> &'static [Strategy] {
        match self {
            Field::ProductId => identifier::STRATEGIES,
            Field::Title => title::STRATEGIES,
            Field::ImageUrl => image::STRATEGIES,
            Field::Price => price::STRATEGIES,
            Field::Rating => rating::RATING_STRATEGIES,
            Field::RatingCount => rating::COUNT_STRATEGIES,
        }
    }
}

/// Run `field`'s chain against `listing`.
///
/// Returns the first non-empty value, or an empty string when every
/// strategy came up empty or failed.
pub fn extract_field(field: Field, listing: &Listing<'_>) -> String {
    run_chain(field, field.strategies(), listing)
}

pub(crate) fn run_chain(field: Field, strategies: &[Strategy], listing: &Listing<'_>) -> String {
    for strategy in strategies {
        match (strategy.run)(listing) {
            Ok(Some(value)) if !value.is_empty() => {
                debug!(field = field.as_str(), strategy = strategy.name, %value, "field extracted");
                return value;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(field = field.as_str(), strategy = strategy.name, error = %e, "strategy failed");
            }
        }
    }
    String::new()
}

pub(crate) fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::InvalidSelector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

/// First descendant matching any of `candidates`, trying them in priority
/// order rather than document order
pub(crate) fn first_match<'a>(
    node: ElementRef<'a>,
    candidates: &[&str],
) -> Result<Option<ElementRef<'a>>, ExtractError> {
    for css in candidates {
        let sel = selector(css)?;
        if let Some(el) = node.select(&sel).next() {
            return Ok(Some(el));
        }
    }
    Ok(None)
}

/// Trimmed text content, like `textContent.trim()`
pub(crate) fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

pub(crate) fn digits_only(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

pub(crate) fn first_digit_run(s: &str) -> Option<&str> {
    DIGIT_RUN.find(s).map(|m| m.as_str())
}

/// `Some(value)` unless it is empty
pub(crate) fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::with_item;
    use super::*;

    fn always_fails(_: &Listing<'_>) -> Result<Option<String>, ExtractError> {
        selector("li[").map(|_| None)
    }

    fn empty(_: &Listing<'_>) -> Result<Option<String>, ExtractError> {
        Ok(Some(String::new()))
    }

    fn fixed(_: &Listing<'_>) -> Result<Option<String>, ExtractError> {
        Ok(Some("fixed".to_string()))
    }

    #[test]
    fn test_chain_skips_failures_and_empties() {
        let chain = [
            Strategy { name: "broken", run: always_fails },
            Strategy { name: "empty", run: empty },
            Strategy { name: "fixed", run: fixed },
        ];

        let value = with_item("<ul><li>x</li></ul>", "", |listing| {
            run_chain(Field::Title, &chain, listing)
        });
        assert_eq!(value, "fixed");
    }

    #[test]
    fn test_chain_all_failing_is_empty() {
        let chain = [Strategy { name: "broken", run: always_fails }];
        let value = with_item("<ul><li>x</li></ul>", "", |listing| {
            run_chain(Field::Price, &chain, listing)
        });
        assert_eq!(value, "");
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        let err = selector("div[").unwrap_err();
        assert!(matches!(err, ExtractError::InvalidSelector { ref selector, .. } if selector == "div["));
    }

    #[test]
    fn test_first_match_uses_priority_order() {
        let html = r#"<ul><li>
            <span class="title">Second in priority</span>
            <span class="name">First in priority</span>
        </li></ul>"#;

        let text = with_item(html, "", |listing| {
            first_match(listing.node, &[".name", ".title"])
                .unwrap()
                .map(text_of)
        });
        assert_eq!(text.as_deref(), Some("First in priority"));
    }

    #[test]
    fn test_every_field_has_a_chain() {
        for field in Field::ALL {
            assert!(!field.strategies().is_empty(), "{} has no strategies", field.as_str());
        }
    }
}
