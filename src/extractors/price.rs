//! Price extraction
//!
//! Stages go from specific markup to generic markup to a full-text search
//! for a won amount, and finally to looking next to a discount badge. Each
//! stage is less precise than the one before and only runs when all earlier
//! stages found nothing.

use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

use super::{digits_only, first_match, non_empty, selector, text_of, Listing, Strategy};
use crate::error::ExtractError;

/// Comma-grouped digits with an optional `원`, or plain digits followed by `원`
static WON_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9]{1,3}(?:,[0-9]{3})+(?:\s*원)?|[0-9]+\s*원").expect("valid regex")
});

const PRICE_VALUE: &str = "strong.price-value";

const PRICE_CONTAINERS: &[&str] = &[
    ".price-value",
    ".price",
    ".product-price",
    ".price-area .value",
    ".search-product-wrap-price",
    ".price-info .price",
    ".price-info .sale strong",
    ".price-info .sale",
    ".search-product-price-info .price",
    ".search-product-price-info .price-value",
    ".price-area",
    ".price-info",
];

const DISCOUNT_BADGES: &str = r#".instant-discount-rate, [class*="discount"], [class*="sale"]"#;

pub(super) const STRATEGIES: &[Strategy] = &[
    Strategy { name: "price-value", run: price_value_element },
    Strategy { name: "price-container", run: price_container },
    Strategy { name: "text-scan", run: won_amount_in_text },
    Strategy { name: "discount-proximity", run: near_discount_badge },
];

fn price_value_element(listing: &Listing<'_>) -> Result<Option<String>, ExtractError> {
    let sel = selector(PRICE_VALUE)?;
    Ok(listing
        .node
        .select(&sel)
        .next()
        .and_then(|el| non_empty(digits_only(&text_of(el)))))
}

fn price_container(listing: &Listing<'_>) -> Result<Option<String>, ExtractError> {
    for css in PRICE_CONTAINERS {
        if let Some(el) = first_match(listing.node, &[*css])? {
            if let Some(price) = non_empty(digits_only(&text_of(el))) {
                return Ok(Some(price));
            }
        }
    }
    Ok(None)
}

fn won_amount_in_text(listing: &Listing<'_>) -> Result<Option<String>, ExtractError> {
    let sel = selector("*")?;
    Ok(listing.node.select(&sel).find_map(won_amount))
}

fn near_discount_badge(listing: &Listing<'_>) -> Result<Option<String>, ExtractError> {
    let sel = selector(DISCOUNT_BADGES)?;

    for badge in listing.node.select(&sel) {
        if !text_of(badge).contains('%') {
            continue;
        }

        let found = badge
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find_map(won_amount)
            .or_else(|| {
                badge
                    .prev_siblings()
                    .filter_map(ElementRef::wrap)
                    .find_map(won_amount)
            })
            .or_else(|| {
                badge
                    .parent()
                    .and_then(ElementRef::wrap)
                    .and_then(|parent| {
                        parent
                            .next_siblings()
                            .filter_map(ElementRef::wrap)
                            .find_map(won_amount)
                    })
            });

        if found.is_some() {
            return Ok(found);
        }
    }
    Ok(None)
}

/// Digits of the first won amount in `el`'s text
fn won_amount(el: ElementRef<'_>) -> Option<String> {
    let text = text_of(el);
    WON_AMOUNT
        .find(&text)
        .and_then(|m| non_empty(digits_only(m.as_str())))
}
