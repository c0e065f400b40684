//! Product identifier extraction
//!
//! The item's own `id` attribute outranks its `data-*` attributes. That
//! order is a tunable heuristic kept for compatibility with existing
//! exports, not a correctness rule. Every step yields digits only.

use std::sync::LazyLock;

use regex::Regex;

use super::{first_digit_run, selector, Listing, Strategy};
use crate::error::ExtractError;

static PRODUCT_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"products?/([0-9]+)").expect("valid regex"));
static ITEM_ID_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"itemId=([0-9]+)").expect("valid regex"));

const OWN_DATA_ATTRS: [&str; 2] = ["data-product-id", "data-item-id"];
const NESTED_DATA_ATTRS: [&str; 4] = [
    "data-product-id",
    "data-item-id",
    "data-itemid",
    "data-vendor-item-id",
];

pub(super) const STRATEGIES: &[Strategy] = &[
    Strategy { name: "own-id", run: own_element_id },
    Strategy { name: "own-data-attr", run: own_data_attr },
    Strategy { name: "nested-data-attr", run: nested_data_attr },
    Strategy { name: "url-path", run: url_product_path },
    Strategy { name: "url-item-id", run: url_item_id_param },
    Strategy { name: "nested-id", run: nested_element_id },
];

fn own_element_id(listing: &Listing<'_>) -> Result<Option<String>, ExtractError> {
    Ok(listing
        .node
        .value()
        .id()
        .and_then(first_digit_run)
        .map(String::from))
}

fn own_data_attr(listing: &Listing<'_>) -> Result<Option<String>, ExtractError> {
    let el = listing.node.value();
    Ok(OWN_DATA_ATTRS
        .iter()
        .filter_map(|attr| el.attr(attr))
        .find_map(first_digit_run)
        .map(String::from))
}

fn nested_data_attr(listing: &Listing<'_>) -> Result<Option<String>, ExtractError> {
    let css = NESTED_DATA_ATTRS
        .iter()
        .map(|attr| format!("[{attr}]"))
        .collect::<Vec<_>>()
        .join(", ");
    let sel = selector(&css)?;

    let Some(el) = listing.node.select(&sel).next() else {
        return Ok(None);
    };
    Ok(NESTED_DATA_ATTRS
        .iter()
        .filter_map(|attr| el.value().attr(attr))
        .find_map(first_digit_run)
        .map(String::from))
}

fn url_product_path(listing: &Listing<'_>) -> Result<Option<String>, ExtractError> {
    Ok(capture(&PRODUCT_PATH, listing.url))
}

fn url_item_id_param(listing: &Listing<'_>) -> Result<Option<String>, ExtractError> {
    Ok(capture(&ITEM_ID_PARAM, listing.url))
}

fn nested_element_id(listing: &Listing<'_>) -> Result<Option<String>, ExtractError> {
    let sel = selector("[id]")?;
    Ok(listing
        .node
        .select(&sel)
        .filter_map(|el| el.value().id().and_then(first_digit_run))
        .next()
        .map(String::from))
}

fn capture(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use crate::extractors::test_support::with_item;
    use crate::extractors::{extract_field, Field};

    fn product_id(html: &str, url: &str) -> String {
        with_item(html, url, |listing| extract_field(Field::ProductId, listing))
    }

    #[test]
    fn test_own_id_outranks_data_attribute() {
        let html = r#"<ul><li id="prod12345" data-product-id="999"><a href="/x">x</a></li></ul>"#;
        assert_eq!(product_id(html, "https://www.coupang.com/x"), "12345");
    }

    #[test]
    fn test_own_data_attribute() {
        let html = r#"<ul><li data-item-id="4411"><a href="/x">x</a></li></ul>"#;
        assert_eq!(product_id(html, ""), "4411");
    }

    #[test]
    fn test_data_attribute_is_reduced_to_digits() {
        let html = r#"<ul><li data-product-id="SKU-12"><a href="/x">x</a></li></ul>"#;
        assert_eq!(product_id(html, ""), "12");

        let html = r#"<ul><li data-product-id="none" data-item-id="4411"><a href="/x">x</a></li></ul>"#;
        assert_eq!(product_id(html, ""), "4411");

        let html = r#"<ul><li><div data-itemid=" v-88 ">x</div></li></ul>"#;
        assert_eq!(product_id(html, ""), "88");
    }

    #[test]
    fn test_nested_data_attribute() {
        let html = r#"<ul><li class="item">
            <div class="wrap"><a data-vendor-item-id="70001" href="/x">x</a></div>
        </li></ul>"#;
        assert_eq!(product_id(html, "https://www.coupang.com/vp/products/5"), "70001");
    }

    #[test]
    fn test_product_path_in_url() {
        let html = r#"<ul><li><a href="/vp/products/7788?itemId=12">x</a></li></ul>"#;
        let url = "https://www.coupang.com/vp/products/7788?itemId=12";
        assert_eq!(product_id(html, url), "7788");
    }

    #[test]
    fn test_item_id_param_when_path_has_none() {
        let html = r#"<ul><li><a href="/vp/view?itemId=3344">x</a></li></ul>"#;
        assert_eq!(product_id(html, "https://www.coupang.com/vp/view?itemId=3344"), "3344");
    }

    #[test]
    fn test_nested_element_id_is_last_resort() {
        let html = r#"<ul><li>
            <span id="label">no digits</span>
            <span id="badge-552">x</span>
        </li></ul>"#;
        assert_eq!(product_id(html, "https://www.coupang.com/np/search"), "552");
    }

    #[test]
    fn test_nothing_found_is_empty() {
        let html = r#"<ul><li><a href="/np/search">x</a></li></ul>"#;
        assert_eq!(product_id(html, "https://www.coupang.com/np/search"), "");
    }
}
