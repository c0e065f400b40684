//! Title extraction

use super::{first_match, non_empty, text_of, Listing, Strategy};
use crate::error::ExtractError;

const TITLE_ELEMENTS: &[&str] = &[
    ".name",
    ".product-name",
    ".title",
    ".baby-product-link",
    ".description",
];

pub(super) const STRATEGIES: &[Strategy] = &[Strategy { name: "title-class", run: title_element }];

fn title_element(listing: &Listing<'_>) -> Result<Option<String>, ExtractError> {
    for css in TITLE_ELEMENTS {
        if let Some(el) = first_match(listing.node, &[*css])? {
            if let Some(title) = non_empty(text_of(el)) {
                return Ok(Some(title));
            }
        }
    }
    Ok(None)
}
