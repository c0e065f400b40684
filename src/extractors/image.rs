//! Image URL extraction

use scraper::ElementRef;

use super::{first_match, Listing, Strategy};
use crate::error::ExtractError;

const IMAGE_ELEMENTS: &[&str] = &["img.search-product-wrap-img", "img.product-image", "img"];

pub(super) const STRATEGIES: &[Strategy] = &[
    Strategy { name: "img-src", run: image_src },
    Strategy { name: "img-data-src", run: image_data_src },
];

fn image_src(listing: &Listing<'_>) -> Result<Option<String>, ExtractError> {
    Ok(image_element(listing)?.and_then(|img| attr_url(img, "src")))
}

fn image_data_src(listing: &Listing<'_>) -> Result<Option<String>, ExtractError> {
    Ok(image_element(listing)?.and_then(|img| attr_url(img, "data-src")))
}

fn image_element<'a>(listing: &Listing<'a>) -> Result<Option<ElementRef<'a>>, ExtractError> {
    first_match(listing.node, IMAGE_ELEMENTS)
}

fn attr_url(img: ElementRef<'_>, attr: &str) -> Option<String> {
    let raw = img.value().attr(attr)?.trim();
    if raw.is_empty() {
        return None;
    }
    // a browser reports protocol-relative sources with the page scheme
    if raw.starts_with("//") {
        Some(format!("https:{raw}"))
    } else {
        Some(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use crate::extractors::test_support::with_item;
    use crate::extractors::{extract_field, Field};

    fn image(html: &str) -> String {
        with_item(html, "", |listing| extract_field(Field::ImageUrl, listing))
    }

    #[test]
    fn test_preferred_image_class() {
        let html = r#"<ul><li>
            <img class="badge" src="https://static/badge.png">
            <img class="search-product-wrap-img" src="//thumbnail6.coupangcdn.com/a.jpg">
        </li></ul>"#;
        assert_eq!(image(html), "https://thumbnail6.coupangcdn.com/a.jpg");
    }

    #[test]
    fn test_lazy_loaded_image() {
        let html = r#"<ul><li>
            <img class="product-image" data-src="https://cdn/lazy.jpg">
        </li></ul>"#;
        assert_eq!(image(html), "https://cdn/lazy.jpg");
    }

    #[test]
    fn test_no_image() {
        assert_eq!(image("<ul><li><span>text only</span></li></ul>"), "");
    }
}
