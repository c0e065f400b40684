//! Rating and rating-count extraction

use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

use super::{first_match, non_empty, text_of, Listing, Strategy};
use crate::error::ExtractError;

/// `4.5` or a single digit; values above 5 are rejected after matching
static RATING_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]\.[0-9]|[0-9]").expect("valid regex"));

/// The `width` declaration of an inline style, as used by star bars
static STYLE_WIDTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|;)\s*width\s*:\s*([0-9]+(?:\.[0-9]+)?)\s*%").expect("valid regex")
});

static GROUPED_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9][0-9,]*").expect("valid regex"));

const RATING_ELEMENTS: &[&str] = &[
    ".rating",
    ".product-rating",
    ".star-rating",
    ".rating-star",
    r#"[class*="rating"]"#,
    r#"[class*="stars"]"#,
];

const COUNT_ELEMENTS: &[&str] = &[
    ".rating-total-count",
    ".review-count",
    r#"[class*="review"]"#,
    r#"[class*="rating-count"]"#,
    ".count",
];

pub(super) const RATING_STRATEGIES: &[Strategy] = &[
    Strategy { name: "rating-text", run: rating_from_text },
    Strategy { name: "star-width", run: rating_from_star_width },
    Strategy { name: "aria-label", run: rating_from_aria_label },
];

pub(super) const COUNT_STRATEGIES: &[Strategy] =
    &[Strategy { name: "count-text", run: count_from_text }];

fn rating_element<'a>(listing: &Listing<'a>) -> Result<Option<ElementRef<'a>>, ExtractError> {
    first_match(listing.node, RATING_ELEMENTS)
}

fn rating_from_text(listing: &Listing<'_>) -> Result<Option<String>, ExtractError> {
    Ok(rating_element(listing)?.and_then(|el| parse_rating(&text_of(el))))
}

fn rating_from_star_width(listing: &Listing<'_>) -> Result<Option<String>, ExtractError> {
    Ok(rating_element(listing)?
        .and_then(|el| el.value().attr("style"))
        .and_then(rating_from_style))
}

fn rating_from_aria_label(listing: &Listing<'_>) -> Result<Option<String>, ExtractError> {
    Ok(rating_element(listing)?
        .and_then(|el| el.value().attr("aria-label"))
        .and_then(parse_rating))
}

fn count_from_text(listing: &Listing<'_>) -> Result<Option<String>, ExtractError> {
    let Some(el) = first_match(listing.node, COUNT_ELEMENTS)? else {
        return Ok(None);
    };
    let text = text_of(el);
    Ok(GROUPED_DIGITS
        .find(&text)
        .and_then(|m| non_empty(m.as_str().replace(',', ""))))
}

/// First rating-looking number in `0..=5`
pub(crate) fn parse_rating(text: &str) -> Option<String> {
    RATING_VALUE
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|candidate| candidate.parse::<f32>().is_ok_and(|v| v <= 5.0))
        .map(String::from)
}

/// `width: 90%` becomes `4.5`; 100% is five stars
pub(crate) fn rating_from_style(style: &str) -> Option<String> {
    let percent: f64 = STYLE_WIDTH.captures(style)?.get(1)?.as_str().parse().ok()?;
    // whole tenths of a star, ties rounded up: 85% is 4.3
    let tenths = (percent.clamp(0.0, 100.0) / 2.0).round();
    Some(format!("{:.1}", tenths / 10.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::test_support::with_item;
    use crate::extractors::{extract_field, Field};

    fn rating(html: &str) -> (String, String) {
        with_item(html, "", |listing| {
            (
                extract_field(Field::Rating, listing),
                extract_field(Field::RatingCount, listing),
            )
        })
    }

    #[test]
    fn test_rating_text() {
        let html = r#"<ul><li>
            <div class="rating-star">
                <em class="rating">4.5</em>
                <span class="rating-total-count">(1,234)</span>
            </div>
        </li></ul>"#;
        assert_eq!(rating(html), ("4.5".to_string(), "1234".to_string()));
    }

    #[test]
    fn test_rating_from_star_width() {
        let html = r#"<ul><li>
            <div class="star"><em class="rating" style="width: 90%"></em></div>
        </li></ul>"#;
        assert_eq!(rating(html).0, "4.5");
    }

    #[test]
    fn test_rating_from_aria_label() {
        let html = r#"<ul><li>
            <span class="star-rating" aria-label="평점 3.5점 (5점 만점)"></span>
        </li></ul>"#;
        assert_eq!(rating(html).0, "3.5");
    }

    #[test]
    fn test_missing_rating_and_count() {
        let html = r#"<ul><li><span class="name">No reviews yet</span></li></ul>"#;
        assert_eq!(rating(html), (String::new(), String::new()));
    }

    #[test]
    fn test_review_count_variants() {
        let html = r#"<ul><li><span class="review-count">리뷰 87개</span></li></ul>"#;
        assert_eq!(rating(html).1, "87");
    }

    #[test]
    fn test_parse_rating_rejects_out_of_range() {
        assert_eq!(parse_rating("7.5 / 4.0").as_deref(), Some("4.0"));
        assert_eq!(parse_rating("no digits"), None);
        assert_eq!(parse_rating("5").as_deref(), Some("5"));
    }

    #[test]
    fn test_rating_from_style() {
        assert_eq!(rating_from_style("width:100%").as_deref(), Some("5.0"));
        assert_eq!(rating_from_style("display:block; width: 70%;").as_deref(), Some("3.5"));
        assert_eq!(rating_from_style("max-width: 50%"), None);
        assert_eq!(rating_from_style("width: 85%").as_deref(), Some("4.3"));
        assert_eq!(rating_from_style("width: 65%").as_deref(), Some("3.3"));
        assert_eq!(rating_from_style("width: 45%").as_deref(), Some("2.3"));
        assert_eq!(rating_from_style("width:25%").as_deref(), Some("1.3"));
        assert_eq!(rating_from_style("width: 90%").as_deref(), Some("4.5"));
        assert_eq!(rating_from_style("color: red"), None);
    }
}
