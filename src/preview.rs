//! Paged preview of accumulated records
//!
//! [`PreviewState`] is plain data owned by whoever renders the preview; it
//! is passed around instead of living in globals.

use std::ops::Range;

use crate::record::ProductRecord;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DISPLAY_URL_CHARS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewState {
    page: usize,
    page_size: usize,
    total_items: usize,
}

impl PreviewState {
    /// Start on page 1. A zero page size is treated as 1.
    pub fn new(total_items: usize, page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total_items,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Never less than 1, so an empty store still shows "1/1"
    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.page_size).max(1)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Returns false when already on the last page
    pub fn next(&mut self) -> bool {
        if self.has_next() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Returns false when already on the first page
    pub fn prev(&mut self) -> bool {
        if self.has_prev() {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to `page`, clamped into `1..=total_pages`
    pub fn go_to(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages());
    }

    /// Item indices shown on the current page
    pub fn range(&self) -> Range<usize> {
        let start = ((self.page - 1) * self.page_size).min(self.total_items);
        let end = (start + self.page_size).min(self.total_items);
        start..end
    }

    pub fn page_items<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let range = self.range();
        &items[range.start.min(items.len())..range.end.min(items.len())]
    }

    /// `current/total`
    pub fn label(&self) -> String {
        format!("{}/{}", self.page, self.total_pages())
    }
}

/// Insert thousands separators into a run of digits
pub fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `19900` as `19,900원`; `None` for an empty or non-numeric price
pub fn format_won(price: &str) -> Option<String> {
    let digits = price.replace(',', "");
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let trimmed = digits.trim_start_matches('0');
    let trimmed = if trimmed.is_empty() { "0" } else { trimmed };
    Some(format!("{}원", group_digits(trimmed)))
}

/// Five glyphs: full stars, one half star when the fraction is at least .5,
/// empty stars for the rest
pub fn star_bar(rating: &str) -> Option<String> {
    let value: f32 = rating.trim().parse().ok()?;
    let value = value.clamp(0.0, 5.0);
    let full = value.floor() as usize;
    let half = full < 5 && value.fract() >= 0.5;

    let mut bar = "★".repeat(full);
    if half {
        bar.push('½');
    }
    let used = full + usize::from(half);
    bar.push_str(&"☆".repeat(5 - used));
    Some(bar)
}

/// Cut `s` to `max` characters, marking the cut with `...`
pub fn truncate_display(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}

/// Display lines for one record; empty fields are left out
pub fn describe(record: &ProductRecord) -> Vec<String> {
    let mut lines = Vec::new();

    if !record.product_id.is_empty() {
        lines.push(format!("ID: {}", record.product_id));
    }
    lines.push(if record.title.is_empty() {
        "제품명 없음".to_string()
    } else {
        record.title.clone()
    });
    if let Some(price) = format_won(&record.price) {
        lines.push(format!("가격: {price}"));
    }
    if !record.rating.is_empty() {
        let stars = star_bar(&record.rating).unwrap_or_default();
        lines.push(format!("평점: {} {stars}", record.rating).trim_end().to_string());
    }
    if !record.rating_count.is_empty() {
        let digits = record.rating_count.replace(',', "");
        lines.push(format!("리뷰 수: {}", group_digits(&digits)));
    }
    if !record.image_url.is_empty() {
        lines.push(format!(
            "이미지 URL: {}",
            truncate_display(&record.image_url, DISPLAY_URL_CHARS)
        ));
    }
    if !record.url.is_empty() {
        lines.push(format!(
            "제품 URL: {}",
            truncate_display(&record.url, DISPLAY_URL_CHARS)
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paging() {
        let mut state = PreviewState::new(23, 10);
        assert_eq!(state.total_pages(), 3);
        assert_eq!(state.label(), "1/3");
        assert_eq!(state.range(), 0..10);
        assert!(!state.prev());

        assert!(state.next());
        assert!(state.next());
        assert_eq!(state.range(), 20..23);
        assert!(!state.next());
        assert_eq!(state.label(), "3/3");

        state.go_to(99);
        assert_eq!(state.page(), 3);
        state.go_to(0);
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn test_empty_preview() {
        let state = PreviewState::new(0, 10);
        assert_eq!(state.total_pages(), 1);
        assert_eq!(state.range(), 0..0);
        let items: [u8; 0] = [];
        assert!(state.page_items(&items).is_empty());
    }

    #[test]
    fn test_page_items() {
        let items: Vec<u32> = (0..12).collect();
        let mut state = PreviewState::new(items.len(), 5);
        state.go_to(3);
        assert_eq!(state.page_items(&items), &[10, 11]);
    }

    #[test]
    fn test_format_won() {
        assert_eq!(format_won("19900").as_deref(), Some("19,900원"));
        assert_eq!(format_won("1294720").as_deref(), Some("1,294,720원"));
        assert_eq!(format_won("900").as_deref(), Some("900원"));
        assert_eq!(format_won(""), None);
        assert_eq!(format_won("n/a"), None);
    }

    #[test]
    fn test_star_bar() {
        assert_eq!(star_bar("4.5").as_deref(), Some("★★★★½"));
        assert_eq!(star_bar("3").as_deref(), Some("★★★☆☆"));
        assert_eq!(star_bar("5.0").as_deref(), Some("★★★★★"));
        assert_eq!(star_bar("x"), None);
    }

    #[test]
    fn test_truncate_display() {
        let url = "https://www.coupang.com/vp/products/123456789";
        assert_eq!(truncate_display(url, 30), "https://www.coupang.com/vp/pro...");
        assert_eq!(truncate_display("short", 30), "short");
    }

    #[test]
    fn test_describe_skips_empty_fields() {
        let record = ProductRecord {
            product_id: String::new(),
            title: "Only title".into(),
            price: String::new(),
            rating: String::new(),
            rating_count: String::new(),
            image_url: String::new(),
            url: "https://x.example/p".into(),
        };
        assert_eq!(describe(&record), vec!["Only title", "제품 URL: https://x.example/p"]);
    }
}
