//! The product record produced by a scan

use serde::{Deserialize, Serialize};

/// One product listing extracted from a results page.
///
/// `title` and `url` are always non-empty for records built by the scanner.
/// Every other field is a plain string and is empty when it could not be
/// determined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    #[serde(default)]
    pub product_id: String,
    pub title: String,
    /// Digits only, currency marks and separators stripped
    #[serde(default)]
    pub price: String,
    /// Decimal string in `0.0..=5.0`
    #[serde(default)]
    pub rating: String,
    #[serde(default, alias = "ratingTotalCount")]
    pub rating_count: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(rename = "productUrl")]
    pub url: String,
}

impl ProductRecord {
    /// Column order shared by the CSV header and [`ProductRecord::csv_row`].
    pub const CSV_HEADER: [&'static str; 7] = [
        "productId",
        "title",
        "price",
        "rating",
        "ratingCount",
        "imageUrl",
        "productUrl",
    ];

    pub fn csv_row(&self) -> [&str; 7] {
        [
            &self.product_id,
            &self.title,
            &self.price,
            &self.rating,
            &self.rating_count,
            &self.image_url,
            &self.url,
        ]
    }
}
