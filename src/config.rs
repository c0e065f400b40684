//! Configuration from environment variables

use std::path::PathBuf;

use url::Url;

use crate::error::ConfigError;
use crate::export::DEFAULT_EXPORT_PREFIX;
use crate::preview::DEFAULT_PAGE_SIZE;
use crate::scanner::{DEFAULT_ITEM_SELECTORS, DEFAULT_ORIGIN};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    /// Prefixed to relative product links
    pub origin: String,
    pub store_path: PathBuf,
    pub export_prefix: String,
    pub export_dir: PathBuf,
    pub page_size: usize,
    /// Listing item patterns, highest priority first
    pub item_selectors: Vec<String>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            store_path: PathBuf::from("./listing-store.json"),
            export_prefix: DEFAULT_EXPORT_PREFIX.to_string(),
            export_dir: PathBuf::from("."),
            page_size: DEFAULT_PAGE_SIZE,
            item_selectors: DEFAULT_ITEM_SELECTORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Load configuration, reading a `.env` file first if there is one.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_config() -> Result<CollectorConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_config_from_env()
}

/// Like [`load_config`] but without touching `.env`.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_config_from_env() -> Result<CollectorConfig, ConfigError> {
    build_config(|key| std::env::var(key))
}

fn build_config<F>(lookup: F) -> Result<CollectorConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let defaults = CollectorConfig::default();
    let optional = |var: &str| lookup(var).ok().filter(|v| !v.trim().is_empty());
    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let origin = match optional("LISTING_ORIGIN") {
        Some(raw) => {
            let trimmed = raw.trim().trim_end_matches('/').to_string();
            Url::parse(&trimmed).map_err(|e| invalid("LISTING_ORIGIN", e.to_string()))?;
            trimmed
        }
        None => defaults.origin,
    };

    let page_size = match optional("LISTING_PAGE_SIZE") {
        Some(raw) => {
            let size = raw
                .trim()
                .parse::<usize>()
                .map_err(|e| invalid("LISTING_PAGE_SIZE", e.to_string()))?;
            if size == 0 {
                return Err(invalid("LISTING_PAGE_SIZE", "must be at least 1".to_string()));
            }
            size
        }
        None => defaults.page_size,
    };

    let item_selectors = match optional("LISTING_ITEM_SELECTORS") {
        Some(raw) => {
            let list: Vec<String> = raw
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            if list.is_empty() {
                return Err(invalid(
                    "LISTING_ITEM_SELECTORS",
                    "no selectors given".to_string(),
                ));
            }
            list
        }
        None => defaults.item_selectors,
    };

    Ok(CollectorConfig {
        origin,
        store_path: optional("LISTING_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.store_path),
        export_prefix: optional("LISTING_EXPORT_PREFIX").unwrap_or(defaults.export_prefix),
        export_dir: optional("LISTING_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.export_dir),
        page_size,
        item_selectors,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let map = HashMap::new();
        let config = build_config(lookup_from_map(&map)).unwrap();
        assert_eq!(config, CollectorConfig::default());
        assert_eq!(config.origin, "https://www.coupang.com");
        assert_eq!(config.item_selectors[0], "li.search-product");
    }

    #[test]
    fn test_overrides() {
        let map = HashMap::from([
            ("LISTING_ORIGIN", "https://shop.example.com/"),
            ("LISTING_STORE_PATH", "/tmp/store.json"),
            ("LISTING_EXPORT_PREFIX", "items"),
            ("LISTING_PAGE_SIZE", "25"),
            ("LISTING_ITEM_SELECTORS", "div.card; li.result ;"),
        ]);
        let config = build_config(lookup_from_map(&map)).unwrap();

        assert_eq!(config.origin, "https://shop.example.com");
        assert_eq!(config.store_path, PathBuf::from("/tmp/store.json"));
        assert_eq!(config.export_prefix, "items");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.item_selectors, ["div.card", "li.result"]);
    }

    #[test]
    fn test_invalid_page_size() {
        let map = HashMap::from([("LISTING_PAGE_SIZE", "0")]);
        let err = build_config(lookup_from_map(&map)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "LISTING_PAGE_SIZE"));

        let map = HashMap::from([("LISTING_PAGE_SIZE", "ten")]);
        assert!(build_config(lookup_from_map(&map)).is_err());
    }

    #[test]
    fn test_invalid_origin() {
        let map = HashMap::from([("LISTING_ORIGIN", "not a url")]);
        let err = build_config(lookup_from_map(&map)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "LISTING_ORIGIN"));
    }
}
