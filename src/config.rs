use std::{str::FromStr, time::Duration};

use reqwest::Url;

use crate::{
    domain::display::{DisplayLabels, PriceConversion},
    session::PageAdvance,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub db_connection_string: String,
    pub page_size: u32,
    pub page_advance: PageAdvance,
    pub price: PriceConversion,
    pub labels: DisplayLabels,
    pub request_timeout: Duration,
}

const DEFAULT_BASE_URL: &str = "https://api.itbook.store/1.0/";
const DEFAULT_DB_CONNECTION_STRING: &str = "sqlite://memos.sqlite?mode=rwc";
const DEFAULT_PAGE_SIZE: u32 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: DEFAULT_BASE_URL.into(),
            db_connection_string: DEFAULT_DB_CONNECTION_STRING.into(),
            page_size: DEFAULT_PAGE_SIZE,
            page_advance: PageAdvance::default(),
            price: PriceConversion::default(),
            labels: DisplayLabels::default(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Read the configuration from the process environment, falling back to
    /// defaults for anything unset.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();
        let base_url = lookup("ITBOOK_BASE_URL").unwrap_or(defaults.base_url);
        let db_connection_string =
            lookup("DB_CONNECTION_STRING").unwrap_or(defaults.db_connection_string);
        let page_size = parse_or("PAGE_SIZE", &lookup, defaults.page_size)?;
        let page_advance = parse_or("PAGE_ADVANCE", &lookup, defaults.page_advance)?;
        let price = PriceConversion {
            major_rate: parse_or("PRICE_MAJOR_RATE", &lookup, defaults.price.major_rate)?,
            minor_rate: parse_or("PRICE_MINOR_RATE", &lookup, defaults.price.minor_rate)?,
        };
        let mut labels: DisplayLabels = defaults.labels;
        if let Some(free) = lookup("FREE_LABEL") {
            labels.free = free;
        }
        if let Some(no_subtitle) = lookup("NO_SUBTITLE_LABEL") {
            labels.no_subtitle = no_subtitle;
        }
        let timeout_secs = parse_or(
            "REQUEST_TIMEOUT_SECS",
            &lookup,
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;

        Ok(Config {
            base_url,
            db_connection_string,
            page_size,
            page_advance,
            price,
            labels,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::InvalidValue("ITBOOK_BASE_URL", e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue(
                "ITBOOK_BASE_URL",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue("PAGE_SIZE", "must be positive".into()));
        }
        if self.price.major_rate <= 0 {
            return Err(ConfigError::InvalidValue(
                "PRICE_MAJOR_RATE",
                "must be positive".into(),
            ));
        }
        if self.price.minor_rate <= 0 {
            return Err(ConfigError::InvalidValue(
                "PRICE_MINOR_RATE",
                "must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn parse_or<T>(
    key: &'static str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key, format!("'{}': {}", raw, e))),
    }
}
