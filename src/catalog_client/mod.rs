mod activity;
mod error;

pub use activity::{ActivityGuard, NetworkActivity};
pub use error::FetchError;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use crate::domain::{
    Book, CatalogPage,
    mapping::{map_book, map_page},
};

/// The three catalog requests the session layer depends on.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// GET {base}/new
    async fn fetch_feed(&self) -> Result<CatalogPage, FetchError>;
    /// GET {base}/search/{query}/{page}
    async fn fetch_search(&self, query: &str, page: u32) -> Result<CatalogPage, FetchError>;
    /// GET {base}/books/{isbn13}
    async fn fetch_detail(&self, isbn13: &str) -> Result<Book, FetchError>;
}

#[derive(Clone, Debug)]
pub struct CatalogClient {
    base_url: Url,
    client: reqwest::Client,
    activity: NetworkActivity,
}

impl CatalogClient {
    /// Create a new client with the given base URL (e.g. "https://api.itbook.store/1.0/").
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("catalog base URL cannot carry path segments: {}", base_url);
        }
        tracing::debug!(%base_url, "creating CatalogClient");
        Ok(CatalogClient {
            base_url,
            client,
            activity: NetworkActivity::new(),
        })
    }

    /// Share an existing activity flag instead of the client's own.
    pub fn with_activity(mut self, activity: NetworkActivity) -> Self {
        self.activity = activity;
        self
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidAddress)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn feed_url(&self) -> Result<Url, FetchError> {
        self.endpoint(&["new"])
    }

    pub fn search_url(&self, query: &str, page: u32) -> Result<Url, FetchError> {
        if query.is_empty() || page == 0 {
            return Err(FetchError::InvalidAddress);
        }
        self.endpoint(&["search", query, &page.to_string()])
    }

    pub fn detail_url(&self, isbn13: &str) -> Result<Url, FetchError> {
        if isbn13.is_empty() {
            return Err(FetchError::InvalidAddress);
        }
        self.endpoint(&["books", isbn13])
    }

    async fn get_body(&self, url: Url, endpoint: &str) -> Result<String, FetchError> {
        let _busy = self.activity.begin();
        tracing::debug!(%url, endpoint, "GET");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_transport(e, endpoint))?;
        let status = resp
            .error_for_status()
            .map_err(|e| FetchError::from_transport(e, endpoint))?;
        status
            .text()
            .await
            .map_err(|e| FetchError::from_transport(e, endpoint))
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn fetch_feed(&self) -> Result<CatalogPage, FetchError> {
        let url = self.feed_url()?;
        let body = self.get_body(url, "new").await?;
        parse_page(&body, "new")
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn fetch_search(&self, query: &str, page: u32) -> Result<CatalogPage, FetchError> {
        let url = self.search_url(query, page)?;
        let body = self.get_body(url, "search").await?;
        parse_page(&body, "search")
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn fetch_detail(&self, isbn13: &str) -> Result<Book, FetchError> {
        let url = self.detail_url(isbn13)?;
        let body = self.get_body(url, "books").await?;
        parse_detail(&body, "books")
    }
}

fn decode_failure(err: serde_json::Error, body: &str, endpoint: &str) -> FetchError {
    let mut snippet_len = body.len().min(2000);
    while !body.is_char_boundary(snippet_len) {
        snippet_len -= 1;
    }
    let snippet = &body[..snippet_len];
    tracing::error!(error = %err, endpoint, body_snippet = %snippet, "failed to decode catalog response");
    FetchError::Decode {
        endpoint: endpoint.to_string(),
        detail: err.to_string(),
    }
}

fn rejected(code: &str, endpoint: &str) -> FetchError {
    tracing::warn!(code, endpoint, "catalog rejected request");
    FetchError::Rejected {
        endpoint: endpoint.to_string(),
        code: code.to_string(),
    }
}

pub(crate) fn parse_page(body: &str, endpoint: &str) -> Result<CatalogPage, FetchError> {
    let parsed: PageResponse =
        serde_json::from_str(body).map_err(|e| decode_failure(e, body, endpoint))?;
    let page = map_page(parsed);
    if !page.is_success() {
        return Err(rejected(&page.error_code, endpoint));
    }
    Ok(page)
}

pub(crate) fn parse_detail(body: &str, endpoint: &str) -> Result<Book, FetchError> {
    // The error field is checked first: rejected lookups omit the book fields.
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| decode_failure(e, body, endpoint))?;
    if envelope.error != CatalogPage::SUCCESS_CODE {
        return Err(rejected(&envelope.error, endpoint));
    }
    let parsed: BookPayload =
        serde_json::from_str(body).map_err(|e| decode_failure(e, body, endpoint))?;
    Ok(map_book(parsed))
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default = "success_code")]
    error: String,
}

fn success_code() -> String {
    CatalogPage::SUCCESS_CODE.to_string()
}

/// Body of `/new` and `/search/{query}/{page}`.
#[derive(Debug, Deserialize, PartialEq)]
pub struct PageResponse {
    pub error: String,
    #[serde(deserialize_with = "crate::catalog_client::de::u64_from_str_or_num")]
    pub total: u64,
    #[serde(
        deserialize_with = "crate::catalog_client::de::opt_u32_from_str_or_num",
        default
    )]
    pub page: Option<u32>,
    #[serde(default)]
    pub books: Vec<BookPayload>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct BookPayload {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub isbn13: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub url: String,
}

/// Internal serde helpers
pub mod de {
    use serde::{Deserialize, Deserializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr<'a> {
        Num(u64),
        Str(&'a str),
    }

    /// Accept a non-negative integer from either a number or a string like "25".
    pub fn u64_from_str_or_num<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match NumOrStr::deserialize(deserializer)? {
            NumOrStr::Num(n) => Ok(n),
            NumOrStr::Str(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|e| D::Error::custom(format!("invalid count '{}': {}", s, e))),
        }
    }

    /// Accept Option<u32> from either a number or a string; null/"" -> None.
    pub fn opt_u32_from_str_or_num<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let val: Option<NumOrStr> = Option::deserialize(deserializer)?;
        Ok(match val {
            None => None,
            Some(NumOrStr::Num(n)) => u32::try_from(n).ok(),
            Some(NumOrStr::Str(s)) => s.trim().parse::<u32>().ok(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> CatalogClient {
        CatalogClient::new("https://api.itbook.store/1.0/", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn builds_feed_url() {
        assert_eq!(
            client().feed_url().unwrap().as_str(),
            "https://api.itbook.store/1.0/new"
        );
    }

    #[test]
    fn builds_search_url_and_escapes_query() {
        let c = client();
        assert_eq!(
            c.search_url("ruby", 2).unwrap().as_str(),
            "https://api.itbook.store/1.0/search/ruby/2"
        );
        assert_eq!(
            c.search_url("rust lang/async", 1).unwrap().as_str(),
            "https://api.itbook.store/1.0/search/rust%20lang%2Fasync/1"
        );
    }

    #[test]
    fn base_without_trailing_slash_still_nests() {
        let c = CatalogClient::new("https://api.itbook.store/1.0", Duration::from_secs(5)).unwrap();
        assert_eq!(
            c.detail_url("9781617294136").unwrap().as_str(),
            "https://api.itbook.store/1.0/books/9781617294136"
        );
    }

    #[test]
    fn invalid_inputs_are_invalid_address() {
        let c = client();
        assert_eq!(c.search_url("", 1), Err(FetchError::InvalidAddress));
        assert_eq!(c.search_url("ruby", 0), Err(FetchError::InvalidAddress));
        assert_eq!(c.detail_url(""), Err(FetchError::InvalidAddress));
    }

    #[test]
    fn rejects_non_hierarchical_base() {
        assert!(CatalogClient::new("mailto:books@example.com", Duration::from_secs(5)).is_err());
    }

    #[test]
    fn search_page_deserialize_example() {
        let json = r#"{
            "error": "0",
            "total": "48",
            "page": "1",
            "books": [
                {
                    "title": "Practical Object-Oriented Design, 2nd Edition",
                    "subtitle": "An Agile Primer Using Ruby",
                    "isbn13": "9780134456478",
                    "price": "$31.25",
                    "image": "https://itbook.store/img/books/9780134456478.png",
                    "url": "https://itbook.store/books/9780134456478"
                },
                {
                    "title": "Ruby Pocket Reference, 2nd Edition",
                    "subtitle": "",
                    "isbn13": "9781491926017",
                    "price": "$0.00",
                    "image": "https://itbook.store/img/books/9781491926017.png",
                    "url": "https://itbook.store/books/9781491926017"
                }
            ]
        }"#;

        let page = parse_page(json, "search").unwrap();
        assert_eq!(page.total_count, 48);
        assert_eq!(page.page_number, Some(1));
        assert_eq!(page.books.len(), 2);
        assert_eq!(page.books[0].isbn13, "9780134456478");
        assert_eq!(page.books[0].image_url, "https://itbook.store/img/books/9780134456478.png");
        assert_eq!(page.books[1].subtitle, "");
        assert_eq!(page.books[1].price, "$0.00");
    }

    #[test]
    fn feed_without_page_and_with_numeric_total() {
        let json = r#"{"error":"0","total":20,"books":[]}"#;
        let page = parse_page(json, "new").unwrap();
        assert_eq!(page.total_count, 20);
        assert_eq!(page.page_number, None);
        assert!(page.books.is_empty());
    }

    #[test]
    fn missing_total_is_decode_error() {
        let json = r#"{"error":"0","books":[]}"#;
        let err = parse_page(json, "search").unwrap_err();
        assert!(matches!(err, FetchError::Decode { ref endpoint, .. } if endpoint == "search"));
    }

    #[test]
    fn negative_or_garbage_total_is_decode_error() {
        for total in [r#""-3""#, r#""many""#, "-3"] {
            let json = format!(r#"{{"error":"0","total":{},"books":[]}}"#, total);
            assert!(
                matches!(parse_page(&json, "search"), Err(FetchError::Decode { .. })),
                "total {} should not decode",
                total
            );
        }
    }

    #[test]
    fn upstream_error_code_is_rejected() {
        let json = r#"{"error":"[search] Invalid request","total":"0","books":[]}"#;
        let err = parse_page(json, "search").unwrap_err();
        assert_eq!(
            err,
            FetchError::Rejected {
                endpoint: "search".into(),
                code: "[search] Invalid request".into()
            }
        );
    }

    #[test]
    fn detail_deserialize_example_ignores_extra_fields() {
        let json = r#"{
            "error": "0",
            "title": "Securing DevOps",
            "subtitle": "Security in the Cloud",
            "authors": "Julien Vehent",
            "publisher": "Manning",
            "isbn10": "1617294136",
            "isbn13": "9781617294136",
            "pages": "384",
            "year": "2018",
            "rating": "5",
            "desc": "An application running in the cloud can benefit from ...",
            "price": "$26.98",
            "image": "https://itbook.store/img/books/9781617294136.png",
            "url": "https://itbook.store/books/9781617294136"
        }"#;
        let book = parse_detail(json, "books").unwrap();
        assert_eq!(book.title, "Securing DevOps");
        assert_eq!(book.isbn13, "9781617294136");
        assert_eq!(book.detail_url, "https://itbook.store/books/9781617294136");
    }

    #[test]
    fn detail_for_unknown_isbn_is_rejected_not_decode() {
        let json = r#"{"error":"[books] Invalid ISBN"}"#;
        assert!(matches!(
            parse_detail(json, "books"),
            Err(FetchError::Rejected { .. })
        ));
    }

    #[test]
    fn non_json_body_is_decode_error() {
        let body = "<html>maintenance</html>";
        assert!(matches!(
            parse_detail(body, "books"),
            Err(FetchError::Decode { .. })
        ));
    }
}
