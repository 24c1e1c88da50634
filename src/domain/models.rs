// Domain models independent of the upstream wire format

/// A single catalog item. Replaced wholesale on re-fetch, never patched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub title: String,
    /// May be empty; see [`crate::domain::display::subtitle_or`].
    pub subtitle: String,
    /// Stable, non-empty lookup key (memos, detail requests).
    pub isbn13: String,
    /// Source format `"$12.34"`, `"$0.00"` meaning free.
    pub price: String,
    pub image_url: String,
    pub detail_url: String,
}

/// One feed or search response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogPage {
    /// Upstream-reported code, `"0"` on success.
    pub error_code: String,
    pub total_count: u64,
    pub page_number: Option<u32>,
    /// Server order (relevance or recency); preserved on append.
    pub books: Vec<Book>,
}

impl CatalogPage {
    pub const SUCCESS_CODE: &'static str = "0";

    pub fn is_success(&self) -> bool {
        self.error_code == Self::SUCCESS_CODE
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn book(isbn13: &str) -> Book {
        Book {
            title: format!("Book {}", isbn13),
            subtitle: String::new(),
            isbn13: isbn13.to_string(),
            price: "$12.34".into(),
            image_url: format!("https://itbook.store/img/books/{}.png", isbn13),
            detail_url: format!("https://itbook.store/books/{}", isbn13),
        }
    }

    /// `count` books with ISBNs derived from `prefix` and a running index.
    pub fn books(prefix: &str, count: usize) -> Vec<Book> {
        (0..count).map(|i| book(&format!("{}{:03}", prefix, i))).collect()
    }

    pub fn page(total_count: u64, page_number: Option<u32>, books: Vec<Book>) -> CatalogPage {
        CatalogPage {
            error_code: CatalogPage::SUCCESS_CODE.into(),
            total_count,
            page_number,
            books,
        }
    }
}
