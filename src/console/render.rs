use crate::{
    catalog_client::FetchError,
    domain::{
        Book, CatalogPage,
        display::{DisplayLabels, PriceConversion, subtitle_or},
    },
    session::{CatalogObserver, FetchContext, ListView},
};

#[derive(Debug, Clone)]
pub struct Renderer {
    pub price: PriceConversion,
    pub labels: DisplayLabels,
}

impl Renderer {
    pub fn book_line(&self, index: usize, book: &Book) -> String {
        format!(
            "{:>3}. {} | {} | {} | {}",
            index + 1,
            book.title,
            subtitle_or(book, &self.labels),
            book.isbn13,
            self.price.format(&book.price, &self.labels)
        )
    }

    pub fn book_detail(&self, book: &Book) -> String {
        format!(
            "{}\n  {}\n  isbn13: {}\n  price:  {}\n  link:   {}\n  image:  {}",
            book.title,
            subtitle_or(book, &self.labels),
            book.isbn13,
            self.price.format(&book.price, &self.labels),
            book.detail_url,
            book.image_url
        )
    }

    pub fn list(&self, view: ListView<'_>) -> String {
        match view {
            ListView::Feed(books) if books.is_empty() => "(new books not loaded yet)".into(),
            ListView::Feed(books) => self.lines("New Books", books, false),
            ListView::Results { books, has_more } => self.lines("Search Books", books, has_more),
            ListView::Placeholder => "Type a search query.".into(),
            ListView::NoResults => "No search results.".into(),
        }
    }

    fn lines(&self, heading: &str, books: &[Book], has_more: bool) -> String {
        let mut out = vec![format!("== {} ({}) ==", heading, books.len())];
        out.extend(books.iter().enumerate().map(|(i, b)| self.book_line(i, b)));
        if has_more {
            out.push("  ... 'more' to load the next page".into());
        }
        out.join("\n")
    }
}

impl CatalogObserver for Renderer {
    fn on_feed_updated(&self, page: &CatalogPage) {
        println!("{}", self.list(ListView::Feed(&page.books)));
    }

    fn on_search_page_updated(&self, accumulated: &[Book], has_more: bool) {
        let view = if accumulated.is_empty() {
            ListView::NoResults
        } else {
            ListView::Results {
                books: accumulated,
                has_more,
            }
        };
        println!("{}", self.list(view));
    }

    fn on_detail_loaded(&self, book: &Book) {
        println!("{}", self.book_detail(book));
    }

    fn on_fetch_failed(&self, error: &FetchError, context: &FetchContext) {
        // Transient notification; details already went to the log.
        eprintln!("! {} ({})", error.user_message(), context);
    }
}
