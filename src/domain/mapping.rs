// Mapping from catalog wire payloads to domain models

use super::models::{Book, CatalogPage};
use crate::catalog_client::{BookPayload, PageResponse};

pub fn map_book(payload: BookPayload) -> Book {
    Book {
        title: payload.title,
        subtitle: payload.subtitle,
        isbn13: payload.isbn13,
        price: payload.price,
        image_url: payload.image,
        detail_url: payload.url,
    }
}

pub fn map_page(resp: PageResponse) -> CatalogPage {
    CatalogPage {
        error_code: resp.error,
        total_count: resp.total,
        page_number: resp.page,
        books: resp.books.into_iter().map(map_book).collect(),
    }
}
